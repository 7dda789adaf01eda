//! chaosrun CLI
//!
//! Runs chaos activities (stress workloads, arbitrary commands) on remote
//! hosts through the system `ssh` client. Exit status is 0 for success and
//! for the expected timeout, 1 when the activity failed.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chaosrun_exec::{ExecutionOutcome, ExecutionRequest, RemoteRunner, SshRunner, StressNg};
use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, LogFormat, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "chaosrun", version)]
#[command(about = "Run chaos activities on remote hosts over SSH", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (overrides config)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// Connection and execution options shared by all subcommands
#[derive(Args, Debug)]
struct Target {
    /// Remote hostname or IP address
    #[arg(long)]
    host: String,

    /// Remote login name
    #[arg(short, long)]
    user: String,

    /// Private key passed to `ssh -i`
    #[arg(short = 'i', long)]
    key: String,

    /// Local wait window in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,

    /// SSH executable (overrides config)
    #[arg(long)]
    ssh: Option<PathBuf>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an arbitrary command on the remote host
    Run {
        #[command(flatten)]
        target: Target,

        /// Command executed verbatim by the remote shell
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a stress-ng workload on the remote host
    Stress {
        #[command(flatten)]
        target: Target,

        /// CPU workers
        #[arg(long)]
        cpu: Option<u32>,

        /// Virtual memory workers
        #[arg(long)]
        vm: Option<u32>,

        /// Bytes per virtual memory worker
        #[arg(long, default_value = "256M")]
        vm_bytes: String,

        /// I/O workers
        #[arg(long)]
        io: Option<u32>,

        /// Remote run time in seconds
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        duration: u64,

        /// Run stress-ng through sudo
        #[arg(long)]
        sudo: bool,
    },
}

impl Commands {
    fn target(&self) -> &Target {
        match self {
            Commands::Run { target, .. } | Commands::Stress { target, .. } => target,
        }
    }

    /// Remote command string for this invocation
    fn remote_command(&self) -> String {
        match self {
            Commands::Run { command, .. } => command.join(" "),
            Commands::Stress {
                cpu,
                vm,
                vm_bytes,
                io,
                duration,
                sudo,
                ..
            } => {
                let mut stress = StressNg::new()
                    .with_sudo(*sudo)
                    .timeout(Duration::from_secs(*duration));
                if let Some(n) = vm {
                    stress = stress.vm(*n, vm_bytes.clone());
                }
                if let Some(n) = io {
                    stress = stress.io(*n);
                }
                // Fall back to one CPU worker so stress-ng has a stressor
                match cpu {
                    Some(n) => stress = stress.cpu(*n),
                    None if vm.is_none() && io.is_none() => stress = stress.cpu(1),
                    None => {}
                }
                stress.to_command()
            }
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Print the outcome and map it to the process exit status
fn report(
    outcome: &ExecutionOutcome,
    json: bool,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> Result<ExitCode> {
    if json {
        writeln!(out, "{}", serde_json::to_string(outcome)?)?;
    } else {
        match outcome {
            ExecutionOutcome::Success(output) => write!(out, "{output}")?,
            ExecutionOutcome::TimedOut => {}
            ExecutionOutcome::Failed(err) => writeln!(err_out, "{err}")?,
        }
    }
    out.flush()?;

    Ok(ExitCode::from(exit_status(outcome)))
}

fn exit_status(outcome: &ExecutionOutcome) -> u8 {
    u8::from(outcome.is_failed())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let (mut config, source) = Config::load_or_default(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_tracing(&config.logging);

    match &source {
        Some(path) => debug!(path = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }

    let target = cli.command.target();
    if let Some(program) = &target.ssh {
        config.ssh.program.clone_from(program);
    }
    if let Some(secs) = target.timeout {
        config.ssh.timeout_secs = secs;
    }

    let request = ExecutionRequest::new(
        &target.host,
        &target.user,
        &target.key,
        cli.command.remote_command(),
    );
    let runner = SshRunner::new(config.ssh.runner_config());

    let outcome = runner.run(&request).await;
    info!(
        host = %request.host,
        failed = outcome.is_failed(),
        timed_out = matches!(outcome, ExecutionOutcome::TimedOut),
        "activity finished"
    );

    report(&outcome, target.json, &mut io::stdout().lock(), &mut io::stderr().lock())
}

#[cfg(test)]
mod tests {
    use chaosrun_exec::ActivityFailed;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_run_joins_command_words() {
        let cli = parse(&[
            "chaosrun",
            "run",
            "--host",
            "10.0.0.5",
            "-u",
            "vagrant",
            "-i",
            "/keys/id_rsa",
            "--",
            "stress-ng",
            "--cpu",
            "4",
            "--timeout",
            "60s",
        ])
        .unwrap();

        assert_eq!(cli.command.remote_command(), "stress-ng --cpu 4 --timeout 60s");
        let target = cli.command.target();
        assert_eq!(target.host, "10.0.0.5");
        assert_eq!(target.user, "vagrant");
        assert_eq!(target.key, "/keys/id_rsa");
        assert!(target.timeout.is_none());
    }

    #[test]
    fn test_run_requires_command() {
        let result = parse(&["chaosrun", "run", "--host", "h", "-u", "u", "-i", "k"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stress_defaults_to_one_cpu() {
        let cli = parse(&["chaosrun", "stress", "--host", "h", "-u", "u", "-i", "k"]).unwrap();

        assert_eq!(cli.command.remote_command(), "stress-ng --cpu 1 --timeout 60s");
    }

    #[test]
    fn test_stress_memory_only() {
        let cli = parse(&[
            "chaosrun",
            "stress",
            "--host",
            "h",
            "-u",
            "u",
            "-i",
            "k",
            "--vm",
            "2",
            "--vm-bytes",
            "1G",
            "--duration",
            "30",
            "--sudo",
            "--timeout",
            "35",
        ])
        .unwrap();

        assert_eq!(
            cli.command.remote_command(),
            "sudo stress-ng --vm 2 --vm-bytes 1G --timeout 30s"
        );
        assert_eq!(cli.command.target().timeout, Some(35));
    }

    #[test]
    fn test_stress_rejects_zero_duration() {
        let result = parse(&[
            "chaosrun",
            "stress",
            "--host",
            "h",
            "-u",
            "u",
            "-i",
            "k",
            "--duration",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&ExecutionOutcome::Success(String::new())), 0);
        assert_eq!(exit_status(&ExecutionOutcome::TimedOut), 0);

        let failed = ExecutionOutcome::Failed(ActivityFailed::Spawn("not found".to_string()));
        assert_eq!(exit_status(&failed), 1);
    }

    #[test]
    fn test_report_text_output() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let success = ExecutionOutcome::Success("cpu: 4\n\n  done\n".to_string());
        report(&success, false, &mut out, &mut err).unwrap();
        assert_eq!(out, b"cpu: 4\n\n  done\n");
        assert!(err.is_empty());

        let mut out = Vec::new();
        let mut err = Vec::new();
        report(&ExecutionOutcome::TimedOut, false, &mut out, &mut err).unwrap();
        assert!(out.is_empty());
        assert!(err.is_empty());

        let mut out = Vec::new();
        let mut err = Vec::new();
        let failed = ExecutionOutcome::Failed(ActivityFailed::RemoteCommand {
            status: 255,
            stderr: "Connection refused".to_string(),
        });
        report(&failed, false, &mut out, &mut err).unwrap();
        assert!(out.is_empty());
        assert_eq!(err, b"SSH execution failed: Connection refused\n");
    }

    #[test]
    fn test_report_json_output() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let failed = ExecutionOutcome::Failed(ActivityFailed::Spawn("not found".to_string()));
        report(&failed, true, &mut out, &mut err).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "SSH operation failed: not found");
        assert!(err.is_empty());
    }
}
