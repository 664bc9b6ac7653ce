use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use instr_client::InstrClient;
use orei_api::{
    ClientConfig, EdidMode, InputCecCommand, MatrixClient, OutputCecCommand, ScalerMode,
};
use orei_matrix::logging::{init_logging_with_filter, LoggingMode, LOG_LEVEL_ENV, LOG_MODE_ENV};
use orei_matrix::{MatrixSystem, SystemConfig, Zone};

mod check;

/// Environment variable supplying the matrix host when `--host` is omitted
const HOST_ENV: &str = "OREI_MATRIX_HOST";

/// Control an OREI HDMI matrix switch
#[derive(Parser, Debug)]
#[command(name = "orei-matrix")]
#[command(about = "Query and control an OREI HDMI matrix switch")]
#[command(version)]
pub struct Args {
    /// Matrix host name or IP address (or set OREI_MATRIX_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Also create the all-outputs zone (id 9)
    #[arg(long)]
    pub all_outputs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Refresh and print every zone
    Status,
    /// Route an input to an output
    Switch { input: u8, output: u8 },
    /// Set the scaler of an output (bypass, 4k-1080p, auto or a code)
    Scaler { output: u8, mode: ScalerMode },
    /// Turn Audio Return Channel on or off for an output
    Arc { output: u8, state: Toggle },
    /// Turn the TX stream of an output on or off
    Stream { output: u8, state: Toggle },
    /// Assign an EDID preset (label or code 1-31) to an input
    Edid { input: u8, mode: EdidMode },
    /// Send a CEC command to a 1-based input or output port
    Cec {
        target: CecSide,
        port: u8,
        command: String,
    },
    /// Probe the three status documents and report missing fields
    Check,
    /// Refresh all zones periodically until Ctrl-C
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "10")]
        interval: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CecSide {
    Input,
    Output,
}

impl Args {
    /// Apply environment overrides and check values clap cannot
    pub fn resolve(mut self) -> Result<(String, Self)> {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            self.log_level = level;
        }

        let host = self
            .host
            .clone()
            .or_else(|| std::env::var(HOST_ENV).ok())
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| anyhow!("No matrix host given; pass --host or set {}", HOST_ENV))?;

        if self.timeout == 0 {
            bail!("Timeout must be positive");
        }
        if let Commands::Watch { interval: 0 } = self.command {
            bail!("Watch interval must be positive");
        }

        Ok((host, self))
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::new().with_request_timeout(Duration::from_secs(self.timeout))
    }

    fn system_config(&self) -> SystemConfig {
        SystemConfig::new().with_all_outputs_zone(self.all_outputs)
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let mode = std::env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|name| LoggingMode::from_name(&name))
        .unwrap_or(LoggingMode::Development);

    init_logging_with_filter(mode, Some(log_level)).context("Failed to initialize logging")
}

fn main() -> Result<()> {
    let (host, args) = Args::parse().resolve()?;
    init_tracing(&args.log_level)?;

    let client = Arc::new(
        MatrixClient::with_config(args.client_config()).context("Invalid client configuration")?,
    );

    match args.command.clone() {
        Commands::Status => {
            let system = connect(&host, &args, client)?;
            system.refresh_all();
            for zone in system.zones() {
                print_zone(zone);
            }
        }
        Commands::Switch { input, output } => {
            let ack = client
                .video_switch(&host, input, output)
                .with_context(|| format!("Failed to route input {} to output {}", input, output))?;
            report("video switch", ack.is_success());
        }
        Commands::Scaler { output, mode } => {
            let ack = client
                .video_scaler(&host, output, mode)
                .with_context(|| format!("Failed to set scaler on output {}", output))?;
            report("video scaler", ack.is_success());
        }
        Commands::Arc { output, state } => {
            let ack = client
                .set_arc(&host, output, state.is_on())
                .with_context(|| format!("Failed to set ARC on output {}", output))?;
            report("set arc", ack.is_success());
        }
        Commands::Stream { output, state } => {
            let ack = client
                .tx_stream(&host, output, state.is_on())
                .with_context(|| format!("Failed to set TX stream on output {}", output))?;
            report("tx stream", ack.is_success());
        }
        Commands::Edid { input, mode } => {
            let ack = client
                .set_input_edid(&host, input, mode)
                .with_context(|| format!("Failed to set EDID on input {}", input))?;
            report("set edid", ack.is_success());
        }
        Commands::Cec {
            target,
            port,
            command,
        } => {
            let slot = port
                .checked_sub(1)
                .ok_or_else(|| anyhow!("Ports are numbered from 1"))?;
            let ack = match target {
                CecSide::Output => {
                    let command: OutputCecCommand = command.parse()?;
                    client.output_cec_command(&host, slot, command)
                }
                CecSide::Input => {
                    let command: InputCecCommand = command.parse()?;
                    client.input_cec_command(&host, slot, command)
                }
            }
            .with_context(|| format!("Failed to send CEC command to port {}", port))?;
            report("cec command", ack.is_success());
        }
        Commands::Check => {
            let transport = InstrClient::with_timeout(Duration::from_secs(args.timeout));
            let outcomes = check::run_check(&transport, &host);

            let mut failed = 0;
            for outcome in &outcomes {
                if outcome.passed() {
                    println!("PASS  {}", outcome.kind);
                } else {
                    failed += 1;
                    for problem in &outcome.problems {
                        println!("FAIL  {}: {}", outcome.kind, problem);
                    }
                }
            }

            if failed > 0 {
                bail!("{} of {} checks failed", failed, outcomes.len());
            }
            println!("All tests passed");
        }
        Commands::Watch { interval } => {
            let system = connect(&host, &args, client)?;
            watch(&system, Duration::from_secs(interval))?;
        }
    }

    Ok(())
}

fn connect(host: &str, args: &Args, client: Arc<MatrixClient>) -> Result<MatrixSystem> {
    MatrixSystem::connect(host, args.system_config(), client)
        .with_context(|| format!("Failed to set up matrix at {}", host))
}

fn watch(system: &MatrixSystem, interval: Duration) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    println!("Watching {} (Ctrl+C to quit)...", system.host());

    let mut previous: Vec<(Option<String>, String)> = Vec::new();
    while running.load(Ordering::SeqCst) {
        let on = system.refresh_all();

        let current: Vec<(Option<String>, String)> = system
            .zones()
            .iter()
            .map(|zone| (zone.source(), zone.state().to_string()))
            .collect();

        if current != previous {
            info!("{} of {} zones on", on, system.zones().len());
            for zone in system.zones() {
                print_zone(zone);
            }
            println!();
            previous = current;
        }

        // Sleep in short steps so Ctrl-C is noticed promptly
        let deadline = Instant::now() + interval;
        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(200));
        }
    }

    info!("Stopped watching {}", system.host());
    Ok(())
}

fn print_zone(zone: &Zone) {
    let source = zone.source().unwrap_or_else(|| "-".to_string());
    let extra = serde_json::Value::Object(zone.extra_attributes());
    println!(
        "[{}] {:<40} {:<8} source: {:<16} {}",
        zone.zone_id(),
        zone.name(),
        zone.state(),
        source,
        extra
    );
}

fn report(what: &str, success: bool) {
    if success {
        println!("{}: ok", what);
    } else {
        println!("{}: sent, device did not confirm", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_status_defaults() {
        let args = parse(&["orei-matrix", "--host", "10.0.0.5", "status"]);
        assert_eq!(args.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(args.timeout, 5);
        assert!(!args.all_outputs);
        assert_eq!(args.command, Commands::Status);
        assert_eq!(args.client_config().request_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case(&["orei-matrix", "switch", "2", "1"], Commands::Switch { input: 2, output: 1 })]
    #[case(&["orei-matrix", "scaler", "1", "auto"], Commands::Scaler { output: 1, mode: ScalerMode::Auto })]
    #[case(&["orei-matrix", "scaler", "3", "0"], Commands::Scaler { output: 3, mode: ScalerMode::Bypass })]
    #[case(&["orei-matrix", "arc", "2", "on"], Commands::Arc { output: 2, state: Toggle::On })]
    #[case(&["orei-matrix", "stream", "4", "off"], Commands::Stream { output: 4, state: Toggle::Off })]
    #[case(&["orei-matrix", "edid", "1", "22"], Commands::Edid { input: 1, mode: EdidMode::UserDefine1 })]
    #[case(&["orei-matrix", "watch"], Commands::Watch { interval: 10 })]
    fn test_subcommands(#[case] argv: &[&str], #[case] expected: Commands) {
        assert_eq!(parse(argv).command, expected);
    }

    #[test]
    fn test_rejects_reserved_scaler_code() {
        assert!(Args::try_parse_from(["orei-matrix", "scaler", "1", "2"]).is_err());
    }

    #[test]
    fn test_cec_arguments() {
        let args = parse(&["orei-matrix", "cec", "output", "2", "power-on"]);
        assert_eq!(
            args.command,
            Commands::Cec {
                target: CecSide::Output,
                port: 2,
                command: "power-on".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_validates() {
        let args = parse(&["orei-matrix", "--host", "m", "--timeout", "0", "status"]);
        assert!(args.resolve().is_err());

        let args = parse(&["orei-matrix", "--host", "m", "watch", "--interval", "0"]);
        assert!(args.resolve().is_err());

        let args = parse(&["orei-matrix", "--host", "m", "--all-outputs", "check"]);
        let (host, args) = args.resolve().unwrap();
        assert_eq!(host, "m");
        assert!(args.system_config().include_all_outputs_zone);
    }
}
