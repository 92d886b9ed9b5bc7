use clap::Parser;
use serial_tap::config::{SettingsLoader, StartupConfig};
use serial_tap::endpoint::Endpoint;
use serial_tap::error::BridgeError;
use serial_tap::format::DisplayMode;
use serial_tap::logging::init_tracing;
use serial_tap::port::open_serial;
use serial_tap::relay::{Bridge, BridgeReport};
use serial_tap::sink::{LogSink, WriterSink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Bridge two serial ports and log the traffic between them.",
    long_about = "Relays every byte received on the target port to the passthru port and vice versa, printing a timestamped, directional log of the traffic to stdout. Diagnostics go to stderr."
)]
struct Args {
    /// Path of the target serial port (the device).
    #[arg(long)]
    target_path: String,

    /// Baud rate of the target serial port.
    #[arg(long)]
    target_baud_rate: u32,

    /// Path of the passthru serial port (the host application side).
    #[arg(long)]
    passthru_path: String,

    /// Baud rate of the passthru port. Defaults to the target baud rate.
    #[arg(long)]
    passthru_baud_rate: Option<u32>,

    /// How to display passthru -> target traffic: text or binary.
    #[arg(long)]
    input_type: DisplayMode,

    /// How to display target -> passthru traffic: text or binary.
    #[arg(long)]
    output_type: DisplayMode,

    /// Settings file (TOML).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not print the startup summary.
    #[arg(long)]
    no_banner: bool,
}

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            info!(
                outbound_chunks = report.outbound.chunks_relayed,
                outbound_bytes = report.outbound.bytes_relayed,
                inbound_chunks = report.inbound.chunks_relayed,
                inbound_bytes = report.inbound.bytes_relayed,
                write_failures = report.outbound.write_failures + report.inbound.write_failures,
                "Bridge stopped"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Tracing may not be initialised yet when configuration fails.
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<BridgeReport, BridgeError> {
    let startup = StartupConfig::new(
        args.target_path,
        args.target_baud_rate,
        args.passthru_path,
        args.passthru_baud_rate,
        args.input_type,
        args.output_type,
    )?;
    let settings = SettingsLoader::load(args.config.as_deref())?.into_settings();

    init_tracing(&settings.logging);

    let sink: Arc<dyn LogSink> = Arc::new(WriterSink::stdout());
    if settings.bridge.banner && !args.no_banner {
        sink.emit(&startup.banner()).await;
    }

    // Both ports must open before either direction starts relaying.
    let target_stream = open_serial(&startup.target.path, startup.target.baud_rate, &settings.serial)
        .map_err(|e| BridgeError::open("target", e))?;
    let passthru_stream = open_serial(
        &startup.passthru.path,
        startup.passthru.baud_rate,
        &settings.serial,
    )
    .map_err(|e| BridgeError::open("passthru", e))?;

    let options = settings.bridge.endpoint_options();
    let target = Endpoint::spawn("target", target_stream, options);
    let passthru = Endpoint::spawn("passthru", passthru_stream, options);

    let report = Bridge::new(
        target,
        passthru,
        startup.input_type,
        startup.output_type,
        sink,
    )
    .start()
    .join_until(shutdown_signal())
    .await;

    Ok(report)
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, shutting down");
}
