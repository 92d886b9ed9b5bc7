//! Opening serial connections with tokio-serial.
//!
//! The returned [`SerialStream`] implements `AsyncRead + AsyncWrite` and is
//! handed straight to [`crate::endpoint::Endpoint::spawn`].

use super::configuration::PortConfiguration;
use super::error::PortError;
use tracing::{debug, warn};

pub use tokio_serial::SerialStream;

/// Open `path` at `baud_rate` with the shared line settings.
///
/// # Example
/// ```no_run
/// use serial_tap::port::{open_serial, PortConfiguration};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stream = open_serial("/dev/ttyUSB0", 115200, &PortConfiguration::default())?;
/// # Ok(())
/// # }
/// ```
pub fn open_serial(
    path: &str,
    baud_rate: u32,
    config: &PortConfiguration,
) -> Result<SerialStream, PortError> {
    if baud_rate == 0 {
        return Err(PortError::config(format!(
            "baud rate for {path} must be positive"
        )));
    }

    let builder = tokio_serial::new(path, baud_rate)
        .data_bits(config.data_bits.into())
        .flow_control(config.flow_control.into())
        .parity(config.parity.into())
        .stop_bits(config.stop_bits.into())
        .timeout(config.timeout());

    debug!(path, baud_rate, ?config, "Opening serial port");

    SerialStream::open(&builder).map_err(|e| match e.kind {
        tokio_serial::ErrorKind::NoDevice => {
            log_available_ports();
            PortError::not_found(path)
        }
        tokio_serial::ErrorKind::InvalidInput => PortError::config(e.to_string()),
        tokio_serial::ErrorKind::Io(kind) => {
            PortError::open(path, std::io::Error::new(kind, e.description))
        }
        _ => PortError::open(path, std::io::Error::other(e.to_string())),
    })
}

/// Names of the serial ports currently visible to the system.
pub fn available_port_names() -> Result<Vec<String>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

fn log_available_ports() {
    match available_port_names() {
        Ok(names) if names.is_empty() => warn!("No serial ports detected on this system"),
        Ok(names) => warn!("Available serial ports: {}", names.join(", ")),
        Err(e) => debug!("Could not enumerate serial ports: {}", e),
    }
}
