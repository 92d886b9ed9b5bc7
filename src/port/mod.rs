//! Serial port collaborator.
//!
//! Opens and configures the physical (or virtual) serial connections that the
//! bridge's endpoints sit on. Everything above this module only sees an
//! `AsyncRead + AsyncWrite` stream.

pub mod configuration;
pub mod error;
pub mod serial;

pub use configuration::{DataBits, FlowControl, Parity, PortConfiguration, StopBits};
pub use error::PortError;
pub use serial::{open_serial, SerialStream};
