//! Serial link to the LCD controller.
//!
//! Commands go out as newline-terminated lines and each one is paired with
//! a single response line. The session owns the port; reconnecting releases
//! the old port first.

pub mod config;
pub mod error;
pub mod port;
pub mod session;
pub mod transmit;

#[cfg(test)]
mod testing;

pub use config::{BaudRate, LinkConfig};
pub use error::LinkError;
pub use port::{PortInfo, PortOpener, SerialOpener, list_ports};
pub use session::{LinkSession, LinkState};
pub use transmit::TransmitReport;
