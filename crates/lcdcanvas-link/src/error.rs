use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// The port could not be opened; the session stays disconnected.
    #[error("failed to open serial port {port}")]
    Connection {
        port: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing an open port failed; the session was dropped.
    #[error("serial communication failed")]
    Communication(#[from] io::Error),

    /// The device stayed silent for the last command of a shape, even
    /// after the retry read. Numbered from 1 in draw order.
    #[error("no response from the display for item {item}")]
    NoResponse { item: usize },

    #[error("not connected to a display")]
    NotConnected,

    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),

    #[error("{0:?} is not a baud rate")]
    InvalidBaud(String),
}
