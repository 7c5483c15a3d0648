//! Errors found throughout this crate

use thiserror::Error;
use x11rb::errors::ConnectError;

/// Errors surfaced to the user, either at startup or as the reply to a
/// control command
#[derive(Debug, Error)]
pub(crate) enum Error {
    /// The first word of a control message names no command
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// A control command was given something it can't use
    #[error("invalid {name}: {value}")]
    InvalidArgument {
        /// What was expected
        name:  &'static str,
        /// What was received
        value: String,
    },

    /// A color was not of the form `#rrggbb`
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Padding was requested for an unknown side
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// A boolean state was not `true`, `false` or `toggle`
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The control grammar rejected the message
    #[error("{0}")]
    Parse(String),

    /// Failure to connect to the server
    #[error("failed to connect to the X11 server: {0}")]
    Connection(#[from] ConnectError),

    /// Substructure redirection on the root window was refused
    #[error("another window manager is already running")]
    AnotherWindowManager,
}
