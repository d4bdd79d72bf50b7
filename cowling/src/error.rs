/// Cowling Error Types
///
/// Error handling for socket, message and poller operations.

use thiserror::Error;

use crate::options::SocketOption;

/// Main error type for Cowling operations.
///
/// Failures fall into two classes: `Transport` wraps anything the native
/// engine rejected, carrying its error text; every other variant is a
/// contract violation by the caller. A would-block outcome is *not* an
/// error anywhere in this crate; non-blocking operations report it through
/// their return value instead.
#[derive(Error, Debug)]
pub enum CowlingError {
    /// The native engine reported a failure
    #[error("transport error: {0}")]
    Transport(#[from] zmq::Error),

    /// Send was given a message with no frames
    #[error("sending requires a message with at least one frame")]
    EmptyMessage,

    /// Receive was given a destination message that already holds frames
    #[error("receiving requires an empty destination message")]
    MessageNotEmpty,

    /// A socket option was set or read with the wrong value type
    #[error("socket option {option} does not take {given} values")]
    OptionType {
        option: SocketOption,
        given: &'static str,
    },

    /// A negative value was given for an unsigned option
    #[error("socket option {0} requires a non-negative value")]
    NegativeValue(SocketOption),

    /// The socket handle was already released by `close`
    #[error("socket handle already closed")]
    SocketClosed,

    /// The watched item is already registered with the poller
    #[error("{0} is already registered with this poller")]
    AlreadyWatched(String),

    /// The watched item is not registered with the poller
    #[error("{0} is not registered with this poller")]
    NotWatched(String),
}

/// Result type alias for Cowling operations
pub type Result<T> = std::result::Result<T, CowlingError>;

impl CowlingError {
    /// Check if this error came out of the native engine.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this error is a contract violation by the caller rather
    /// than a transport failure.
    #[must_use]
    pub const fn is_invalid_usage(&self) -> bool {
        !self.is_transport()
    }
}
