//! # Cowling
//!
//! A typed, resource-safe layer over the libzmq messaging engine: sockets,
//! multipart messages and readiness polling without raw handles or manual
//! buffer lifetimes.
//!
//! ## Architecture
//!
//! Three pieces cooperate:
//!
//! - [`Message`]: an ordered, move-only sequence of [`Frame`]s, the unit
//!   moved across the socket boundary
//! - [`Socket`]: one engine endpoint handle with typed option access and
//!   blocking or non-blocking multipart send/receive
//! - [`Poller`]: one wait call across any mix of watched sockets and raw
//!   descriptors
//!
//! The wire protocol, transport negotiation and routing all live in the
//! engine; this crate reproduces the client-side abstraction and the framing
//! discipline on top of it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cowling::{Context, Message, SocketType};
//!
//! # fn main() -> cowling::Result<()> {
//! let context = Context::new();
//!
//! let publisher = context.socket(SocketType::Pub)?;
//! publisher.bind("inproc://events")?;
//!
//! let subscriber = context.socket(SocketType::Sub)?;
//! subscriber.connect("inproc://events")?;
//! subscriber.subscribe("weather")?;
//!
//! let outcome = publisher.send(Message::new().push_str("weather").push_str("sunny"), false)?;
//! assert!(outcome.is_sent());
//!
//! let mut received = Message::new();
//! subscriber.receive(&mut received, false)?;
//! assert_eq!(received.parts(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking model
//!
//! Send, receive and poll are the only operations that may block, and each
//! has an explicit escape hatch: the `dont_block` flag, the
//! [`SendRecvFlags::DONT_WAIT`] bit, or the poll timeout. A would-block
//! outcome is never an error; it comes back as
//! [`SendOutcome::WouldBlock`], `false`, or `None`.
//!
//! A socket must be driven by one thread of control at a time; neither
//! `Socket` nor `Poller` is internally synchronized.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod dev_tracing;
pub mod error;
pub mod frame;
pub mod message;
pub mod options;
pub mod poller;
pub mod socket;
pub mod socket_type;

pub use context::Context;
pub use error::{CowlingError, Result};
pub use frame::Frame;
pub use message::Message;
pub use options::{OptionValue, SocketOption};
pub use poller::{PollEvents, PollTarget, Poller, RawFd};
pub use socket::{SendOutcome, SendRecvFlags, Socket};
pub use socket_type::SocketType;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    //! Single-import convenience for the common surface.
    pub use crate::context::Context;
    pub use crate::error::{CowlingError, Result};
    pub use crate::frame::Frame;
    pub use crate::message::Message;
    pub use crate::options::SocketOption;
    pub use crate::poller::{PollEvents, Poller};
    pub use crate::socket::{SendOutcome, SendRecvFlags, Socket};
    pub use crate::socket_type::SocketType;
}
