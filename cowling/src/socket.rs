//! Socket abstraction over one engine endpoint handle.
//!
//! A [`Socket`] owns exactly one native handle and a kind tag fixed at
//! construction. It mediates all message, frame and option traffic through
//! that handle. Sockets are not internally synchronized: the engine requires
//! one thread of control per handle, and the API is built around that.
//!
//! Bind and connect are asynchronous at the engine level; they return once
//! the request is accepted, not once a peer is reachable. A socket may be
//! attached to any number of endpoints, with the sole exception of the
//! [`Pair`](crate::SocketType::Pair) kind which tolerates one peer.

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{CowlingError, Result};
use crate::frame::Frame;
use crate::message::Message;
use crate::options::{OptionValue, SocketOption};
use crate::socket_type::SocketType;

bitflags! {
    /// Flag bits for the single-frame send/receive operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SendRecvFlags: i32 {
        /// Return a would-block outcome instead of waiting.
        const DONT_WAIT = zmq::DONTWAIT;
        /// More frames of the same message follow this one.
        ///
        /// Meaningful on send only; receive ignores it.
        const SEND_MORE = zmq::SNDMORE;
    }
}

/// Result of a multipart [`Socket::send`].
///
/// A would-block outcome is not an error: it hands the untouched message
/// back so the caller can retry once the socket is writable.
#[derive(Debug)]
#[must_use = "a would-block outcome carries the message back to the caller"]
pub enum SendOutcome {
    /// Every frame was transferred to the engine.
    Sent,
    /// The engine could not accept the first frame; nothing was transferred.
    WouldBlock(Message),
}

impl SendOutcome {
    /// Check whether the message was fully transferred.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Recover the message from a would-block outcome.
    #[must_use]
    pub fn into_unsent(self) -> Option<Message> {
        match self {
            Self::Sent => None,
            Self::WouldBlock(message) => Some(message),
        }
    }
}

static NEXT_SOCKET_ID: AtomicU64 = AtomicU64::new(0);

/// One engine endpoint handle plus its kind tag.
///
/// Move semantics are native: moving a `Socket` transfers the handle, and
/// the borrow checker rules out use of the source afterwards. The handle can
/// also be released early with [`close`](Self::close), after which
/// [`is_open`](Self::is_open) reports `false` and every operation fails with
/// [`CowlingError::SocketClosed`].
pub struct Socket {
    inner: Option<zmq::Socket>,
    kind: SocketType,
    id: u64,
}

impl Socket {
    /// Create a socket of the given kind under `context`.
    pub fn new(context: &Context, kind: SocketType) -> Result<Self> {
        let inner = context.raw().socket(kind.to_raw())?;
        Ok(Self {
            inner: Some(inner),
            kind,
            id: NEXT_SOCKET_ID.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// The kind this socket was constructed with.
    #[must_use]
    pub fn kind(&self) -> SocketType {
        self.kind
    }

    /// Check the socket still holds its handle.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Request the engine accept connections at `endpoint`.
    ///
    /// The endpoint string (`tcp://…`, `ipc://…`, `inproc://…`, `pgm://…`)
    /// is validated and interpreted entirely by the engine.
    pub fn bind(&self, endpoint: &str) -> Result<()> {
        self.raw()?.bind(endpoint)?;
        debug!(kind = %self.kind, endpoint, "socket bound");
        Ok(())
    }

    /// Request the engine connect toward `endpoint`.
    ///
    /// For non-inproc transports the engine keeps trying in the background
    /// until a peer appears; inproc endpoints must already be bound.
    pub fn connect(&self, endpoint: &str) -> Result<()> {
        self.raw()?.connect(endpoint)?;
        debug!(kind = %self.kind, endpoint, "socket connected");
        Ok(())
    }

    /// Connect toward every endpoint in turn.
    pub fn connect_all<I>(&self, endpoints: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for endpoint in endpoints {
            self.connect(endpoint.as_ref())?;
        }
        Ok(())
    }

    /// Release the engine handle and mark this socket invalid.
    ///
    /// The handle is gone afterwards whatever happens; calling `close` a
    /// second time is a caller error.
    pub fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(socket) => {
                drop(socket);
                debug!(kind = %self.kind, "socket closed");
                Ok(())
            }
            None => Err(CowlingError::SocketClosed),
        }
    }

    /// Send a multipart message, taking ownership of every frame.
    ///
    /// All frames but the last are flagged "more data follows". On success
    /// the message has been consumed frame by frame. With `dont_block`, a
    /// socket that cannot accept the first frame yields
    /// [`SendOutcome::WouldBlock`] carrying the message back unchanged.
    ///
    /// # Errors
    ///
    /// [`CowlingError::EmptyMessage`] if the message holds no frames (no
    /// engine call is made); [`CowlingError::Transport`] if the engine
    /// rejects a frame.
    ///
    /// # Panics
    ///
    /// If the engine refuses to accept a frame after the first without
    /// blocking. The engine's framing contract guarantees a multipart send
    /// cannot partially block once the first frame is in, so this is an
    /// internal-consistency fault, not a recoverable condition.
    pub fn send(&self, message: Message, dont_block: bool) -> Result<SendOutcome> {
        let socket = self.raw()?;
        let parts = message.parts();
        if parts == 0 {
            return Err(CowlingError::EmptyMessage);
        }

        if dont_block {
            // Consult readiness first so a refusal consumes no frame.
            let ready = socket.get_events()?;
            if !ready.contains(zmq::POLLOUT) {
                return Ok(SendOutcome::WouldBlock(message));
            }
        }

        let mut message = message;
        let mut index = 0;
        while let Some(frame) = message.pop_front() {
            let mut flags = 0;
            if dont_block {
                flags |= zmq::DONTWAIT;
            }
            if index + 1 < parts {
                flags |= zmq::SNDMORE;
            }

            match socket.send(frame.into_raw(), flags) {
                Ok(()) => {}
                Err(zmq::Error::EAGAIN) if index > 0 => {
                    panic!(
                        "multipart send blocked after {index} of {parts} frames were accepted"
                    );
                }
                Err(err) => return Err(err.into()),
            }
            index += 1;
        }

        trace!(kind = %self.kind, parts, "message sent");
        Ok(SendOutcome::Sent)
    }

    /// Receive one complete multipart message into `message`.
    ///
    /// Frames are pulled out of the engine one at a time until the engine's
    /// "more parts" flag clears. Returns `false` without touching `message`
    /// when nothing is ready and the call would otherwise have waited,
    /// either under `dont_block` or on expiry of a configured receive
    /// timeout.
    ///
    /// # Errors
    ///
    /// [`CowlingError::MessageNotEmpty`] if `message` already holds frames;
    /// [`CowlingError::Transport`] if the engine rejects a pull.
    ///
    /// # Panics
    ///
    /// If a pull after the first frame of a message would block. The engine
    /// delivers multipart messages atomically, so this cannot happen under
    /// correct sequencing.
    pub fn receive(&self, message: &mut Message, dont_block: bool) -> Result<bool> {
        if !message.is_empty() {
            return Err(CowlingError::MessageNotEmpty);
        }

        let socket = self.raw()?;
        let flags = if dont_block { zmq::DONTWAIT } else { 0 };

        loop {
            let mut part = zmq::Message::new();
            match socket.recv(&mut part, flags) {
                Ok(()) => {
                    message.append(Frame::from_raw(part));
                    if !socket.get_rcvmore()? {
                        trace!(kind = %self.kind, parts = message.parts(), "message received");
                        return Ok(true);
                    }
                }
                Err(zmq::Error::EAGAIN) if message.is_empty() => return Ok(false),
                Err(zmq::Error::EAGAIN) => {
                    panic!(
                        "multipart receive blocked after {} frames arrived",
                        message.parts()
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Send a single frame.
    ///
    /// Compose a hand-framed multipart by passing
    /// [`SendRecvFlags::SEND_MORE`] on every part but the last. Returns
    /// `false` if [`SendRecvFlags::DONT_WAIT`] was set and the engine could
    /// not accept the frame.
    pub fn send_part(&self, part: impl Into<Frame>, flags: SendRecvFlags) -> Result<bool> {
        let socket = self.raw()?;
        match socket.send(part.into().into_raw(), flags.bits()) {
            Ok(()) => Ok(true),
            Err(zmq::Error::EAGAIN) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Receive a single frame.
    ///
    /// Returns `None` if [`SendRecvFlags::DONT_WAIT`] was set and nothing
    /// was ready. Check [`has_more_parts`](Self::has_more_parts) afterwards
    /// to walk a multipart message by hand.
    pub fn receive_part(&self, flags: SendRecvFlags) -> Result<Option<Frame>> {
        let socket = self.raw()?;
        let mut part = zmq::Message::new();
        match socket.recv(&mut part, flags.bits()) {
            Ok(()) => Ok(Some(Frame::from_raw(part))),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Receive a single frame as text.
    ///
    /// Bytes that are not valid UTF-8 are replaced; use
    /// [`receive_part`](Self::receive_part) to get at the raw payload.
    pub fn receive_string(&self, flags: SendRecvFlags) -> Result<Option<String>> {
        Ok(self
            .receive_part(flags)?
            .map(|frame| String::from_utf8_lossy(&frame).into_owned()))
    }

    /// Receive a single frame into a caller-provided buffer.
    ///
    /// Returns the number of bytes written. If the incoming frame is larger
    /// than `buffer`, the overflow is silently discarded; sizing the buffer
    /// is the caller's responsibility.
    pub fn receive_raw(&self, buffer: &mut [u8], flags: SendRecvFlags) -> Result<Option<usize>> {
        match self.receive_part(flags)? {
            Some(frame) => {
                let len = frame.len().min(buffer.len());
                buffer[..len].copy_from_slice(&frame[..len]);
                Ok(Some(len))
            }
            None => Ok(None),
        }
    }

    /// Establish a message filter for `topic`.
    ///
    /// Sugar for setting [`SocketOption::Subscribe`]. Only meaningful on
    /// subscribing kinds; the engine ignores it elsewhere.
    pub fn subscribe(&self, topic: &str) -> Result<()> {
        self.set_string(SocketOption::Subscribe, topic)
    }

    /// Remove a message filter for `topic`.
    pub fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.set_string(SocketOption::Unsubscribe, topic)
    }

    /// Establish a message filter for every topic in turn.
    pub fn subscribe_all<I>(&self, topics: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for topic in topics {
            self.subscribe(topic.as_ref())?;
        }
        Ok(())
    }

    /// Remove the message filter for every topic in turn.
    pub fn unsubscribe_all<I>(&self, topics: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for topic in topics {
            self.unsubscribe(topic.as_ref())?;
        }
        Ok(())
    }

    /// Whether the frame pulled by the last receive has more parts behind it.
    pub fn has_more_parts(&self) -> Result<bool> {
        self.get_bool(SocketOption::ReceiveMore)
    }

    /// Set an integer-valued option.
    ///
    /// One convenience forwarding: `Affinity` accepts a non-negative integer
    /// and routes it to the u64 path; a negative value fails with
    /// [`CowlingError::NegativeValue`].
    pub fn set_int(&self, option: SocketOption, value: i32) -> Result<()> {
        let socket = self.raw()?;
        match option {
            SocketOption::Affinity => {
                if value < 0 {
                    return Err(CowlingError::NegativeValue(option));
                }
                return self.set_u64(option, value as u64);
            }
            SocketOption::Backlog => socket.set_backlog(value)?,
            SocketOption::Linger => socket.set_linger(value)?,
            SocketOption::MaxMessageSize => socket.set_maxmsgsize(i64::from(value))?,
            SocketOption::MulticastHops => socket.set_multicast_hops(value)?,
            SocketOption::Rate => socket.set_rate(value)?,
            SocketOption::ReceiveBufferSize => socket.set_rcvbuf(value)?,
            SocketOption::ReceiveHighWaterMark => socket.set_rcvhwm(value)?,
            SocketOption::ReceiveTimeout => socket.set_rcvtimeo(value)?,
            SocketOption::ReconnectInterval => socket.set_reconnect_ivl(value)?,
            SocketOption::ReconnectIntervalMax => socket.set_reconnect_ivl_max(value)?,
            SocketOption::RecoveryInterval => socket.set_recovery_ivl(value)?,
            SocketOption::SendBufferSize => socket.set_sndbuf(value)?,
            SocketOption::SendHighWaterMark => socket.set_sndhwm(value)?,
            SocketOption::SendTimeout => socket.set_sndtimeo(value)?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "int",
                })
            }
        }
        Ok(())
    }

    /// Set a boolean-valued option.
    pub fn set_bool(&self, option: SocketOption, value: bool) -> Result<()> {
        let socket = self.raw()?;
        match option {
            SocketOption::Conflate => socket.set_conflate(value)?,
            SocketOption::Immediate => socket.set_immediate(value)?,
            SocketOption::Ipv6 => socket.set_ipv6(value)?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "boolean",
                })
            }
        }
        Ok(())
    }

    /// Set an unsigned-64-bit option.
    pub fn set_u64(&self, option: SocketOption, value: u64) -> Result<()> {
        let socket = self.raw()?;
        match option {
            SocketOption::Affinity => socket.set_affinity(value)?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "unsigned 64-bit integer",
                })
            }
        }
        Ok(())
    }

    /// Set a string-valued option.
    pub fn set_string(&self, option: SocketOption, value: &str) -> Result<()> {
        let socket = self.raw()?;
        match option {
            SocketOption::Identity => socket.set_identity(value.as_bytes())?,
            SocketOption::Subscribe => socket.set_subscribe(value.as_bytes())?,
            SocketOption::Unsubscribe => socket.set_unsubscribe(value.as_bytes())?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "string",
                })
            }
        }
        Ok(())
    }

    /// Get an integer-valued option.
    pub fn get_int(&self, option: SocketOption) -> Result<i32> {
        let socket = self.raw()?;
        let value = match option {
            SocketOption::Backlog => socket.get_backlog()?,
            SocketOption::Events => i32::from(socket.get_events()?.bits()),
            SocketOption::FileDescriptor => socket.get_fd()? as i32,
            SocketOption::Linger => socket.get_linger()?,
            SocketOption::MaxMessageSize => socket.get_maxmsgsize()? as i32,
            SocketOption::MulticastHops => socket.get_multicast_hops()?,
            SocketOption::Rate => socket.get_rate()?,
            SocketOption::ReceiveBufferSize => socket.get_rcvbuf()?,
            SocketOption::ReceiveHighWaterMark => socket.get_rcvhwm()?,
            SocketOption::ReceiveTimeout => socket.get_rcvtimeo()?,
            SocketOption::ReconnectInterval => socket.get_reconnect_ivl()?,
            SocketOption::ReconnectIntervalMax => socket.get_reconnect_ivl_max()?,
            SocketOption::RecoveryInterval => socket.get_recovery_ivl()?,
            SocketOption::SendBufferSize => socket.get_sndbuf()?,
            SocketOption::SendHighWaterMark => socket.get_sndhwm()?,
            SocketOption::SendTimeout => socket.get_sndtimeo()?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "int",
                })
            }
        };
        Ok(value)
    }

    /// Get a boolean-valued option.
    pub fn get_bool(&self, option: SocketOption) -> Result<bool> {
        let socket = self.raw()?;
        let value = match option {
            SocketOption::Immediate => socket.is_immediate()?,
            SocketOption::Ipv6 => socket.is_ipv6()?,
            SocketOption::ReceiveMore => socket.get_rcvmore()?,
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "boolean",
                })
            }
        };
        Ok(value)
    }

    /// Get an unsigned-64-bit option.
    pub fn get_u64(&self, option: SocketOption) -> Result<u64> {
        let socket = self.raw()?;
        match option {
            SocketOption::Affinity => Ok(socket.get_affinity()?),
            _ => Err(CowlingError::OptionType {
                option,
                given: "unsigned 64-bit integer",
            }),
        }
    }

    /// Get a string-valued option.
    pub fn get_string(&self, option: SocketOption) -> Result<String> {
        let socket = self.raw()?;
        let value = match option {
            SocketOption::Identity => {
                String::from_utf8_lossy(&socket.get_identity()?).into_owned()
            }
            SocketOption::LastEndpoint => match socket.get_last_endpoint()? {
                Ok(endpoint) => endpoint,
                Err(raw) => String::from_utf8_lossy(&raw).into_owned(),
            },
            _ => {
                return Err(CowlingError::OptionType {
                    option,
                    given: "string",
                })
            }
        };
        Ok(value)
    }

    /// Get an option as a chosen value type.
    ///
    /// Pure sugar over the by-type getters:
    ///
    /// ```no_run
    /// # use cowling::{Context, SocketOption, SocketType};
    /// # fn main() -> cowling::Result<()> {
    /// # let socket = Context::new().socket(SocketType::Pull)?;
    /// let hwm: i32 = socket.get(SocketOption::ReceiveHighWaterMark)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn get<T: OptionValue>(&self, option: SocketOption) -> Result<T> {
        T::read(self, option)
    }

    /// Stable identity used by the poller's socket index.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn raw(&self) -> Result<&zmq::Socket> {
        self.inner.as_ref().ok_or(CowlingError::SocketClosed)
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("kind", &self.kind)
            .field("open", &self.is_open())
            .finish()
    }
}
