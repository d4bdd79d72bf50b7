//! Socket option enumeration.
//!
//! Every option maps to exactly one native option constant and takes exactly
//! one value type: `i32`, `bool`, `u64` or string. The per-type whitelists
//! are enforced by the typed accessors on [`Socket`](crate::socket::Socket);
//! asking for an option through the wrong type is an invalid-usage error,
//! never a silent coercion.

use std::fmt;

use crate::error::Result;
use crate::socket::Socket;

/// Symbolic names for the engine's socket options.
///
/// The value type each option takes:
///
/// | type   | options |
/// |--------|---------|
/// | `i32`  | `Backlog`, `Events`, `FileDescriptor`, `Linger`, `MaxMessageSize`, `MulticastHops`, `Rate`, `ReceiveBufferSize`, `ReceiveHighWaterMark`, `ReceiveTimeout`, `ReconnectInterval`, `ReconnectIntervalMax`, `RecoveryInterval`, `SendBufferSize`, `SendHighWaterMark`, `SendTimeout` |
/// | `bool` | `Conflate`, `Immediate`, `Ipv6`, `ReceiveMore` |
/// | `u64`  | `Affinity` |
/// | string | `Identity`, `LastEndpoint`, `Subscribe`, `Unsubscribe` |
///
/// `Events`, `FileDescriptor`, `LastEndpoint` and `ReceiveMore` are
/// read-only; `Subscribe` and `Unsubscribe` are write-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOption {
    /// I/O thread affinity bitmap (ZMQ_AFFINITY)
    Affinity,
    /// Maximum length of the pending-connection queue (ZMQ_BACKLOG)
    Backlog,
    /// Keep only the last queued message (ZMQ_CONFLATE)
    Conflate,
    /// Currently-ready event mask, as raw bits (ZMQ_EVENTS)
    Events,
    /// Underlying notification descriptor (ZMQ_FD)
    FileDescriptor,
    /// Socket identity for routed patterns (ZMQ_IDENTITY)
    Identity,
    /// Only queue messages to completed connections (ZMQ_IMMEDIATE)
    Immediate,
    /// Allow IPv6 on tcp transports (ZMQ_IPV6)
    Ipv6,
    /// Last endpoint bound or connected (ZMQ_LAST_ENDPOINT)
    LastEndpoint,
    /// Linger period for pending messages on close, milliseconds (ZMQ_LINGER)
    Linger,
    /// Upper bound on inbound message size, bytes (ZMQ_MAXMSGSIZE)
    MaxMessageSize,
    /// Multicast time-to-live (ZMQ_MULTICAST_HOPS)
    MulticastHops,
    /// Multicast data rate, kilobits per second (ZMQ_RATE)
    Rate,
    /// Kernel receive buffer size, bytes (ZMQ_RCVBUF)
    ReceiveBufferSize,
    /// Inbound message queue limit (ZMQ_RCVHWM)
    ReceiveHighWaterMark,
    /// More frames of the current message follow (ZMQ_RCVMORE)
    ReceiveMore,
    /// Receive timeout, milliseconds (ZMQ_RCVTIMEO)
    ReceiveTimeout,
    /// Initial reconnection interval, milliseconds (ZMQ_RECONNECT_IVL)
    ReconnectInterval,
    /// Maximum reconnection interval for backoff (ZMQ_RECONNECT_IVL_MAX)
    ReconnectIntervalMax,
    /// Multicast recovery interval, milliseconds (ZMQ_RECOVERY_IVL)
    RecoveryInterval,
    /// Kernel send buffer size, bytes (ZMQ_SNDBUF)
    SendBufferSize,
    /// Outbound message queue limit (ZMQ_SNDHWM)
    SendHighWaterMark,
    /// Send timeout, milliseconds (ZMQ_SNDTIMEO)
    SendTimeout,
    /// Establish a message filter (ZMQ_SUBSCRIBE)
    Subscribe,
    /// Remove a message filter (ZMQ_UNSUBSCRIBE)
    Unsubscribe,
}

impl SocketOption {
    /// Get the option as a string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Affinity => "affinity",
            Self::Backlog => "backlog",
            Self::Conflate => "conflate",
            Self::Events => "events",
            Self::FileDescriptor => "file_descriptor",
            Self::Identity => "identity",
            Self::Immediate => "immediate",
            Self::Ipv6 => "ipv6",
            Self::LastEndpoint => "last_endpoint",
            Self::Linger => "linger",
            Self::MaxMessageSize => "max_message_size",
            Self::MulticastHops => "multicast_hops",
            Self::Rate => "rate",
            Self::ReceiveBufferSize => "receive_buffer_size",
            Self::ReceiveHighWaterMark => "receive_high_water_mark",
            Self::ReceiveMore => "receive_more",
            Self::ReceiveTimeout => "receive_timeout",
            Self::ReconnectInterval => "reconnect_interval",
            Self::ReconnectIntervalMax => "reconnect_interval_max",
            Self::RecoveryInterval => "recovery_interval",
            Self::SendBufferSize => "send_buffer_size",
            Self::SendHighWaterMark => "send_high_water_mark",
            Self::SendTimeout => "send_timeout",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for SocketOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value types readable through the generic [`Socket::get`] sugar.
///
/// Pure convenience over the by-type getters; the same whitelists apply.
pub trait OptionValue: Sized {
    /// Read `option` from `socket` as this type.
    fn read(socket: &Socket, option: SocketOption) -> Result<Self>;
}

impl OptionValue for i32 {
    fn read(socket: &Socket, option: SocketOption) -> Result<Self> {
        socket.get_int(option)
    }
}

impl OptionValue for bool {
    fn read(socket: &Socket, option: SocketOption) -> Result<Self> {
        socket.get_bool(option)
    }
}

impl OptionValue for u64 {
    fn read(socket: &Socket, option: SocketOption) -> Result<Self> {
        socket.get_u64(option)
    }
}

impl OptionValue for String {
    fn read(socket: &Socket, option: SocketOption) -> Result<Self> {
        socket.get_string(option)
    }
}
