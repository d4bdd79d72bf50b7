//! Readiness multiplexing across sockets and raw descriptors.
//!
//! A [`Poller`] keeps one flat, ordered list of watched items (engine
//! sockets or raw OS descriptors), each with a requested event mask and,
//! after a wait, the observed mask. Two side indices (socket identity and
//! descriptor value) give O(1) mask updates and make the at-most-once
//! registration rule cheap to enforce.
//!
//! The poller never owns what it watches: sockets are borrowed for the
//! poller's lifetime (which also keeps them from being closed or moved while
//! watched), and descriptors stay the caller's responsibility.

use std::time::Duration;

use bitflags::bitflags;
use hashbrown::HashMap;
use tracing::trace;

use crate::error::{CowlingError, Result};
use crate::socket::Socket;

#[cfg(unix)]
pub use std::os::unix::io::RawFd;
#[cfg(windows)]
pub use std::os::windows::io::RawSocket as RawFd;

bitflags! {
    /// Readiness event mask for watched items.
    ///
    /// `ERROR` is only ever observed on descriptor entries; the engine
    /// never reports it for sockets, though nothing stops you asking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PollEvents: u8 {
        /// A receive will not block if attempted now.
        const READABLE = 1;
        /// A send will not block if attempted now.
        const WRITABLE = 2;
        /// The descriptor is in an error state.
        const ERROR = 4;
    }
}

fn to_engine(events: PollEvents) -> zmq::PollEvents {
    let mut raw = zmq::PollEvents::empty();
    if events.contains(PollEvents::READABLE) {
        raw |= zmq::POLLIN;
    }
    if events.contains(PollEvents::WRITABLE) {
        raw |= zmq::POLLOUT;
    }
    if events.contains(PollEvents::ERROR) {
        raw |= zmq::POLLERR;
    }
    raw
}

fn from_engine(raw: zmq::PollEvents) -> PollEvents {
    let mut events = PollEvents::empty();
    if raw.contains(zmq::POLLIN) {
        events |= PollEvents::READABLE;
    }
    if raw.contains(zmq::POLLOUT) {
        events |= PollEvents::WRITABLE;
    }
    if raw.contains(zmq::POLLERR) {
        events |= PollEvents::ERROR;
    }
    events
}

/// Identity of a watched item inside a poller.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKey {
    Socket(u64),
    Fd(RawFd),
}

impl std::fmt::Display for WatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Socket(id) => write!(f, "socket {id}"),
            Self::Fd(fd) => write!(f, "descriptor {fd}"),
        }
    }
}

/// Anything a poller can be queried about: a [`Socket`] or a raw descriptor.
pub trait PollTarget {
    #[doc(hidden)]
    fn watch_key(&self) -> WatchKey;
}

impl PollTarget for Socket {
    fn watch_key(&self) -> WatchKey {
        WatchKey::Socket(self.id())
    }
}

impl PollTarget for RawFd {
    fn watch_key(&self) -> WatchKey {
        WatchKey::Fd(*self)
    }
}

#[derive(Debug, Clone, Copy)]
enum Watched<'s> {
    Socket(&'s Socket),
    Fd(RawFd),
}

#[derive(Debug)]
struct WatchedItem<'s> {
    target: Watched<'s>,
    requested: PollEvents,
    observed: PollEvents,
}

/// One wait call over a heterogeneous set of watched items.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use cowling::{Context, PollEvents, Poller, SocketType};
///
/// # fn main() -> cowling::Result<()> {
/// let context = Context::new();
/// let socket = context.socket(SocketType::Pull)?;
/// socket.bind("tcp://127.0.0.1:5555")?;
///
/// let mut poller = Poller::new();
/// poller.add(&socket, PollEvents::READABLE)?;
///
/// if poller.poll(Some(Duration::from_millis(250)))? && poller.has_input(&socket) {
///     // a receive will not block now
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Poller<'s> {
    items: Vec<WatchedItem<'s>>,
    socket_index: HashMap<u64, usize>,
    fd_index: HashMap<RawFd, usize>,
}

impl<'s> Poller<'s> {
    /// Construct an empty polling model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of watched items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether anything is being watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Watch a socket for the requested events.
    ///
    /// Each socket may be registered at most once; use
    /// [`check_for`](Self::check_for) to change the mask of an item that is
    /// already watched.
    ///
    /// # Errors
    ///
    /// [`CowlingError::AlreadyWatched`] for a duplicate registration,
    /// [`CowlingError::SocketClosed`] for a socket without a handle.
    pub fn add(&mut self, socket: &'s Socket, events: PollEvents) -> Result<()> {
        // Fails early so the watch list never holds a handle-less socket.
        socket.raw()?;

        let id = socket.id();
        if self.socket_index.contains_key(&id) {
            return Err(CowlingError::AlreadyWatched(
                WatchKey::Socket(id).to_string(),
            ));
        }

        self.socket_index.insert(id, self.items.len());
        self.items.push(WatchedItem {
            target: Watched::Socket(socket),
            requested: events,
            observed: PollEvents::empty(),
        });
        Ok(())
    }

    /// Watch a raw descriptor for the requested events.
    ///
    /// Descriptors typically ask for `READABLE | ERROR`.
    pub fn add_fd(&mut self, fd: RawFd, events: PollEvents) -> Result<()> {
        if self.fd_index.contains_key(&fd) {
            return Err(CowlingError::AlreadyWatched(WatchKey::Fd(fd).to_string()));
        }

        self.fd_index.insert(fd, self.items.len());
        self.items.push(WatchedItem {
            target: Watched::Fd(fd),
            requested: events,
            observed: PollEvents::empty(),
        });
        Ok(())
    }

    /// Overwrite the requested event mask for an already-watched item.
    ///
    /// # Errors
    ///
    /// [`CowlingError::NotWatched`] if the item was never added.
    pub fn check_for<T: PollTarget>(&mut self, target: &T, events: PollEvents) -> Result<()> {
        let key = target.watch_key();
        match self.slot(key) {
            Some(slot) => {
                self.items[slot].requested = events;
                Ok(())
            }
            None => Err(CowlingError::NotWatched(key.to_string())),
        }
    }

    /// Wait until at least one watched item has a requested event, or the
    /// timeout elapses.
    ///
    /// `None` waits indefinitely. Returns `false` on timeout. Every observed
    /// mask is refreshed by this call (cleared first, then filled from the
    /// wait results), so stale events from an earlier call never linger.
    pub fn poll(&mut self, timeout: Option<Duration>) -> Result<bool> {
        for item in &mut self.items {
            item.observed = PollEvents::empty();
        }

        let mut raw_items = Vec::with_capacity(self.items.len());
        for item in &self.items {
            raw_items.push(match item.target {
                Watched::Socket(socket) => socket.raw()?.as_poll_item(to_engine(item.requested)),
                Watched::Fd(fd) => zmq::PollItem::from_fd(fd, to_engine(item.requested)),
            });
        }

        let timeout_ms = match timeout {
            None => -1,
            Some(duration) => i64::try_from(duration.as_millis()).unwrap_or(i64::MAX),
        };

        let fired = zmq::poll(&mut raw_items, timeout_ms)?;

        for (item, raw) in self.items.iter_mut().zip(&raw_items) {
            item.observed = from_engine(raw.get_revents());
        }

        trace!(fired, watched = self.items.len(), "poll returned");
        Ok(fired > 0)
    }

    /// Events observed for `target` by the most recent [`poll`](Self::poll).
    ///
    /// Unknown and never-polled items report the empty mask rather than
    /// failing, so speculative queries are safe.
    #[must_use]
    pub fn events<T: PollTarget>(&self, target: &T) -> PollEvents {
        self.slot(target.watch_key())
            .map_or_else(PollEvents::empty, |slot| self.items[slot].observed)
    }

    /// Check `target` for an observed readable event.
    #[must_use]
    pub fn has_input<T: PollTarget>(&self, target: &T) -> bool {
        self.events(target).contains(PollEvents::READABLE)
    }

    /// Check `target` for an observed writable event.
    #[must_use]
    pub fn has_output<T: PollTarget>(&self, target: &T) -> bool {
        self.events(target).contains(PollEvents::WRITABLE)
    }

    /// Check `target` for an observed error event.
    ///
    /// Sockets never report this bit; it exists for descriptor entries.
    #[must_use]
    pub fn has_error<T: PollTarget>(&self, target: &T) -> bool {
        self.events(target).contains(PollEvents::ERROR)
    }

    fn slot(&self, key: WatchKey) -> Option<usize> {
        match key {
            WatchKey::Socket(id) => self.socket_index.get(&id).copied(),
            WatchKey::Fd(fd) => self.fd_index.get(&fd).copied(),
        }
    }
}
