//! Channel adapter over a duplex, unordered, best-effort message channel.
//!
//! `Frame` is the in-process script context; `FrameDirectory` resolves target
//! ids to anything that can receive a post (frames or remote sockets);
//! `Messenger` stamps/filters the protocol marker and owns its listeners.

pub mod frame;
pub mod messenger;

pub use frame::{Frame, FrameDirectory, Listener, MessageSource, MessageTarget};
pub use messenger::{Disposer, Messenger};
