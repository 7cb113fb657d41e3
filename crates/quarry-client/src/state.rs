//! Client lifecycle states.

use std::fmt;

/// Where a client is in its connect/disconnect lifecycle.
///
/// ```text
/// Disconnected --connect--> Connecting --(pool filled)--> Connected
///      ^                                                      |
///      +----(drain complete)---- Disconnecting <--disconnect--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No pool exists.
    Disconnected,
    /// A pool is being filled. Concurrent callers join the same attempt.
    Connecting,
    /// The pool is ready for requests.
    Connected,
    /// Exit hooks are running or the pool is draining.
    Disconnecting,
}

impl ClientState {
    /// Whether a pool currently exists.
    #[must_use]
    pub fn has_pool(self) -> bool {
        matches!(self, Self::Connected | Self::Disconnecting)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
        };
        f.write_str(name)
    }
}
