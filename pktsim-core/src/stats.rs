//! Network statistics.
//!
//! [`NetworkStats`] is a snapshot of the counters the [`Network`] keeps
//! while processing events. Obtain one via [`Network::stats`].
//!
//! [`Network`]: crate::network::Network
//! [`Network::stats`]: crate::network::Network::stats

use std::fmt;

/// Point-in-time snapshot of the network counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    /// Packets accepted by [`Network::send`](crate::network::Network::send),
    /// directly or through a scheduled send. A send returning an error is
    /// not counted.
    pub sent: u64,
    /// Packets that reached their destination.
    pub delivered: u64,
    /// Transfers dropped by the packet loss model of a link.
    pub dropped: u64,
    /// Packets dropped because they came back to a node they visited.
    pub routing_loops: u64,
    /// Packets dropped because the router found no outgoing link.
    pub no_route: u64,
    /// [`StateError`](crate::error::StateError)s reported during runs.
    pub state_errors: u64,
    /// Times a node passed on a packet that was not addressed to it.
    pub forwarded: u64,
}

impl NetworkStats {
    /// packets that will not be delivered, for any reason
    pub fn lost(&self) -> u64 {
        self.dropped + self.routing_loops + self.no_route
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent: {}, delivered: {}, forwarded: {}, dropped: {}, loops: {}, no route: {}, errors: {}",
            self.sent,
            self.delivered,
            self.forwarded,
            self.dropped,
            self.routing_loops,
            self.no_route,
            self.state_errors,
        )
    }
}
