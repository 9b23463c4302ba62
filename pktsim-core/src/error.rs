//! Error taxonomy of the simulator.
//!
//! * [`ArgumentError`]: a value was rejected at construction or call time;
//!   only that call fails.
//! * [`TopologyError`]: the request does not match the nodes and links of
//!   the network. Returned to the caller, aborts a run in progress.
//! * [`StateError`]: an entity was used in a state that does not allow it.
//!   During a run these are reported and counted, the run keeps going.
//!
//! Packet loss and routing anomalies (loops, no outgoing link) are not
//! errors, they are counted in [`NetworkStats`].
//!
//! [`NetworkStats`]: crate::stats::NetworkStats

use crate::{
    link::LinkId,
    network::PacketId,
    node::{Address, NodeId},
    time::SimTime,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ArgumentError {
    #[error("bandwidth must be greater than 0 bit/s")]
    ZeroBandwidth,
    #[error("delay must be a finite, non negative number of seconds, got {0}")]
    InvalidDelay(f64),
    #[error("packet loss rate must be in [0.0, 1.0], got {0}")]
    LossRate(f64),
    #[error("cannot schedule an event at {at}, the clock is already at {now}")]
    InThePast { at: SimTime, now: SimTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Node ({node}) is not an endpoint of link {link}")]
    NotAnEndpoint { link: LinkId, node: NodeId },
    #[error("Node ({node}) cannot be linked to itself")]
    SelfLoop { node: NodeId },
    #[error("Node ({node}) Not Found")]
    NodeNotFound { node: NodeId },
    #[error("No node with address {address}")]
    AddressNotFound { address: Address },
    #[error("Address {address} is already used by node {node}")]
    DuplicateAddress { address: Address, node: NodeId },
    #[error("Link ({link}) Not Found")]
    LinkNotFound { link: LinkId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Packet ({packet}) already arrived at {first}")]
    ArrivalAlreadySet { packet: PacketId, first: SimTime },
    #[error("Packet ({packet}) cannot arrive at {arrival}, it was created at {creation}")]
    ArrivalBeforeCreation {
        packet: PacketId,
        arrival: SimTime,
        creation: SimTime,
    },
    #[error("Packet ({packet}) was already delivered")]
    AlreadyDelivered { packet: PacketId },
    #[error("The scheduler is already running")]
    AlreadyRunning,
    #[error("Operation not permitted while the scheduler is running")]
    Running,
}

/// Any of the errors above, for callers that want a single type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    State(#[from] StateError),
}
