//! Physical properties of a [`Link`](crate::link::Link).

mod bandwidth;
mod latency;
mod packet_loss;

pub use self::{
    bandwidth::Bandwidth,
    latency::Latency,
    packet_loss::{PacketLoss, PacketLossParseError, PacketLossRate},
};
