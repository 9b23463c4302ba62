use crate::measure::{Bandwidth, Latency, PacketLoss};
use std::time::Duration;

/// Default [`Bandwidth`] of a [`Link`]
///
/// ```
/// # use pktsim_core::defaults::*;
/// assert_eq!(
///     DEFAULT_BANDWIDTH.to_string(),
///     "10kbps"
/// );
/// ```
///
/// [`Link`]: crate::link::Link
pub const DEFAULT_BANDWIDTH: Bandwidth = Bandwidth::from_bps_const(10_000);

/// Default [`Latency`] (propagation delay) of a [`Link`]
///
/// ```
/// # use pktsim_core::defaults::*;
/// assert_eq!(
///     DEFAULT_LATENCY.to_string(),
///     "1ms"
/// );
/// ```
///
/// [`Link`]: crate::link::Link
pub const DEFAULT_LATENCY: Latency = Latency::new(Duration::from_millis(1));

/// Links are lossless unless configured otherwise.
pub const DEFAULT_PACKET_LOSS: PacketLoss = PacketLoss::None;

/// Default size of a packet header, in bytes
///
/// This is the size of a minimal IPv4 header. Use
/// [`PacketBuilder::header_size`] to set another value.
///
/// [`PacketBuilder::header_size`]: crate::network::PacketBuilder::header_size
pub const DEFAULT_HEADER_SIZE: u64 = 20;

/// Seed of the network's random source until [`Network::set_seed`] is called.
///
/// [`Network::set_seed`]: crate::network::Network::set_seed
pub const DEFAULT_SEED: u64 = 0;

/// Links with a latency up to this value are rendered as _low_ delay.
pub const DEFAULT_LOW_DELAY: Duration = Duration::from_millis(1);

/// Links with a latency up to this value (and above
/// [`DEFAULT_LOW_DELAY`]) are rendered as _medium_ delay. Anything
/// slower is _high_ delay.
pub const DEFAULT_MEDIUM_DELAY: Duration = Duration::from_millis(10);
