use crate::{defaults::DEFAULT_HEADER_SIZE, error::StateError, node::Address, time::SimTime};
use anyhow::{Result, bail};
use std::{
    fmt,
    sync::{Arc, atomic::AtomicU64},
};

/// a generator for monotonicaly increasing **unique** [`PacketId`]
///
#[derive(Debug, Clone)]
pub struct PacketIdGenerator(Arc<AtomicU64>);

/// # [`Packet`] Identifier
///
/// During the lifetime of the packet, this identifier can uniquely
/// identify the packet.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u64);

/// # A unit of data moving through the network
///
/// The header is the source and destination [`Address`]es. The packet
/// does not carry actual bytes, only the sizes needed to compute how long
/// it takes to cross a link.
///
/// Everything but the arrival time is fixed at construction. The arrival
/// time is written once, when the packet reaches its destination; the
/// timestamps of intermediate hops are kept by the network alongside the
/// packet, see [`Delivery::hops`].
///
/// [`Delivery::hops`]: crate::network::Delivery::hops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: PacketId,
    source: Address,
    destination: Address,
    header_size: u64,
    payload_size: u64,
    creation_time: SimTime,
    arrival_time: Option<SimTime>,
}

pub struct PacketBuilder<'a> {
    generator: &'a PacketIdGenerator,
    source: Option<Address>,
    destination: Option<Address>,
    header_size: u64,
    payload_size: u64,
    creation_time: SimTime,
}

impl PacketIdGenerator {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(1)))
    }

    /// generate a new unique identifier
    pub fn generate(&self) -> PacketId {
        let id = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        debug_assert!(
            id != 0,
            "The only case this can be equal to 0 is if the generator overflowed. If this \
            happens it means we have generated `u64::MAX` unique packet identifiers."
        );

        PacketId(id)
    }
}

impl Default for PacketIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PacketBuilder<'a> {
    pub fn new(generator: &'a PacketIdGenerator) -> Self {
        Self {
            generator,
            source: None,
            destination: None,
            header_size: DEFAULT_HEADER_SIZE,
            payload_size: 0,
            creation_time: SimTime::ZERO,
        }
    }

    pub fn source(mut self, source: Address) -> Self {
        self.source = Some(source);
        self
    }

    pub fn destination(mut self, destination: Address) -> Self {
        self.destination = Some(destination);
        self
    }

    /// size of the header in bytes, defaults to [`DEFAULT_HEADER_SIZE`]
    pub fn header_size(mut self, header_size: u64) -> Self {
        self.header_size = header_size;
        self
    }

    pub fn payload_size(mut self, payload_size: u64) -> Self {
        self.payload_size = payload_size;
        self
    }

    /// Set the creation timestamp of the packet.
    ///
    /// Packets built with [`Network::packet`] are stamped with the
    /// current simulation time already.
    ///
    /// [`Network::packet`]: crate::network::Network::packet
    pub fn created_at(mut self, creation_time: SimTime) -> Self {
        self.creation_time = creation_time;
        self
    }

    pub fn build(self) -> Result<Packet> {
        let Some(source) = self.source else {
            bail!("Missing sender information (`source')")
        };
        let Some(destination) = self.destination else {
            bail!("Missing recipient information (`destination')")
        };
        let Some(_) = self.header_size.checked_add(self.payload_size) else {
            bail!("Packet size overflows (header and payload sizes are too large)")
        };

        Ok(Packet {
            id: self.generator.generate(),
            source,
            destination,
            header_size: self.header_size,
            payload_size: self.payload_size,
            creation_time: self.creation_time,
            arrival_time: None,
        })
    }
}

impl Packet {
    pub fn builder(generator: &PacketIdGenerator) -> PacketBuilder<'_> {
        PacketBuilder::new(generator)
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    /// `header_size + payload_size`, in bytes
    pub fn total_size(&self) -> u64 {
        self.header_size + self.payload_size
    }

    pub fn creation_time(&self) -> SimTime {
        self.creation_time
    }

    pub fn arrival_time(&self) -> Option<SimTime> {
        self.arrival_time
    }

    /// Time spent between creation and arrival, once arrived.
    pub fn latency(&self) -> Option<std::time::Duration> {
        self.arrival_time?.checked_duration_since(self.creation_time)
    }

    /// Record the arrival of the packet at its destination.
    ///
    /// # Errors
    ///
    /// * [`StateError::ArrivalAlreadySet`] if the packet already arrived,
    ///   the first arrival time is kept;
    /// * [`StateError::ArrivalBeforeCreation`] if `arrival_time` is
    ///   earlier than the creation time of the packet.
    pub fn set_arrived(&mut self, arrival_time: SimTime) -> Result<(), StateError> {
        if let Some(first) = self.arrival_time {
            return Err(StateError::ArrivalAlreadySet {
                packet: self.id,
                first,
            });
        }
        if arrival_time < self.creation_time {
            return Err(StateError::ArrivalBeforeCreation {
                packet: self.id,
                arrival: arrival_time,
                creation: self.creation_time,
            });
        }

        self.arrival_time = Some(arrival_time);
        Ok(())
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet {} ({} -> {}, {} bytes)",
            self.id,
            self.source,
            self.destination,
            self.total_size()
        )
    }
}
