use crate::error::ArgumentError;
use rand_core::Rng;
use std::{fmt, str::FromStr};

/// Probabilistic packet loss model for a network link.
///
/// Every transfer on a lossy link draws a uniform value in `[0, 1)`; the
/// packet is dropped when the value is below the configured rate.
///
/// # Example
///
/// ```
/// use pktsim_core::PacketLoss;
///
/// // No packet loss
/// let none = PacketLoss::None;
///
/// // 5% packet loss (programmatic)
/// let lossy = PacketLoss::rate(0.05).unwrap();
/// assert_eq!(lossy.to_string(), "5%");
///
/// // 5% packet loss (parsed)
/// let parsed: PacketLoss = "5%".parse().unwrap();
/// assert_eq!(parsed, lossy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketLoss {
    /// No packet loss, no random draw is made.
    None,
    /// Random packet loss at the given probability.
    ///
    /// Use [`PacketLoss::rate`] to construct this variant, it validates
    /// the value at creation time.
    Rate(PacketLossRate),
}

/// A validated packet loss probability in the range `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketLossRate(f64);

impl PacketLoss {
    /// Create a `PacketLoss::Rate` with a validated loss probability.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::LossRate`] if `rate` is not in `[0.0, 1.0]`
    /// (including NaN).
    pub fn rate(rate: f64) -> Result<Self, ArgumentError> {
        Ok(PacketLoss::Rate(PacketLossRate::new(rate)?))
    }

    /// The probability for a packet to be dropped.
    pub fn probability(&self) -> f64 {
        match self {
            PacketLoss::None => 0.0,
            PacketLoss::Rate(rate) => rate.value(),
        }
    }

    /// Returns `true` if this packet should be dropped.
    ///
    /// The caller provides `rng` so that all simulation randomness comes
    /// from the single seedable source owned by the [`Network`].
    ///
    /// [`Network`]: crate::network::Network
    pub fn should_drop<R: Rng>(&self, rng: &mut R) -> bool {
        match self {
            PacketLoss::None => false,
            PacketLoss::Rate(rate) => {
                // 53 random bits give every representable f64 in [0, 1)
                let bits = rng.next_u64() >> 11;
                let sample = (bits as f64) * (1.0 / (1u64 << 53) as f64);
                sample < rate.0
            }
        }
    }
}

impl Default for PacketLoss {
    fn default() -> Self {
        crate::defaults::DEFAULT_PACKET_LOSS
    }
}

impl fmt::Display for PacketLoss {
    /// Formats as a percentage with up to 2 decimal places.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketLoss::None => write!(f, "0%"),
            PacketLoss::Rate(rate) => write!(f, "{rate}"),
        }
    }
}

impl FromStr for PacketLoss {
    type Err = PacketLossParseError;

    /// Parses a percentage string like `"0%"`, `"5%"`, `"12.30%"`, `"100%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(num) = s.strip_suffix('%') else {
            return Err(PacketLossParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| PacketLossParseError::InvalidNumber)?;
        let rate = pct / 100.0;
        if rate == 0.0 {
            return Ok(PacketLoss::None);
        }
        PacketLoss::rate(rate).map_err(PacketLossParseError::OutOfRange)
    }
}

impl fmt::Display for PacketLossRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{:.2}%", pct)
        }
    }
}

impl PacketLossRate {
    /// # Errors
    ///
    /// Returns [`ArgumentError::LossRate`] if `rate` is NaN, negative, or
    /// greater than `1.0`.
    pub fn new(rate: f64) -> Result<Self, ArgumentError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ArgumentError::LossRate(rate));
        }
        Ok(Self(rate))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Error returned when parsing a [`PacketLoss`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketLossParseError {
    #[error("expected '%' suffix")]
    MissingSuffix,
    #[error("invalid number before '%'")]
    InvalidNumber,
    #[error("{0}")]
    OutOfRange(#[from] ArgumentError),
}
