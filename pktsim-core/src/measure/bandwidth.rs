use crate::error::ArgumentError;
use anyhow::{bail, ensure};
use logos::{Lexer, Logos};
use std::{fmt, str::FromStr, time::Duration};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// The bit rate of a [`Link`].
///
/// Stored in bits per second. A bandwidth is never `0`: the
/// serialization delay of a packet is `size * 8 / bandwidth`.
///
/// # Example
///
/// ```
/// # use pktsim_core::measure::Bandwidth;
/// # use std::time::Duration;
/// let bw = Bandwidth::new(100_000).unwrap();
///
/// // 1_000 bytes = 8_000 bits, pushed at 100kbps
/// assert_eq!(bw.serialization_delay(1_000), Duration::from_millis(80));
/// assert_eq!(bw.to_string(), "100kbps");
/// assert_eq!("100kbps".parse::<Bandwidth>().unwrap(), bw);
///
/// assert!(Bandwidth::new(0).is_err());
/// ```
///
/// [`Link`]: crate::link::Link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bandwidth(u64);

impl Bandwidth {
    /// create a new [`Bandwidth`] of `bps` bits per second
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ZeroBandwidth`] if `bps` is `0`.
    pub fn new(bps: u64) -> Result<Self, ArgumentError> {
        if bps == 0 {
            Err(ArgumentError::ZeroBandwidth)
        } else {
            Ok(Self(bps))
        }
    }

    /// constructor for constants, fails to compile with a `0` bandwidth
    pub(crate) const fn from_bps_const(bps: u64) -> Self {
        assert!(bps > 0, "bandwidth must be greater than 0");
        Self(bps)
    }

    #[inline]
    pub fn bits_per_second(&self) -> u64 {
        self.0
    }

    /// Time it takes to push `bytes` onto a link at this bit rate.
    ///
    /// Rounded up to the next nanosecond so that a non empty packet
    /// always takes some time to serialize.
    pub fn serialization_delay(&self, bytes: u64) -> Duration {
        let bits = (bytes as u128) * 8;
        let nanos = (bits * NANOS_PER_SEC).div_ceil(self.0 as u128);

        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }
}

const K: u64 = 1_000;
const M: u64 = 1_000 * K;
const G: u64 = 1_000 * M;

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.0;

        if v % G == 0 {
            write!(f, "{}gbps", v / G)
        } else if v % M == 0 {
            write!(f, "{}mbps", v / M)
        } else if v % K == 0 {
            write!(f, "{}kbps", v / K)
        } else {
            write!(f, "{v}bps")
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum BandwidthToken {
    #[token("bps")]
    Bps,
    #[token("kbps")]
    Kbps,
    #[token("mbps")]
    Mbps,
    #[token("gbps")]
    Gbps,

    #[regex("[0-9]+")]
    Value,
}

impl FromStr for Bandwidth {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, BandwidthToken>::new(s);

        let Some(Ok(BandwidthToken::Value)) = lex.next() else {
            bail!("Expecting to parse a number")
        };
        let number: u64 = lex.slice().parse()?;
        let Some(Ok(token)) = lex.next() else {
            bail!("Expecting to parse a unit")
        };
        let multiplier = match token {
            BandwidthToken::Bps => 1,
            BandwidthToken::Kbps => K,
            BandwidthToken::Mbps => M,
            BandwidthToken::Gbps => G,
            BandwidthToken::Value => bail!("Expecting to parse a unit (bps, kbps, ...)"),
        };

        ensure!(
            lex.next().is_none(),
            "Not expecting any other tokens to parse a bandwidth"
        );

        let Some(bps) = number.checked_mul(multiplier) else {
            bail!("Bandwidth `{s}' does not fit in 64 bits")
        };

        Ok(Self::new(bps)?)
    }
}

impl Default for Bandwidth {
    fn default() -> Self {
        crate::defaults::DEFAULT_BANDWIDTH
    }
}
