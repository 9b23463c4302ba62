use crate::error::ArgumentError;
use std::{fmt, str::FromStr, time::Duration};

/// The latency is a measure of how much a signal takes to
/// travel between the two ends of a [`Link`].
///
/// This is the propagation delay: it does not depend on the size of the
/// packet. The time to push the bits of the packet onto the link is
/// given by the link's [`Bandwidth`].
///
/// # Default [`Latency`]
///
/// ```
/// # use pktsim_core::measure::Latency;
/// assert_eq!(
///     Latency::default().to_string(),
///     "1ms"
/// )
/// ```
///
/// [`Link`]: crate::link::Link
/// [`Bandwidth`]: crate::measure::Bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Latency(Duration);

impl Latency {
    /// The `0` latency. I.e. no latency.
    pub const ZERO: Self = Self::new(Duration::ZERO);

    /// create a new latency with the given [`Duration`].
    #[inline(always)]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// create a new latency from a number of seconds
    ///
    /// ```
    /// # use pktsim_core::measure::Latency;
    /// # use std::time::Duration;
    /// let latency = Latency::from_secs_f64(0.001).unwrap();
    /// assert_eq!(latency.into_duration(), Duration::from_millis(1));
    ///
    /// assert!(Latency::from_secs_f64(-0.5).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidDelay`] if `secs` is negative,
    /// NaN or infinite.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ArgumentError> {
        Duration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|_| ArgumentError::InvalidDelay(secs))
    }

    /// get the inner duration
    #[inline(always)]
    pub fn into_duration(self) -> Duration {
        self.0
    }
}

impl From<Latency> for Duration {
    fn from(value: Latency) -> Self {
        value.into_duration()
    }
}
impl From<Duration> for Latency {
    fn from(value: Duration) -> Self {
        Self::new(value)
    }
}

impl Default for Latency {
    fn default() -> Self {
        crate::defaults::DEFAULT_LATENCY
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::time::Duration::new(self.0).fmt(f)
    }
}

impl FromStr for Latency {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration: crate::time::Duration = s.parse()?;

        Ok(Self::new(duration.into_duration()))
    }
}
