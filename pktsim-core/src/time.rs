use anyhow::{Result, anyhow, bail, ensure};
use core::fmt;
use logos::{Lexer, Logos};
use std::{ops::Add, str::FromStr, time};

/// A point on the simulation clock.
///
/// Every run starts at [`SimTime::ZERO`] and the clock only moves when the
/// [`EventScheduler`] pops an event. The resolution is the nanosecond,
/// the same as [`std::time::Duration`], so delays computed from bandwidth
/// and latency stay exact for any realistic configuration.
///
/// ```
/// # use pktsim_core::SimTime;
/// # use std::time::Duration;
/// let t = SimTime::ZERO + Duration::from_millis(81);
/// assert_eq!(t.as_secs_f64(), 0.081);
/// assert_eq!(t.to_string(), "81ms");
/// ```
///
/// [`EventScheduler`]: crate::scheduler::EventScheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(time::Duration);

impl SimTime {
    /// the origin of every simulation run
    pub const ZERO: Self = Self(time::Duration::ZERO);

    pub const fn from_duration(since_start: time::Duration) -> Self {
        Self(since_start)
    }

    /// time elapsed since the beginning of the run
    #[inline]
    pub fn since_start(self) -> time::Duration {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Returns the amount of time elapsed from `earlier` to `self`,
    /// or `None` if `earlier` is later than `self`.
    pub fn checked_duration_since(self, earlier: SimTime) -> Option<time::Duration> {
        self.0.checked_sub(earlier.0)
    }
}

impl Add<time::Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: time::Duration) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Duration::new(self.0).fmt(f)
    }
}

/// Human readable duration, shared by [`SimTime`] and [`Latency`].
///
/// Displayed as a sum of components (`1s542ms`, `81ms`, `3µs`) and parsed
/// back from the same notation, white spaces between components allowed.
///
/// [`Latency`]: crate::measure::Latency
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub(crate) struct Duration(time::Duration);

impl Duration {
    pub(crate) fn new(dur: time::Duration) -> Self {
        Self(dur)
    }

    #[inline]
    pub fn into_duration(self) -> time::Duration {
        self.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_zero() {
            return f.write_str("0s");
        }

        let secs = self.0.as_secs();
        let subsec = self.0.subsec_nanos();
        let millis = subsec / 1_000_000;
        let micros = (subsec / 1_000) % 1_000;
        let nanos = subsec % 1_000;

        if secs != 0 {
            write!(f, "{secs}s")?;
        }
        if millis != 0 {
            write!(f, "{millis}ms")?;
        }
        if micros != 0 {
            write!(f, "{micros}µs")?;
        }
        if nanos != 0 {
            write!(f, "{nanos}ns")?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::new(s);

        let mut durations = Vec::new();

        while let Some(next) = lex.next() {
            let number: Token = next.map_err(|()| anyhow!("Failed to parse: {s}"))?;

            ensure!(
                number == Token::Value,
                "Expecting duration to starts with number. Cannot parse {s}"
            );
            let number: u64 = lex.slice().parse()?;

            let Some(Ok(measure)) = lex.next() else {
                bail!("Expecting a measure, failed to parse: {s}")
            };
            let duration = match measure {
                Token::NanoSeconds => time::Duration::from_nanos(number),
                Token::MicroSeconds => time::Duration::from_micros(number),
                Token::MilliSeconds => time::Duration::from_millis(number),
                Token::Seconds => time::Duration::from_secs(number),
                Token::Minutes => time::Duration::from_secs(number * 60),
                Token::Value => bail!("Failed to parse `{s}', expecting a measure."),
            };
            durations.push(duration);
        }

        ensure!(!durations.is_empty(), "Cannot parse an empty duration");

        Ok(Self(durations.into_iter().sum()))
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum Token {
    #[token("ns")]
    NanoSeconds,
    #[regex("us|\u{03bc}s|\u{00b5}s")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,

    #[regex("[0-9]+")]
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logos_lexer() {
        let mut lex = Token::lexer("1ns");

        assert_eq!(lex.next(), Some(Ok(Token::Value)));
        assert_eq!(lex.slice(), "1");

        assert_eq!(lex.next(), Some(Ok(Token::NanoSeconds)));
        assert_eq!(lex.span(), 1..3);
    }

    #[test]
    fn parse() {
        let Duration(duration) = "123ms".parse().unwrap();
        assert_eq!(duration.as_millis(), 123);

        let Duration(duration) = "1s 2000ms 3000000us".parse().unwrap();
        assert_eq!(duration.as_secs(), 6);

        let Duration(duration) = "7µs".parse().unwrap();
        assert_eq!(duration.as_micros(), 7);
    }

    #[test]
    fn parse_empty_fails() {
        assert!("".parse::<Duration>().is_err());
        assert!("12".parse::<Duration>().is_err());
    }

    #[test]
    fn display_components() {
        let display = |d: time::Duration| Duration::new(d).to_string();

        assert_eq!(display(time::Duration::ZERO), "0s");
        assert_eq!(display(time::Duration::from_millis(1_542)), "1s542ms");
        assert_eq!(display(time::Duration::from_nanos(1_500)), "1µs500ns");
    }

    #[test]
    fn sim_time_arithmetic() {
        let start = SimTime::ZERO;
        let later = start + time::Duration::from_millis(5);

        assert!(later > start);
        assert_eq!(
            later.checked_duration_since(start),
            Some(time::Duration::from_millis(5))
        );
        assert_eq!(start.checked_duration_since(later), None);
    }
}
