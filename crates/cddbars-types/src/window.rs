//! Aggregation window definitions.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use crate::CddError;

/// Aggregation window: a positive whole number of minutes.
///
/// A window of one minute is the identity aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Window(NonZeroU32);

impl Window {
    /// One-minute window (no aggregation).
    pub const MINUTE: Self = Self(NonZeroU32::MIN);

    /// Creates a window of `minutes` minutes.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::InvalidAggregationWindow`] if `minutes` is zero.
    pub fn from_minutes(minutes: u32) -> Result<Self, CddError> {
        NonZeroU32::new(minutes).map(Self).ok_or_else(|| {
            CddError::InvalidAggregationWindow(format!("{minutes} minutes (must be >= 1)"))
        })
    }

    /// Returns the window length in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.0.get()
    }

    /// Returns the window length as a [`Duration`].
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.0.get() as u64 * 60)
    }

    /// Returns true if this window leaves minute bars unchanged.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.0.get() == 1
    }

    /// Parses the numeric part of a window string, scaled by `unit` minutes.
    fn scaled(digits: &str, unit: u32, raw: &str) -> Result<Self, CddError> {
        let n: u32 = digits
            .parse()
            .map_err(|_| CddError::InvalidAggregationWindow(format!("'{raw}'")))?;
        let minutes = n
            .checked_mul(unit)
            .ok_or_else(|| CddError::InvalidAggregationWindow(format!("'{raw}' overflows")))?;
        Self::from_minutes(minutes)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::MINUTE
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.minutes()
    }
}

impl TryFrom<u32> for Window {
    type Error = CddError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
    }
}

impl TryFrom<Duration> for Window {
    type Error = CddError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        let secs = duration.as_secs();
        if duration.subsec_nanos() != 0 || secs % 60 != 0 {
            return Err(CddError::InvalidAggregationWindow(format!(
                "{duration:?} is not a whole number of minutes"
            )));
        }
        let minutes = u32::try_from(secs / 60).map_err(|_| {
            CddError::InvalidAggregationWindow(format!("{duration:?} is too large"))
        })?;
        Self::from_minutes(minutes)
    }
}

impl FromStr for Window {
    type Err = CddError;

    /// Parses `4m`, `m4`, `4`, `1h`, `h4`, `1d`, `minute`, `hour` or `day`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_lowercase();
        match v.as_str() {
            "minute" => return Ok(Self::MINUTE),
            "hour" => return Self::from_minutes(60),
            "day" | "daily" => return Self::from_minutes(1440),
            _ => {}
        }

        if let Some(d) = v.strip_suffix('m').or_else(|| v.strip_prefix('m')) {
            Self::scaled(d, 1, s)
        } else if let Some(d) = v.strip_suffix('h').or_else(|| v.strip_prefix('h')) {
            Self::scaled(d, 60, s)
        } else if let Some(d) = v.strip_suffix('d').or_else(|| v.strip_prefix('d')) {
            Self::scaled(d, 1440, s)
        } else {
            Self::scaled(&v, 1, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_minutes() {
        assert_eq!(Window::from_minutes(4).unwrap().minutes(), 4);
        assert!(Window::from_minutes(1).unwrap().is_identity());
        assert!(matches!(
            Window::from_minutes(0),
            Err(CddError::InvalidAggregationWindow(_))
        ));
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("4m".parse::<Window>().unwrap().minutes(), 4);
        assert_eq!("24M".parse::<Window>().unwrap().minutes(), 24);
        assert_eq!("m15".parse::<Window>().unwrap().minutes(), 15);
        assert_eq!(" 30 ".parse::<Window>().unwrap().minutes(), 30);
        assert_eq!("1h".parse::<Window>().unwrap().minutes(), 60);
        assert_eq!("h4".parse::<Window>().unwrap().minutes(), 240);
        assert_eq!("1d".parse::<Window>().unwrap().minutes(), 1440);
        assert_eq!("minute".parse::<Window>().unwrap(), Window::MINUTE);
        assert!("0m".parse::<Window>().is_err());
        assert!("-4m".parse::<Window>().is_err());
        assert!("4.5m".parse::<Window>().is_err());
        assert!("4s".parse::<Window>().is_err());
        assert!("".parse::<Window>().is_err());
    }

    #[test]
    fn test_window_from_duration() {
        let w = Window::try_from(Duration::from_secs(24 * 60)).unwrap();
        assert_eq!(w.minutes(), 24);
        assert_eq!(w.duration(), Duration::from_secs(1440));

        assert!(Window::try_from(Duration::from_secs(90)).is_err());
        assert!(Window::try_from(Duration::from_secs(30)).is_err());
        assert!(Window::try_from(Duration::ZERO).is_err());
        assert!(Window::try_from(Duration::from_millis(60_500)).is_err());
    }

    #[test]
    fn test_window_display_and_serde() {
        let w = Window::from_minutes(24).unwrap();
        assert_eq!(w.to_string(), "24m");
        assert_eq!(serde_json::to_string(&w).unwrap(), "24");
        assert_eq!(serde_json::from_str::<Window>("4").unwrap().minutes(), 4);
        assert!(serde_json::from_str::<Window>("0").is_err());
    }
}
