use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::CoreError;

/// Fixed UTC offset of India Standard
/// Time. IST observes no daylight
/// saving, so a constant is exact.
pub const IST_OFFSET_MINUTES: i64 = 330;

pub const MINUTES_PER_DAY: i64 = 1440;

/// Fallback shown for an unreadable UTC
/// time when rendering in IST.
pub const DEFAULT_IST_TIME: &str =
  "09:00";

/// Fallback stored for an unreadable IST
/// time; the 09:00 IST default in UTC.
pub const DEFAULT_UTC_TIME: &str =
  "03:30";

const TIME_PATTERN: &str = r"^(?P<hour>[0-1]?[0-9]|2[0-3]):(?P<minute>[0-5][0-9])$";

fn time_pattern() -> Option<&'static Regex>
{
  static TIME_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  TIME_RE
    .get_or_init(|| {
      match Regex::new(TIME_PATTERN) {
        | Ok(re) => Some(re),
        | Err(err) => {
          tracing::error!(
            error = %err,
            "failed to compile time pattern"
          );
          None
        }
      }
    })
    .as_ref()
}

/// A wall-clock time of day with minute
/// precision and no calendar date.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct ClockTime {
  hour:   u32,
  minute: u32
}

impl ClockTime {
  #[must_use]
  pub fn new(
    hour: u32,
    minute: u32
  ) -> Option<Self> {
    if hour > 23 || minute > 59 {
      return None;
    }
    Some(Self {
      hour,
      minute
    })
  }

  #[must_use]
  pub fn hour(&self) -> u32 {
    self.hour
  }

  #[must_use]
  pub fn minute(&self) -> u32 {
    self.minute
  }

  #[must_use]
  pub fn minutes_since_midnight(
    &self
  ) -> i64 {
    i64::from(self.hour) * 60
      + i64::from(self.minute)
  }

  /// Wraps any minute count onto the
  /// 24-hour dial.
  #[must_use]
  pub fn from_minutes(
    minutes: i64
  ) -> Self {
    let wrapped =
      minutes.rem_euclid(MINUTES_PER_DAY);
    // rem_euclid keeps this in 0..1440
    Self {
      hour:   (wrapped / 60) as u32,
      minute: (wrapped % 60) as u32
    }
  }

  /// Treats `self` as UTC and returns
  /// the IST time of day.
  #[must_use]
  pub fn to_ist(&self) -> Self {
    Self::from_minutes(
      self.minutes_since_midnight()
        + IST_OFFSET_MINUTES
    )
  }

  /// Treats `self` as IST and returns
  /// the UTC time of day.
  #[must_use]
  pub fn to_utc(&self) -> Self {
    Self::from_minutes(
      self.minutes_since_midnight()
        - IST_OFFSET_MINUTES
    )
  }
}

impl FromStr for ClockTime {
  type Err = CoreError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let captures = time_pattern()
      .and_then(|re| re.captures(s))
      .ok_or_else(|| {
        CoreError::invalid_time(s)
      })?;

    let hour = captures
      .name("hour")
      .and_then(|m| {
        m.as_str().parse::<u32>().ok()
      })
      .ok_or_else(|| {
        CoreError::invalid_time(s)
      })?;
    let minute = captures
      .name("minute")
      .and_then(|m| {
        m.as_str().parse::<u32>().ok()
      })
      .ok_or_else(|| {
        CoreError::invalid_time(s)
      })?;

    Self::new(hour, minute).ok_or_else(
      || CoreError::invalid_time(s)
    )
  }
}

impl fmt::Display for ClockTime {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:02}:{:02}",
      self.hour, self.minute
    )
  }
}

#[must_use]
pub fn is_valid_time(input: &str) -> bool {
  input.parse::<ClockTime>().is_ok()
}

#[tracing::instrument(level = "trace")]
pub fn convert_utc_to_ist(
  utc: &str
) -> Result<String, CoreError> {
  let time: ClockTime = utc.parse()?;
  Ok(time.to_ist().to_string())
}

#[tracing::instrument(level = "trace")]
pub fn convert_ist_to_utc(
  ist: &str
) -> Result<String, CoreError> {
  let time: ClockTime = ist.parse()?;
  Ok(time.to_utc().to_string())
}

/// UTC to IST for display paths: invalid
/// or empty input renders as `fallback`.
pub fn utc_to_ist_or(
  utc: &str,
  fallback: &str
) -> String {
  convert_utc_to_ist(utc)
    .unwrap_or_else(|err| {
      debug!(
        error = %err,
        fallback,
        "using fallback IST time"
      );
      fallback.to_string()
    })
}

/// IST to UTC for form paths: invalid or
/// empty input stores `fallback`.
pub fn ist_to_utc_or(
  ist: &str,
  fallback: &str
) -> String {
  convert_ist_to_utc(ist)
    .unwrap_or_else(|err| {
      debug!(
        error = %err,
        fallback,
        "using fallback UTC time"
      );
      fallback.to_string()
    })
}

/// Legacy dashboard behaviour: unreadable
/// input becomes [`DEFAULT_IST_TIME`].
pub fn utc_to_ist_or_default(
  utc: &str
) -> String {
  utc_to_ist_or(utc, DEFAULT_IST_TIME)
}

/// Legacy dashboard behaviour: unreadable
/// input becomes [`DEFAULT_UTC_TIME`].
pub fn ist_to_utc_or_default(
  ist: &str
) -> String {
  ist_to_utc_or(ist, DEFAULT_UTC_TIME)
}
