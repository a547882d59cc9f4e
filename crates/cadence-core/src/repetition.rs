use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clock::{ClockTime, convert_ist_to_utc};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeekdayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }
}

impl FromStr for WeekdayCode {
    type Err = CoreError;

    /// Case-insensitive, so `Mon` and `mon` read the same as `MON`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MON" => Ok(Self::Mon),
            "TUE" => Ok(Self::Tue),
            "WED" => Ok(Self::Wed),
            "THU" => Ok(Self::Thu),
            "FRI" => Ok(Self::Fri),
            "SAT" => Ok(Self::Sat),
            "SUN" => Ok(Self::Sun),
            _ => Err(CoreError::invalid_repetition(format!("unknown weekday code {s:?}"))),
        }
    }
}

impl fmt::Display for WeekdayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a recurring task repeats. `at_time` is the stored UTC `HH:MM`,
/// kept verbatim so that display code can apply its own fallback when
/// the backend hands back something unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RepetitionWire", into = "RepetitionWire")]
pub enum RepetitionConfig {
    Interval {
        days: u32,
        at_time: Option<String>,
    },
    Weekly {
        on_days: Vec<WeekdayCode>,
        at_time: Option<String>,
    },
    Monthly {
        on_date: u32,
        at_time: Option<String>,
    },
    None,
    /// A `type` this build does not know about.
    Unrecognized {
        kind: String,
    },
    /// A known `type` whose fields could not be read. Decoding keeps
    /// going so one bad task does not sink a whole snapshot.
    Malformed {
        kind: String,
        reason: String,
    },
}

impl RepetitionConfig {
    pub fn kind(&self) -> &str {
        match self {
            Self::Interval { .. } => "interval",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
            Self::None => "none",
            Self::Unrecognized { kind } | Self::Malformed { kind, .. } => kind,
        }
    }

    pub fn at_time(&self) -> Option<&str> {
        match self {
            Self::Interval { at_time, .. }
            | Self::Weekly { at_time, .. }
            | Self::Monthly { at_time, .. } => at_time.as_deref(),
            Self::None | Self::Unrecognized { .. } | Self::Malformed { .. } => None,
        }
    }

    pub fn interval_at_local(days: u32, local_time: &str) -> Result<Self, CoreError> {
        let config = Self::Interval {
            days,
            at_time: Some(convert_ist_to_utc(local_time)?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn weekly_at_local(on_days: Vec<WeekdayCode>, local_time: &str) -> Result<Self, CoreError> {
        let config = Self::Weekly {
            on_days,
            at_time: Some(convert_ist_to_utc(local_time)?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn monthly_at_local(on_date: u32, local_time: &str) -> Result<Self, CoreError> {
        let config = Self::Monthly {
            on_date,
            at_time: Some(convert_ist_to_utc(local_time)?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Strict check used before a config is sent to the backend.
    #[tracing::instrument(skip(self), fields(kind = self.kind()))]
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Interval { days, at_time } => {
                if *days == 0 {
                    return Err(CoreError::invalid_repetition(
                        "interval days must be positive",
                    ));
                }
                validate_at_time(at_time.as_deref())
            }
            Self::Weekly { on_days, at_time } => {
                if on_days.is_empty() {
                    return Err(CoreError::invalid_repetition(
                        "weekly schedule needs at least one day",
                    ));
                }
                let mut seen = HashSet::with_capacity(on_days.len());
                if let Some(day) = on_days.iter().find(|day| !seen.insert(**day)) {
                    return Err(CoreError::invalid_repetition(format!(
                        "weekly schedule lists {day} more than once"
                    )));
                }
                validate_at_time(at_time.as_deref())
            }
            Self::Monthly { on_date, at_time } => {
                if !(1..=31).contains(on_date) {
                    return Err(CoreError::invalid_repetition(format!(
                        "day of month must be 1-31, got {on_date}"
                    )));
                }
                validate_at_time(at_time.as_deref())
            }
            Self::None => Ok(()),
            Self::Unrecognized { kind } => Err(CoreError::UnrecognizedRepetitionType {
                kind: kind.clone(),
            }),
            Self::Malformed { reason, .. } => Err(CoreError::invalid_repetition(reason.clone())),
        }
    }
}

fn validate_at_time(at_time: Option<&str>) -> Result<(), CoreError> {
    let raw = at_time.ok_or_else(|| CoreError::invalid_repetition("atTime is required"))?;
    raw.parse::<ClockTime>().map(|_| ())
}

/// The backend's flat JSON shape. Numbers and weekday codes are read
/// loosely here and checked when mapped onto [`RepetitionConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepetitionWire {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    at_time: Option<String>,
}

fn field_u32(value: Option<i64>, field: &str) -> Result<u32, String> {
    let raw = value.ok_or_else(|| format!("missing {field}"))?;
    u32::try_from(raw).map_err(|_| format!("{field} out of range: {raw}"))
}

fn weekday_codes(value: Option<Vec<String>>) -> Result<Vec<WeekdayCode>, String> {
    value
        .ok_or_else(|| "missing onDays".to_string())?
        .iter()
        .map(|code| code.parse::<WeekdayCode>().map_err(|err| err.to_string()))
        .collect()
}

impl From<RepetitionWire> for RepetitionConfig {
    fn from(wire: RepetitionWire) -> Self {
        let kind = wire.kind.unwrap_or_else(|| "none".to_string());
        let parsed = match kind.as_str() {
            "interval" => field_u32(wire.days, "days").map(|days| Self::Interval {
                days,
                at_time: wire.at_time,
            }),
            "weekly" => weekday_codes(wire.on_days).map(|on_days| Self::Weekly {
                on_days,
                at_time: wire.at_time,
            }),
            "monthly" => field_u32(wire.on_date, "onDate").map(|on_date| Self::Monthly {
                on_date,
                at_time: wire.at_time,
            }),
            "none" => Ok(Self::None),
            _ => {
                tracing::warn!(kind = %kind, "unrecognized repetition type");
                return Self::Unrecognized { kind };
            }
        };

        parsed.unwrap_or_else(|reason| {
            tracing::warn!(kind = %kind, reason = %reason, "malformed repetition config");
            Self::Malformed { kind, reason }
        })
    }
}

impl From<RepetitionConfig> for RepetitionWire {
    fn from(config: RepetitionConfig) -> Self {
        match config {
            RepetitionConfig::Interval { days, at_time } => Self {
                kind: Some("interval".to_string()),
                days: Some(i64::from(days)),
                at_time,
                ..Self::default()
            },
            RepetitionConfig::Weekly { on_days, at_time } => Self {
                kind: Some("weekly".to_string()),
                on_days: Some(on_days.iter().map(|day| day.as_str().to_string()).collect()),
                at_time,
                ..Self::default()
            },
            RepetitionConfig::Monthly { on_date, at_time } => Self {
                kind: Some("monthly".to_string()),
                on_date: Some(i64::from(on_date)),
                at_time,
                ..Self::default()
            },
            RepetitionConfig::None => Self {
                kind: Some("none".to_string()),
                ..Self::default()
            },
            RepetitionConfig::Unrecognized { kind } | RepetitionConfig::Malformed { kind, .. } => {
                Self {
                    kind: Some(kind),
                    ..Self::default()
                }
            }
        }
    }
}
