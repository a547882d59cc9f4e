use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

pub const DEFAULT_DISPLAY_TIMEZONE: &str =
  "Asia/Kolkata";

/// The dashboard's wall-clock zone.
#[must_use]
pub fn display_timezone() -> Tz {
  chrono_tz::Asia::Kolkata
}

#[must_use]
pub fn civil_date_in(
  dt: DateTime<Utc>,
  tz: Tz
) -> NaiveDate {
  dt.with_timezone(&tz).date_naive()
}

#[must_use]
pub fn format_civil_date(
  dt: DateTime<Utc>,
  tz: Tz
) -> String {
  civil_date_in(dt, tz)
    .format("%Y-%m-%d")
    .to_string()
}

#[must_use]
pub fn format_display_datetime(
  dt: DateTime<Utc>,
  tz: Tz
) -> String {
  dt.with_timezone(&tz)
    .format("%Y-%m-%d %H:%M")
    .to_string()
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured display timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

fn to_utc_from_local(
  local_naive: NaiveDateTime,
  tz: Tz,
  context: &str
) -> anyhow::Result<DateTime<Utc>> {
  match tz.from_local_datetime(&local_naive)
  {
    | LocalResult::Single(local_dt) => {
      Ok(local_dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::warn!(
        context,
        first = %first,
        second = %second,
        "ambiguous local datetime; using earliest"
      );
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Ok(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => {
      Err(anyhow!(
        "local datetime does not \
         exist in {}: {context}",
        tz.name()
      ))
    }
  }
}

/// Parses the instant used as "now" by
/// the CLI. Date-only and naive forms are
/// read as wall-clock time in `tz`.
#[tracing::instrument(skip(now), fields(input = input))]
pub fn parse_instant(
  input: &str,
  now: DateTime<Utc>,
  tz: Tz
) -> anyhow::Result<DateTime<Utc>> {
  let token = input.trim();

  if token.eq_ignore_ascii_case("now") {
    return Ok(now);
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(dt.with_timezone(&Utc));
  }

  if let Ok(ndt) =
    NaiveDateTime::parse_from_str(
      token,
      "%Y%m%dT%H%M%SZ"
    )
  {
    return Ok(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    let midnight = date
      .and_hms_opt(0, 0, 0)
      .ok_or_else(|| {
        anyhow!(
          "failed to construct \
           midnight for date"
        )
      })?;
    return to_utc_from_local(
      midnight, tz, "date"
    );
  }

  for fmt in
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
  {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return to_utc_from_local(
        ndt, tz, fmt
      );
    }
  }

  Err(anyhow!(
    "unrecognized instant: {input}"
  ))
  .with_context(|| {
    "supported formats: now, RFC3339, \
     YYYY-MM-DD, YYYY-MM-DDTHH:MM, \
     YYYY-MM-DD HH:MM, YYYYMMDDTHHMMSSZ"
  })
}
