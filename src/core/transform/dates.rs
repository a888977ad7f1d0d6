//! Timestamp rendering
//!
//! All record timestamps are epoch milliseconds and are rendered in UTC.

use crate::domain::{Result, TabulaError};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

const SECONDS_PER_DAY: i64 = 86_400;

/// Converts epoch milliseconds to a UTC date-time
pub fn utc(timestamp_ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp_ms).ok_or_else(|| {
        TabulaError::malformed(format!("timestamp {timestamp_ms} is out of range"))
    })
}

/// Calendar date, `YYYY-MM-DD`
pub fn iso_date(timestamp_ms: i64) -> Result<String> {
    Ok(utc(timestamp_ms)?.format("%Y-%m-%d").to_string())
}

/// Second-precision instant, `YYYY-MM-DDTHH:MM:SSZ`
pub fn iso_timestamp(timestamp_ms: i64) -> Result<String> {
    Ok(utc(timestamp_ms)?.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Calendar date, `MM/DD/YYYY`
pub fn short_date(timestamp_ms: i64) -> Result<String> {
    Ok(calendar_day(timestamp_ms)?.format("%m/%d/%Y").to_string())
}

/// Renders an optional timestamp; an unset one becomes the empty field
pub fn optional(timestamp_ms: Option<i64>, render: fn(i64) -> Result<String>) -> Result<String> {
    timestamp_ms
        .map(render)
        .transpose()
        .map(Option::unwrap_or_default)
}

pub fn calendar_day(timestamp_ms: i64) -> Result<NaiveDate> {
    Ok(utc(timestamp_ms)?.date_naive())
}

/// Whole calendar days between the dates of two timestamps
///
/// Time of day is discarded before subtracting, so 23:00 on one day to 01:00
/// on the next counts as one day. Negative when `stop` precedes `start`.
pub fn days_between(start_ms: i64, stop_ms: i64) -> Result<i64> {
    let start = calendar_day(start_ms)?;
    let stop = calendar_day(stop_ms)?;
    Ok((stop - start).num_days())
}

/// Record date plus a random time of day, `YYYY-MM-DDTHH:MM:SSZ`
///
/// Drawn independently per call. The consumer of the timeline layout rejects
/// identical timestamps; the time of day carries no clinical meaning.
pub fn jittered_timestamp(timestamp_ms: i64) -> Result<String> {
    jittered_timestamp_with(&mut rand::thread_rng(), timestamp_ms)
}

/// [`jittered_timestamp`] with a caller-supplied random source
pub fn jittered_timestamp_with<R: Rng + ?Sized>(rng: &mut R, timestamp_ms: i64) -> Result<String> {
    let midnight = utc(timestamp_ms)?.timestamp().div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
    let jittered = DateTime::from_timestamp(midnight + rng.gen_range(0..SECONDS_PER_DAY), 0)
        .ok_or_else(|| {
            TabulaError::malformed(format!("timestamp {timestamp_ms} is out of range"))
        })?;
    Ok(jittered.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_formats() {
        let ts = ms(2020, 1, 5, 14, 30);
        assert_eq!(iso_date(ts).unwrap(), "2020-01-05");
        assert_eq!(iso_timestamp(ts).unwrap(), "2020-01-05T14:30:00Z");
        assert_eq!(short_date(ts).unwrap(), "01/05/2020");
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(None, iso_date).unwrap(), "");
        assert_eq!(
            optional(Some(ms(2021, 3, 9, 0, 0)), short_date).unwrap(),
            "03/09/2021"
        );
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert!(matches!(
            iso_date(i64::MAX),
            Err(TabulaError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_days_between_uses_calendar_dates() {
        assert_eq!(
            days_between(ms(2020, 1, 1, 0, 0), ms(2020, 1, 11, 0, 0)).unwrap(),
            10
        );
        // Less than 24 hours apart but on different dates
        assert_eq!(
            days_between(ms(2020, 1, 1, 23, 0), ms(2020, 1, 2, 1, 0)).unwrap(),
            1
        );
        assert_eq!(
            days_between(ms(2020, 1, 11, 0, 0), ms(2020, 1, 1, 0, 0)).unwrap(),
            -10
        );
        assert_eq!(
            days_between(ms(2020, 1, 1, 8, 0), ms(2020, 1, 1, 9, 0)).unwrap(),
            0
        );
    }

    #[test]
    fn test_jittered_timestamp_keeps_date() {
        let mut rng = StdRng::seed_from_u64(7);
        let ts = ms(2019, 6, 30, 9, 15);
        for _ in 0..100 {
            let rendered = jittered_timestamp_with(&mut rng, ts).unwrap();
            assert!(rendered.starts_with("2019-06-30T"), "{rendered}");
            assert!(rendered.ends_with('Z'));
            assert_eq!(rendered.len(), 20);
        }
    }

    #[test]
    fn test_jittered_timestamp_varies() {
        let ts = ms(2019, 6, 30, 9, 15);
        let rendered: std::collections::HashSet<String> =
            (0..50).map(|_| jittered_timestamp(ts).unwrap()).collect();
        assert!(rendered.len() > 1);
    }
}
