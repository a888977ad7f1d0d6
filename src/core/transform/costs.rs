//! Cost and dispense arithmetic for the relational medication table

use crate::domain::{Medication, Result, TabulaError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Formats a money amount with exactly two decimals, rounding half away from zero
pub fn format_cost(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Converts a quantity of a named time unit to milliseconds
///
/// Months are 30 days and years are 365 days.
pub fn convert_time(unit: &str, quantity: i64) -> Result<i64> {
    let unit_ms = match unit.to_lowercase().as_str() {
        "year" | "years" => 365 * MS_PER_DAY,
        "month" | "months" => 30 * MS_PER_DAY,
        "week" | "weeks" => 7 * MS_PER_DAY,
        "day" | "days" => MS_PER_DAY,
        "hour" | "hours" => MS_PER_HOUR,
        "minute" | "minutes" => MS_PER_MINUTE,
        "second" | "seconds" => MS_PER_SECOND,
        "millisecond" | "milliseconds" => 1,
        other => {
            return Err(TabulaError::malformed(format!(
                "unknown time unit '{other}'"
            )))
        }
    };
    quantity
        .checked_mul(unit_ms)
        .ok_or_else(|| TabulaError::malformed(format!("{quantity} {unit} overflows")))
}

/// Number of times a prescription was filled
///
/// Explicit refills win; otherwise the active duration (stop, or `as_of` for a
/// prescription that never stopped) is divided by the prescribed duration, or by
/// one month when none is given. Always at least 1 since the initial fill
/// happened.
pub fn dispense_count(medication: &Medication, as_of: i64) -> Result<i64> {
    let details = medication.prescription_details.as_ref();
    let active_ms = medication
        .stop
        .unwrap_or(as_of)
        .checked_sub(medication.start)
        .ok_or_else(|| TabulaError::malformed("medication active period overflows"))?;

    let dispenses = if let Some(refills) = details.and_then(|d| d.get("refills")) {
        refills
            .as_i64()
            .ok_or_else(|| TabulaError::malformed(format!("refills is not an integer: {refills}")))?
    } else if let Some(duration) = details.and_then(|d| d.get("duration")) {
        active_ms / prescribed_duration_ms(duration)?
    } else {
        active_ms / convert_time("months", 1)?
    };

    Ok(dispenses.max(1))
}

/// Unit cost times dispenses, truncated (not rounded) to cents
pub fn total_cost(unit_cost: Decimal, dispenses: i64) -> Result<Decimal> {
    let total = unit_cost
        .checked_mul(Decimal::from(dispenses))
        .ok_or_else(|| TabulaError::malformed("medication total cost overflows"))?;
    Ok(total.round_dp_with_strategy(2, RoundingStrategy::ToZero))
}

fn prescribed_duration_ms(duration: &Value) -> Result<i64> {
    let quantity = duration
        .get("quantity")
        .and_then(|q| q.as_i64().or_else(|| q.as_f64().map(|f| f as i64)))
        .ok_or_else(|| TabulaError::malformed("prescription duration has no quantity"))?;
    let unit = duration
        .get("unit")
        .and_then(Value::as_str)
        .ok_or_else(|| TabulaError::malformed("prescription duration has no unit"))?;

    let ms = convert_time(unit, quantity)?;
    if ms <= 0 {
        return Err(TabulaError::malformed(format!(
            "prescription duration is not positive: {quantity} {unit}"
        )));
    }
    Ok(ms)
}
