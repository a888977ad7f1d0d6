//! Timeline layout
//!
//! Every event row leads with the patient MRN and a timestamp whose time of
//! day is randomized per row, since the timeline consumer rejects identical
//! timestamps. Spans are rendered as `MM/DD/YYYY` dates plus a day count, and
//! vitals and social determinants get their own tables instead of the lab
//! table.

use super::address::split_address;
use super::dates::{days_between, jittered_timestamp, optional, short_date};
use super::fields::{clean, is_social_determinant, is_vital_sign, observation_value, reason_fields};
use super::relational::demographics;
use super::{Reading, Row, RowContext, RowProjector, Variant};
use crate::domain::{
    attributes, CarePlan, Coded, Encounter, Entry, Medication, Person, Procedure, Result,
};

/// Day count reported for a span that has not ended
pub const OPEN_ENDED_DURATION: &str = "999";

/// Projector for the timeline layout
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineProjector;

impl RowProjector for TimelineProjector {
    fn variant(&self) -> Variant {
        Variant::Timeline
    }

    fn patient(&self, person: &Person, as_of: i64) -> Result<Row> {
        let address = split_address(
            person.required_attribute(attributes::ADDRESS)?,
            person.required_attribute(attributes::CITY)?,
            person.required_attribute(attributes::STATE)?,
            person.required_attribute(attributes::ZIP)?,
        );

        Ok(demographics(person, as_of)?.fields(address.into_fields()))
    }

    fn encounter(&self, ctx: &RowContext<'_>, encounter: &Encounter) -> Result<Row> {
        let code = encounter.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(encounter.start)?)
            .field(ctx.encounter_id)
            .field(short_date(encounter.start)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .fields(reason_fields(encounter.reason.as_ref())))
    }

    fn condition(&self, ctx: &RowContext<'_>, condition: &Entry) -> Result<Row> {
        let code = condition.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(condition.start)?)
            .field(ctx.encounter_id)
            .fields(span(condition.start, condition.stop)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str())))
    }

    fn observation(&self, ctx: &RowContext<'_>, reading: &Reading<'_>) -> Result<Option<Row>> {
        let code = reading.code()?;
        if is_vital_sign(&code.code) || is_social_determinant(&code.code) {
            return Ok(None);
        }
        measurement_row(ctx, reading).map(Some)
    }

    fn procedure(&self, ctx: &RowContext<'_>, procedure: &Procedure) -> Result<Row> {
        let code = procedure.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(procedure.start)?)
            .field(short_date(procedure.start)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .fields(reason_fields(procedure.reasons.first()))
            .field(ctx.encounter_id))
    }

    fn medication(&self, ctx: &RowContext<'_>, medication: &Medication) -> Result<Row> {
        let code = medication.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(medication.start)?)
            .field(ctx.encounter_id)
            .fields(span(medication.start, medication.stop)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .fields(reason_fields(medication.reasons.first())))
    }

    fn immunization(&self, ctx: &RowContext<'_>, immunization: &Entry) -> Result<Row> {
        let code = immunization.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(immunization.start)?)
            .field(short_date(immunization.start)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .field(ctx.encounter_id))
    }

    fn careplan(
        &self,
        ctx: &RowContext<'_>,
        careplan: &CarePlan,
        careplan_id: &str,
    ) -> Result<Row> {
        let code = careplan.primary_code()?;

        Ok(Row::new()
            .field(ctx.patient_id)
            .field(jittered_timestamp(careplan.start)?)
            .field(careplan_id)
            .field(ctx.encounter_id)
            .fields(span(careplan.start, careplan.stop)?)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .fields(reason_fields(careplan.reasons.first())))
    }

    fn vital_sign(&self, ctx: &RowContext<'_>, reading: &Reading<'_>) -> Result<Option<Row>> {
        if !is_vital_sign(&reading.code()?.code) {
            return Ok(None);
        }
        measurement_row(ctx, reading).map(Some)
    }

    fn social_determinant(
        &self,
        ctx: &RowContext<'_>,
        reading: &Reading<'_>,
    ) -> Result<Option<Row>> {
        if !is_social_determinant(&reading.code()?.code) {
            return Ok(None);
        }
        measurement_row(ctx, reading).map(Some)
    }
}

/// Start date, end date and whole-day duration
///
/// The duration is taken between the rendered calendar dates and is not
/// validated: an end before the start yields a negative count. An open span
/// has an empty end date and [`OPEN_ENDED_DURATION`].
fn span(start: i64, stop: Option<i64>) -> Result<[String; 3]> {
    let duration = match stop {
        Some(stop) => days_between(start, stop)?.to_string(),
        None => OPEN_ENDED_DURATION.to_string(),
    };
    Ok([short_date(start)?, optional(stop, short_date)?, duration])
}

/// Lab, vitals and social-determinant rows share one layout
fn measurement_row(ctx: &RowContext<'_>, reading: &Reading<'_>) -> Result<Row> {
    let start = reading.observation.start;
    let code = reading.code()?;

    Ok(Row::new()
        .field(ctx.patient_id)
        .field(jittered_timestamp(start)?)
        .field(short_date(start)?)
        .field(code.code.as_str())
        .field(clean(code.display.as_str()))
        .field(observation_value(reading.value))
        .field(reading.unit())
        .field(ctx.encounter_id))
}
