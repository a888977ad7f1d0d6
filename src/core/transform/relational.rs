//! Relational layout
//!
//! One table per entity kind. Child rows carry the patient ID and the minted
//! encounter ID as foreign keys; dates are ISO calendar dates and encounter
//! bounds are ISO instants.

use super::address::split_address;
use super::costs::{dispense_count, format_cost, total_cost};
use super::dates::{iso_date, iso_timestamp, optional};
use super::fields::{clean, observation_type, observation_value, reason_fields};
use super::{Reading, Row, RowContext, RowProjector, Variant};
use crate::domain::{
    attributes, CarePlan, Coded, Encounter, Entry, ImagingStudy, Medication, Person, Procedure,
    Result,
};

/// Projector for the relational layout
///
/// `parse_address` only changes the patient row: the free-form street is split
/// into two lines plus a country column.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationalProjector {
    pub parse_address: bool,
}

impl RelationalProjector {
    pub fn new(parse_address: bool) -> Self {
        Self { parse_address }
    }
}

impl RowProjector for RelationalProjector {
    fn variant(&self) -> Variant {
        Variant::Relational
    }

    fn patient(&self, person: &Person, as_of: i64) -> Result<Row> {
        let row = demographics(person, as_of)?;
        let street = person.required_attribute(attributes::ADDRESS)?;
        let city = person.required_attribute(attributes::CITY)?;
        let state = person.required_attribute(attributes::STATE)?;
        let zip = person.required_attribute(attributes::ZIP)?;

        if self.parse_address {
            Ok(row.fields(split_address(street, city, state, zip).into_fields()))
        } else {
            Ok(row.fields([clean(street), clean(city), clean(state), clean(zip)]))
        }
    }

    fn encounter(&self, ctx: &RowContext<'_>, encounter: &Encounter) -> Result<Row> {
        let code = encounter.primary_code()?;
        let class = encounter
            .encounter_type
            .as_deref()
            .map(str::to_lowercase);

        Ok(Row::new()
            .field(ctx.encounter_id)
            .field(iso_timestamp(encounter.start)?)
            .field(optional(encounter.stop, iso_timestamp)?)
            .field(ctx.patient_id)
            .field(clean(class.as_deref()))
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .field(format_cost(encounter.cost))
            .fields(reason_fields(encounter.reason.as_ref())))
    }

    fn condition(&self, ctx: &RowContext<'_>, condition: &Entry) -> Result<Row> {
        span_row(ctx, condition)
    }

    fn observation(&self, ctx: &RowContext<'_>, reading: &Reading<'_>) -> Result<Option<Row>> {
        let code = reading.code()?;

        Ok(Some(
            Row::new()
                .field(iso_date(reading.observation.start)?)
                .field(ctx.patient_id)
                .field(ctx.encounter_id)
                .field(code.code.as_str())
                .field(clean(code.display.as_str()))
                .field(observation_value(reading.value))
                .field(reading.unit())
                .field(observation_type(reading.value)),
        ))
    }

    fn procedure(&self, ctx: &RowContext<'_>, procedure: &Procedure) -> Result<Row> {
        let code = procedure.primary_code()?;

        Ok(Row::new()
            .field(iso_date(procedure.start)?)
            .field(ctx.patient_id)
            .field(ctx.encounter_id)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .field(format_cost(procedure.cost))
            .fields(reason_fields(procedure.reasons.first())))
    }

    fn medication(&self, ctx: &RowContext<'_>, medication: &Medication) -> Result<Row> {
        let code = medication.primary_code()?;
        let dispenses = dispense_count(medication, ctx.as_of)?;
        let total = total_cost(medication.cost, dispenses)?;

        Ok(Row::new()
            .field(iso_date(medication.start)?)
            .field(optional(medication.stop, iso_date)?)
            .field(ctx.patient_id)
            .field(ctx.encounter_id)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .field(format_cost(medication.cost))
            .field(dispenses.to_string())
            .field(format_cost(total))
            .fields(reason_fields(medication.reasons.first())))
    }

    fn immunization(&self, ctx: &RowContext<'_>, immunization: &Entry) -> Result<Row> {
        let code = immunization.primary_code()?;

        Ok(Row::new()
            .field(iso_date(immunization.start)?)
            .field(ctx.patient_id)
            .field(ctx.encounter_id)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .field(format_cost(immunization.cost)))
    }

    fn careplan(
        &self,
        ctx: &RowContext<'_>,
        careplan: &CarePlan,
        careplan_id: &str,
    ) -> Result<Row> {
        let code = careplan.primary_code()?;

        Ok(Row::new()
            .field(careplan_id)
            .field(iso_date(careplan.start)?)
            .field(optional(careplan.stop, iso_date)?)
            .field(ctx.patient_id)
            .field(ctx.encounter_id)
            .field(code.code.as_str())
            .field(clean(code.display.as_str()))
            .fields(reason_fields(careplan.reasons.first())))
    }
}

/// ID, birth and death dates, then the optional demographic attributes
///
/// Shared by both layouts; only the address block that follows differs.
pub(crate) fn demographics(person: &Person, as_of: i64) -> Result<Row> {
    let death = match person.record.death {
        Some(death) if !person.is_alive(as_of) => iso_date(death)?,
        _ => String::new(),
    };

    Ok(Row::new()
        .field(person.id.as_str())
        .field(iso_date(person.birthdate)?)
        .field(death)
        .fields(
            attributes::DEMOGRAPHICS
                .iter()
                .map(|key| clean(person.attribute(key))),
        ))
}

/// `START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION`
fn span_row(ctx: &RowContext<'_>, entry: &Entry) -> Result<Row> {
    let code = entry.primary_code()?;

    Ok(Row::new()
        .field(iso_date(entry.start)?)
        .field(optional(entry.stop, iso_date)?)
        .field(ctx.patient_id)
        .field(ctx.encounter_id)
        .field(code.code.as_str())
        .field(clean(code.display.as_str())))
}

pub(crate) fn allergy_row(ctx: &RowContext<'_>, allergy: &Entry) -> Result<Row> {
    span_row(ctx, allergy)
}

pub(crate) fn imaging_row(
    ctx: &RowContext<'_>,
    study: &ImagingStudy,
    study_id: &str,
) -> Result<Row> {
    let (series, instance) = study.first_instance()?;

    Ok(Row::new()
        .field(study_id)
        .field(iso_date(study.start)?)
        .field(ctx.patient_id)
        .field(ctx.encounter_id)
        .field(series.body_site.code.as_str())
        .field(clean(series.body_site.display.as_str()))
        .field(series.modality.code.as_str())
        .field(clean(series.modality.display.as_str()))
        .field(instance.sop_class.code.as_str())
        .field(clean(instance.sop_class.display.as_str())))
}
