//! Per-patient record traversal
//!
//! Walks one patient's record graph in a fixed order and routes every
//! projected row to its table.

use crate::core::tables::{TableKind, TableWriterSet};
use crate::core::transform::{Reading, Row, RowContext, RowProjector};
use crate::domain::{
    Encounter, GeneratedId, Observation, PatientId, Person, Result, TabulaError,
};
use std::sync::Arc;

/// Deepest observation nesting accepted before the record is rejected
pub const MAX_OBSERVATION_DEPTH: usize = 16;

/// Exports whole patients into a shared table set
///
/// Holds no per-patient state, so one walker can serve concurrent exports.
pub struct RecordWalker {
    tables: Arc<TableWriterSet>,
    projector: Box<dyn RowProjector>,
}

impl RecordWalker {
    /// Creates a walker using the projector that matches the tables' schema
    pub fn new(tables: Arc<TableWriterSet>) -> Self {
        let projector = tables.schema().projector();
        Self { tables, projector }
    }

    pub fn tables(&self) -> &Arc<TableWriterSet> {
        &self.tables
    }

    /// Writes every row for `person` and flushes all tables
    ///
    /// Rows are written as they are projected. An error stops the traversal
    /// and is returned as is; rows already written for this patient stay in
    /// the tables.
    ///
    /// Returns the patient ID. A blank ID is rejected before any row is
    /// written.
    pub fn export(&self, person: &Person, as_of: i64) -> Result<String> {
        let patient_id = PatientId::new(person.id.as_str()).map_err(TabulaError::malformed)?;
        let row = self.projector.patient(person, as_of)?;
        self.tables.write_row(TableKind::Patients, &row)?;

        for encounter in &person.record.encounters {
            self.export_encounter(&person.id, encounter, as_of)?;
        }

        self.tables.flush_all()?;
        Ok(patient_id.into_inner())
    }

    fn export_encounter(&self, patient_id: &str, encounter: &Encounter, as_of: i64) -> Result<()> {
        let encounter_id = GeneratedId::mint().to_field();
        let ctx = RowContext {
            patient_id,
            encounter_id: &encounter_id,
            as_of,
        };
        let projector = self.projector.as_ref();

        self.write(TableKind::Encounters, projector.encounter(&ctx, encounter)?)?;

        for condition in &encounter.conditions {
            self.write(TableKind::Conditions, projector.condition(&ctx, condition)?)?;
        }

        for allergy in &encounter.allergies {
            self.write(TableKind::Allergies, projector.allergy(&ctx, allergy)?)?;
        }

        let readings = readings(&encounter.observations)?;
        for reading in &readings {
            if let Some(row) = projector.observation(&ctx, reading)? {
                self.write(TableKind::Observations, row)?;
            }
        }

        for procedure in &encounter.procedures {
            self.write(TableKind::Procedures, projector.procedure(&ctx, procedure)?)?;
        }

        for medication in &encounter.medications {
            self.write(TableKind::Medications, projector.medication(&ctx, medication)?)?;
        }

        for immunization in &encounter.immunizations {
            self.write(
                TableKind::Immunizations,
                projector.immunization(&ctx, immunization)?,
            )?;
        }

        for careplan in &encounter.careplans {
            let careplan_id = GeneratedId::mint().to_field();
            self.write(
                TableKind::CarePlans,
                projector.careplan(&ctx, careplan, &careplan_id)?,
            )?;
        }

        for reading in &readings {
            if let Some(row) = projector.vital_sign(&ctx, reading)? {
                self.write(TableKind::VitalSigns, row)?;
            }
        }

        for reading in &readings {
            if let Some(row) = projector.social_determinant(&ctx, reading)? {
                self.write(TableKind::SocialDeterminants, row)?;
            }
        }

        for study in &encounter.imaging_studies {
            let study_id = GeneratedId::mint().to_field();
            self.write(
                TableKind::ImagingStudies,
                projector.imaging_study(&ctx, study, &study_id)?,
            )?;
        }

        Ok(())
    }

    fn write(&self, kind: TableKind, row: Row) -> Result<()> {
        self.tables.write_row(kind, &row)
    }
}

/// Valued observations in document order
///
/// An observation without a value contributes no row of its own; its
/// children are collected in its place.
pub fn readings(observations: &[Observation]) -> Result<Vec<Reading<'_>>> {
    let mut collected = Vec::new();
    collect_readings(observations, 1, &mut collected)?;
    Ok(collected)
}

fn collect_readings<'a>(
    observations: &'a [Observation],
    depth: usize,
    collected: &mut Vec<Reading<'a>>,
) -> Result<()> {
    if observations.is_empty() {
        return Ok(());
    }
    if depth > MAX_OBSERVATION_DEPTH {
        return Err(TabulaError::malformed(format!(
            "observations nested deeper than {MAX_OBSERVATION_DEPTH} levels"
        )));
    }

    for observation in observations {
        match Reading::new(observation) {
            Some(reading) => collected.push(reading),
            None => collect_readings(&observation.observations, depth + 1, collected)?,
        }
    }
    Ok(())
}
