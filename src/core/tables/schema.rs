//! Table layouts for both output variants
//!
//! Headers are literal strings rather than being derived from one another:
//! downstream importers match them byte for byte.

use crate::core::transform::{projector_for, RowProjector, Variant};
use crate::core::transform::fields::DELIMITER;
use std::fmt;

/// Every table either layout can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Patients,
    Allergies,
    Medications,
    Conditions,
    CarePlans,
    Observations,
    Procedures,
    Immunizations,
    Encounters,
    VitalSigns,
    SocialDeterminants,
    ImagingStudies,
}

impl TableKind {
    pub const ALL: [TableKind; 12] = [
        TableKind::Patients,
        TableKind::Allergies,
        TableKind::Medications,
        TableKind::Conditions,
        TableKind::CarePlans,
        TableKind::Observations,
        TableKind::Procedures,
        TableKind::Immunizations,
        TableKind::Encounters,
        TableKind::VitalSigns,
        TableKind::SocialDeterminants,
        TableKind::ImagingStudies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Allergies => "allergies",
            Self::Medications => "medications",
            Self::Conditions => "conditions",
            Self::CarePlans => "careplans",
            Self::Observations => "observations",
            Self::Procedures => "procedures",
            Self::Immunizations => "immunizations",
            Self::Encounters => "encounters",
            Self::VitalSigns => "vitals",
            Self::SocialDeterminants => "social determinants",
            Self::ImagingStudies => "imaging studies",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// File name and header line of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub kind: TableKind,
    pub file_name: &'static str,
    pub header: &'static str,
}

impl TableSpec {
    pub fn column_count(&self) -> usize {
        self.header.split(DELIMITER).count()
    }
}

const PATIENTS_RAW_ADDRESS: &str = "ID,BIRTHDATE,DEATHDATE,SSN,DRIVERS,PASSPORT,PREFIX,FIRST,LAST,\
SUFFIX,MAIDEN,MARITAL,RACE,ETHNICITY,GENDER,BIRTHPLACE,ADDRESS,CITY,STATE,ZIP";
const PATIENTS_PARSED_ADDRESS: &str = "ID,BIRTHDATE,DEATHDATE,SSN,DRIVERS,PASSPORT,PREFIX,FIRST,\
LAST,SUFFIX,MAIDEN,MARITAL,RACE,ETHNICITY,GENDER,BIRTHPLACE,STREETADDRESS1,STREETADDRESS2,CITY,\
STATE,ZIP,COUNTRY";
const PATIENTS_TIMELINE: &str = "ID,BIRTHDATE,DEATHDATE,SSN,DRIVERS,PASSPORT,PREFIX,FIRST,LAST,\
SUFFIX,MAIDEN,MARITAL,RACE,ETHNICITY,GENDER,BIRTHPLACE,STREETADDRESS1,STREETADDRESS2,CITY,STATE,\
POSTAL,COUNTRY";
const ALLERGIES: &str = "START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION";
const IMAGING_STUDIES: &str = "ID,DATE,PATIENT,ENCOUNTER,BODYSITE_CODE,BODYSITE_DESCRIPTION,\
MODALITY_CODE,MODALITY_DESCRIPTION,SOP_CODE,SOP_DESCRIPTION";

const RELATIONAL_TABLES: [TableKind; 10] = [
    TableKind::Patients,
    TableKind::Allergies,
    TableKind::Medications,
    TableKind::Conditions,
    TableKind::CarePlans,
    TableKind::Observations,
    TableKind::Procedures,
    TableKind::Immunizations,
    TableKind::Encounters,
    TableKind::ImagingStudies,
];

/// Resolved output layout
///
/// Selected once at startup from the two configuration flags and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    variant: Variant,
    parse_address: bool,
}

impl Schema {
    /// `parse_address` only affects the relational layout; the timeline layout
    /// always decomposes addresses.
    pub fn select(timeline_layout: bool, parse_address: bool) -> Self {
        Self {
            variant: Variant::from_flag(timeline_layout),
            parse_address,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Whether patient rows carry a decomposed street address
    pub fn decomposes_address(&self) -> bool {
        match self.variant {
            Variant::Relational => self.parse_address,
            Variant::Timeline => true,
        }
    }

    /// Tables produced by this layout, in file creation order
    pub fn tables(&self) -> Vec<TableSpec> {
        let kinds: &[TableKind] = match self.variant {
            Variant::Relational => &RELATIONAL_TABLES,
            Variant::Timeline => &TableKind::ALL,
        };
        kinds.iter().filter_map(|kind| self.table(*kind)).collect()
    }

    /// Layout of one table, or `None` when this variant does not produce it
    pub fn table(&self, kind: TableKind) -> Option<TableSpec> {
        let (file_name, header) = match self.variant {
            Variant::Relational => self.relational_table(kind)?,
            Variant::Timeline => self.timeline_table(kind),
        };
        Some(TableSpec {
            kind,
            file_name,
            header,
        })
    }

    pub fn file_name(&self, kind: TableKind) -> Option<&'static str> {
        self.table(kind).map(|spec| spec.file_name)
    }

    pub fn header(&self, kind: TableKind) -> Option<&'static str> {
        self.table(kind).map(|spec| spec.header)
    }

    pub fn column_count(&self, kind: TableKind) -> Option<usize> {
        self.table(kind).map(|spec| spec.column_count())
    }

    /// Projection strategy matching these headers
    pub fn projector(&self) -> Box<dyn RowProjector> {
        projector_for(self.variant, self.parse_address)
    }

    fn relational_table(&self, kind: TableKind) -> Option<(&'static str, &'static str)> {
        let table = match kind {
            TableKind::Patients if self.parse_address => ("patients.csv", PATIENTS_PARSED_ADDRESS),
            TableKind::Patients => ("patients.csv", PATIENTS_RAW_ADDRESS),
            TableKind::Allergies => ("allergies.csv", ALLERGIES),
            TableKind::Medications => (
                "medications.csv",
                "START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION,COST,DISPENSES,TOTALCOST,\
REASONCODE,REASONDESCRIPTION",
            ),
            TableKind::Conditions => (
                "conditions.csv",
                "START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION",
            ),
            TableKind::CarePlans => (
                "careplans.csv",
                "ID,START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION,REASONCODE,REASONDESCRIPTION",
            ),
            TableKind::Observations => (
                "observations.csv",
                "DATE,PATIENT,ENCOUNTER,CODE,DESCRIPTION,VALUE,UNITS,TYPE",
            ),
            TableKind::Procedures => (
                "procedures.csv",
                "DATE,PATIENT,ENCOUNTER,CODE,DESCRIPTION,COST,REASONCODE,REASONDESCRIPTION",
            ),
            TableKind::Immunizations => (
                "immunizations.csv",
                "DATE,PATIENT,ENCOUNTER,CODE,DESCRIPTION,COST",
            ),
            TableKind::Encounters => (
                "encounters.csv",
                "ID,START,STOP,PATIENT,ENCOUNTERCLASS,CODE,DESCRIPTION,COST,REASONCODE,\
REASONDESCRIPTION",
            ),
            TableKind::ImagingStudies => ("imaging_studies.csv", IMAGING_STUDIES),
            TableKind::VitalSigns | TableKind::SocialDeterminants => return None,
        };
        Some(table)
    }

    fn timeline_table(&self, kind: TableKind) -> (&'static str, &'static str) {
        match kind {
            TableKind::Patients => ("patients.csv", PATIENTS_TIMELINE),
            TableKind::Allergies => ("allergies.csv", ALLERGIES),
            TableKind::Medications => (
                "medication.csv",
                "MRN,Timestamp,EncounterID,StartDate,EndDate,MedicationDuration,RXNormCode,\
RXNormDescription,MedicationReasonCode,MedicationReason",
            ),
            TableKind::Conditions => (
                "condition.csv",
                "MRN,Timestamp,EncounterID,StartDate,EndDate,ConditionDuration,ConditionCode,\
ConditionDescription",
            ),
            TableKind::CarePlans => (
                "careplan.csv",
                "MRN,Timestamp,CarePlanID,EncounterID,StartDate,EndDate,CarePlanDuration,\
CarePlanCode,CarePlanDescription,CarePlanReasonCode,CarePlanReason",
            ),
            TableKind::Observations => (
                "lab-observation.csv",
                "MRN,Timestamp,LabDate,LOINCCode,LOINCDescription,LabValue,LabUnits,EncounterID",
            ),
            TableKind::Procedures => (
                "procedure.csv",
                "MRN,Timestamp,ProcedureDate,ProcedureCode,ProcedureDescription,\
ProcedureReasonCode,ProcedureReason,EncounterID",
            ),
            TableKind::Immunizations => (
                "immunization.csv",
                "MRN,Timestamp,ImmunizationDate,CVXCode,CVXDescription,EncounterID",
            ),
            TableKind::Encounters => (
                "encounter.csv",
                "MRN,Timestamp,EncounterID,EncounterDate,EncounterCode,EncounterType,\
EncounterReasonCode,EncounterReason",
            ),
            TableKind::VitalSigns => (
                "vital-observation.csv",
                "MRN,Timestamp,VitalDate,LOINCCode,LOINCDescription,VitalValue,VitalUnits,\
EncounterID",
            ),
            TableKind::SocialDeterminants => (
                "social-determinant.csv",
                "MRN,Timestamp,SDDate,LOINCCode,LOINCDescription,SDValue,SDUnits,EncounterID",
            ),
            TableKind::ImagingStudies => ("imaging_studies.csv", IMAGING_STUDIES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_relational_tables() {
        let schema = Schema::select(false, false);
        let tables = schema.tables();

        assert_eq!(schema.variant(), Variant::Relational);
        assert_eq!(tables.len(), 10);
        assert!(schema.table(TableKind::VitalSigns).is_none());
        assert!(schema.table(TableKind::SocialDeterminants).is_none());
        assert_eq!(schema.file_name(TableKind::Medications), Some("medications.csv"));
        assert!(!schema.decomposes_address());
    }

    #[test]
    fn test_timeline_tables() {
        let schema = Schema::select(true, false);

        assert_eq!(schema.variant(), Variant::Timeline);
        assert_eq!(schema.tables().len(), 12);
        assert_eq!(schema.file_name(TableKind::Observations), Some("lab-observation.csv"));
        assert_eq!(
            schema.file_name(TableKind::SocialDeterminants),
            Some("social-determinant.csv")
        );
        assert!(schema.decomposes_address());
    }

    #[test_case(false, false, 20 ; "relational raw address")]
    #[test_case(false, true, 22 ; "relational parsed address")]
    #[test_case(true, false, 22 ; "timeline")]
    #[test_case(true, true, 22 ; "timeline ignores parse flag")]
    fn test_patient_column_count(timeline: bool, parse_address: bool, expected: usize) {
        let schema = Schema::select(timeline, parse_address);
        assert_eq!(schema.column_count(TableKind::Patients), Some(expected));
    }

    #[test]
    fn test_headers_are_literal() {
        let schema = Schema::select(false, true);
        assert_eq!(
            schema.header(TableKind::Patients).unwrap(),
            "ID,BIRTHDATE,DEATHDATE,SSN,DRIVERS,PASSPORT,PREFIX,FIRST,LAST,SUFFIX,MAIDEN,MARITAL,\
RACE,ETHNICITY,GENDER,BIRTHPLACE,STREETADDRESS1,STREETADDRESS2,CITY,STATE,ZIP,COUNTRY"
        );
        assert_eq!(
            schema.header(TableKind::Medications).unwrap(),
            "START,STOP,PATIENT,ENCOUNTER,CODE,DESCRIPTION,COST,DISPENSES,TOTALCOST,REASONCODE,\
REASONDESCRIPTION"
        );

        let timeline = Schema::select(true, false);
        assert_eq!(
            timeline.header(TableKind::CarePlans).unwrap(),
            "MRN,Timestamp,CarePlanID,EncounterID,StartDate,EndDate,CarePlanDuration,CarePlanCode,\
CarePlanDescription,CarePlanReasonCode,CarePlanReason"
        );
        assert_eq!(
            timeline.header(TableKind::ImagingStudies),
            schema.header(TableKind::ImagingStudies)
        );
    }

    #[test]
    fn test_file_names_are_unique() {
        for schema in [Schema::select(false, false), Schema::select(true, false)] {
            let names: HashSet<_> = schema.tables().iter().map(|t| t.file_name).collect();
            assert_eq!(names.len(), schema.tables().len());
        }
    }

    #[test]
    fn test_headers_have_no_spaces() {
        for schema in [Schema::select(false, true), Schema::select(true, false)] {
            for table in schema.tables() {
                assert!(!table.header.contains(' '), "{}", table.header);
            }
        }
    }

    #[test]
    fn test_projector_matches_variant() {
        assert_eq!(Schema::select(true, false).projector().variant(), Variant::Timeline);
        assert_eq!(
            Schema::select(false, true).projector().variant(),
            Variant::Relational
        );
    }
}
