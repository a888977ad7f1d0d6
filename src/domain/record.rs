//! Patient record graph
//!
//! The read-only input to the exporter: one person with an ordered list of
//! encounters, each holding the clinical entries recorded during it. Every
//! timestamp is epoch milliseconds (UTC). The graph deserializes from the JSON
//! emitted by the record generator.

use super::errors::TabulaError;
use super::result::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Attribute keys looked up on [`Person::attributes`]
pub mod attributes {
    pub const SSN: &str = "ssn";
    pub const DRIVERS: &str = "drivers";
    pub const PASSPORT: &str = "passport";
    pub const NAME_PREFIX: &str = "prefix";
    pub const FIRST_NAME: &str = "first";
    pub const LAST_NAME: &str = "last";
    pub const NAME_SUFFIX: &str = "suffix";
    pub const MAIDEN_NAME: &str = "maiden";
    pub const MARITAL_STATUS: &str = "marital";
    pub const RACE: &str = "race";
    pub const ETHNICITY: &str = "ethnicity";
    pub const GENDER: &str = "gender";
    pub const BIRTHPLACE: &str = "birthplace";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIP: &str = "zip";

    /// Optional attributes emitted between BIRTHDATE/DEATHDATE and the address
    /// block, in column order.
    pub const DEMOGRAPHICS: [&str; 13] = [
        SSN,
        DRIVERS,
        PASSPORT,
        NAME_PREFIX,
        FIRST_NAME,
        LAST_NAME,
        NAME_SUFFIX,
        MAIDEN_NAME,
        MARITAL_STATUS,
        RACE,
        ETHNICITY,
        GENDER,
        BIRTHPLACE,
    ];
}

/// A simulated patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    /// Patient identifier, reused as the foreign key in every child row
    pub id: String,

    /// Birth timestamp
    pub birthdate: i64,

    /// Named demographic and address attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// The patient's health record
    #[serde(default)]
    pub record: HealthRecord,
}

impl Person {
    /// Looks up an optional attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Looks up an attribute the exporter cannot do without
    pub fn required_attribute(&self, key: &str) -> Result<&str> {
        self.attribute(key).ok_or_else(|| {
            TabulaError::malformed(format!(
                "patient {} is missing required attribute '{key}'",
                self.id
            ))
        })
    }

    /// Whether the patient is still alive at `time`
    pub fn is_alive(&self, time: i64) -> bool {
        match self.record.death {
            Some(death) => death > time,
            None => true,
        }
    }
}

/// Ordered encounters plus record-level facts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(default)]
    pub encounters: Vec<Encounter>,

    /// Death timestamp, if the patient died during the simulation
    #[serde(default, deserialize_with = "unset_as_none")]
    pub death: Option<i64>,
}

/// A coded concept (SNOMED CT, LOINC, RxNorm, CVX, DICOM...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    #[serde(default)]
    pub system: Option<String>,
    pub code: String,
    #[serde(default)]
    pub display: String,
}

impl Code {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            system: None,
            code: code.into(),
            display: display.into(),
        }
    }
}

/// Anything carrying a non-empty list of codes whose first element is primary
pub trait Coded {
    /// Entity kind used in error messages
    const KIND: &'static str;

    fn codes(&self) -> &[Code];

    /// The first code, used for table routing and as the canonical code/description
    fn primary_code(&self) -> Result<&Code> {
        self.codes()
            .first()
            .ok_or_else(|| TabulaError::malformed(format!("{} has no codes", Self::KIND)))
    }
}

/// An encounter and everything recorded during it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encounter {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    /// Encounter class (ambulatory, emergency, wellness...)
    #[serde(default)]
    pub encounter_type: Option<String>,

    pub codes: Vec<Code>,

    #[serde(default)]
    pub reason: Option<Code>,

    #[serde(default)]
    pub cost: Decimal,

    #[serde(default)]
    pub conditions: Vec<Entry>,
    #[serde(default)]
    pub allergies: Vec<Entry>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub immunizations: Vec<Entry>,
    #[serde(default)]
    pub careplans: Vec<CarePlan>,
    #[serde(default)]
    pub imaging_studies: Vec<ImagingStudy>,
}

impl Coded for Encounter {
    const KIND: &'static str = "encounter";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

/// Shared shape of conditions, allergies and immunizations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    pub codes: Vec<Code>,

    #[serde(default)]
    pub cost: Decimal,
}

impl Coded for Entry {
    const KIND: &'static str = "entry";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

/// Value recorded by an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Numeric(f64),
    Text(String),
    Coded(Code),
}

/// A measurement or assessment, possibly grouping child observations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observation {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    pub codes: Vec<Code>,

    /// Absent for panel observations whose results live in `observations`
    #[serde(default)]
    pub value: Option<ObservationValue>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Coded for Observation {
    const KIND: &'static str = "observation";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Procedure {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    pub codes: Vec<Code>,

    #[serde(default)]
    pub reasons: Vec<Code>,

    #[serde(default)]
    pub cost: Decimal,
}

impl Coded for Procedure {
    const KIND: &'static str = "procedure";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

/// A prescription
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Medication {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    pub codes: Vec<Code>,

    #[serde(default)]
    pub reasons: Vec<Code>,

    /// Cost of a single dispense
    #[serde(default)]
    pub cost: Decimal,

    /// Free-form dosage details; `refills` and `duration` drive the dispense count
    #[serde(default)]
    pub prescription_details: Option<serde_json::Value>,
}

impl Coded for Medication {
    const KIND: &'static str = "medication";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarePlan {
    pub start: i64,

    #[serde(default, deserialize_with = "unset_as_none")]
    pub stop: Option<i64>,

    pub codes: Vec<Code>,

    #[serde(default)]
    pub reasons: Vec<Code>,
}

impl Coded for CarePlan {
    const KIND: &'static str = "care plan";

    fn codes(&self) -> &[Code] {
        &self.codes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagingStudy {
    pub start: i64,

    #[serde(default)]
    pub series: Vec<ImagingSeries>,
}

impl ImagingStudy {
    /// The first series and its first instance, which describe the study row
    pub fn first_instance(&self) -> Result<(&ImagingSeries, &ImagingInstance)> {
        let series = self
            .series
            .first()
            .ok_or_else(|| TabulaError::malformed("imaging study has no series"))?;
        let instance = series
            .instances
            .first()
            .ok_or_else(|| TabulaError::malformed("imaging series has no instances"))?;
        Ok((series, instance))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagingSeries {
    pub body_site: Code,
    pub modality: Code,

    #[serde(default)]
    pub instances: Vec<ImagingInstance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagingInstance {
    pub sop_class: Code,
}

/// Stop timestamps use 0 for "not yet set"; both 0 and null map to `None`.
fn unset_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.filter(|ts| *ts != 0))
}
