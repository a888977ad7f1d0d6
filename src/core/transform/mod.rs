//! Row projection
//!
//! Turns record entities into delimited rows. Two layouts are supported:
//!
//! - **Relational**: one table per entity kind keyed by patient and encounter IDs
//! - **Timeline**: per-event rows with a randomized leading timestamp, calendar
//!   durations, and dedicated vitals and social-determinant tables
//!
//! The layout is chosen once through [`Variant`] and applied through the
//! [`RowProjector`] trait.

pub mod address;
pub mod costs;
pub mod dates;
pub mod fields;
pub mod relational;
pub mod timeline;

pub use relational::RelationalProjector;
pub use timeline::TimelineProjector;

use crate::domain::{
    CarePlan, Code, Coded, Encounter, Entry, ImagingStudy, Medication, Observation,
    ObservationValue, Person, Procedure, Result,
};
use fields::{clean, DELIMITER, LINE_ENDING};
use std::fmt;

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// One table per entity kind, keyed by generated IDs
    Relational,
    /// Event timeline with vitals and social determinants split out
    Timeline,
}

impl Variant {
    pub fn from_flag(timeline_layout: bool) -> Self {
        if timeline_layout {
            Self::Timeline
        } else {
            Self::Relational
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational => write!(f, "relational"),
            Self::Timeline => write!(f, "timeline"),
        }
    }
}

/// Ordered field values for one table line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one field
    pub fn field(mut self, value: impl Into<String>) -> Self {
        self.fields.push(value.into());
        self
    }

    /// Appends several fields in order
    pub fn fields<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_fields(&self) -> &[String] {
        &self.fields
    }

    /// Delimited line including the trailing line separator
    pub fn to_line(&self) -> String {
        let mut line = self.fields.join(&DELIMITER.to_string());
        line.push_str(LINE_ENDING);
        line
    }
}

/// Keys shared by every row emitted while walking one encounter
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub patient_id: &'a str,
    pub encounter_id: &'a str,
    /// Export time; ends open-ended prescriptions and decides deceased status
    pub as_of: i64,
}

/// An observation that carries a value
///
/// Only these produce rows; valueless panels are walked for their children.
#[derive(Debug, Clone, Copy)]
pub struct Reading<'a> {
    pub observation: &'a Observation,
    pub value: &'a ObservationValue,
}

impl<'a> Reading<'a> {
    pub fn new(observation: &'a Observation) -> Option<Self> {
        observation.value.as_ref().map(|value| Self { observation, value })
    }

    pub fn code(&self) -> Result<&'a Code> {
        self.observation.primary_code()
    }

    pub fn unit(&self) -> String {
        clean(self.observation.unit.as_deref())
    }
}

/// Projection strategy for one output layout
///
/// Implementations are stateless and shared across concurrent exports.
pub trait RowProjector: Send + Sync {
    fn variant(&self) -> Variant;

    fn patient(&self, person: &Person, as_of: i64) -> Result<Row>;

    fn encounter(&self, ctx: &RowContext<'_>, encounter: &Encounter) -> Result<Row>;

    fn condition(&self, ctx: &RowContext<'_>, condition: &Entry) -> Result<Row>;

    /// Allergies use the same layout in every variant
    fn allergy(&self, ctx: &RowContext<'_>, allergy: &Entry) -> Result<Row> {
        relational::allergy_row(ctx, allergy)
    }

    /// General observation row, or `None` when the reading belongs elsewhere
    fn observation(&self, ctx: &RowContext<'_>, reading: &Reading<'_>) -> Result<Option<Row>>;

    fn procedure(&self, ctx: &RowContext<'_>, procedure: &Procedure) -> Result<Row>;

    fn medication(&self, ctx: &RowContext<'_>, medication: &Medication) -> Result<Row>;

    fn immunization(&self, ctx: &RowContext<'_>, immunization: &Entry) -> Result<Row>;

    fn careplan(&self, ctx: &RowContext<'_>, careplan: &CarePlan, careplan_id: &str)
        -> Result<Row>;

    /// Vitals table row; layouts without a vitals table return `None`
    fn vital_sign(&self, _ctx: &RowContext<'_>, _reading: &Reading<'_>) -> Result<Option<Row>> {
        Ok(None)
    }

    /// Social-determinant table row; layouts without that table return `None`
    fn social_determinant(
        &self,
        _ctx: &RowContext<'_>,
        _reading: &Reading<'_>,
    ) -> Result<Option<Row>> {
        Ok(None)
    }

    /// Imaging studies use the same layout in every variant
    fn imaging_study(
        &self,
        ctx: &RowContext<'_>,
        study: &ImagingStudy,
        study_id: &str,
    ) -> Result<Row> {
        relational::imaging_row(ctx, study, study_id)
    }
}

/// Builds the projector for a layout
///
/// `parse_address` is ignored by the timeline layout, which always splits
/// the street address.
pub fn projector_for(variant: Variant, parse_address: bool) -> Box<dyn RowProjector> {
    match variant {
        Variant::Relational => Box::new(RelationalProjector::new(parse_address)),
        Variant::Timeline => Box::new(TimelineProjector),
    }
}
