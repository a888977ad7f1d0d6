//! Domain identifier types
//!
//! Patient identifiers are read from the input record; encounter, care plan and
//! imaging-study identifiers are minted while rows are projected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Patient identifier newtype wrapper
///
/// Carried verbatim from the input record and repeated as the foreign key in
/// every row the patient contributes.
///
/// # Examples
///
/// ```
/// use tabula::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("b3221cfc-24fb-339e-823d-bc4136cbc4ed").unwrap();
/// assert_eq!(id.as_str(), "b3221cfc-24fb-339e-823d-bc4136cbc4ed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier minted at projection time
///
/// A random 128-bit identifier rendered in hyphenated hexadecimal form. Used
/// for encounter, care plan and imaging-study rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedId(Uuid);

impl GeneratedId {
    /// Mints a fresh random identifier
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the hyphenated text form
    pub fn to_field(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for GeneratedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
