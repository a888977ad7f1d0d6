//! In-memory record source

use super::RecordSource;
use crate::domain::{Person, Result, TabulaError};

/// Serves already-built record graphs, keyed by patient ID
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    people: Vec<Person>,
}

impl MemorySource {
    pub fn new(people: Vec<Person>) -> Self {
        Self { people }
    }
}

impl RecordSource for MemorySource {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.people.iter().map(|person| person.id.clone()).collect())
    }

    fn load(&self, key: &str) -> Result<Person> {
        self.people
            .iter()
            .find(|person| person.id == key)
            .cloned()
            .ok_or_else(|| TabulaError::Export(format!("No record for patient {key}")))
    }
}
