//! Integration tests for graceful shutdown
//!
//! A shutdown signal stops new patients from starting; patients already in
//! flight finish and their rows stay complete.

use std::sync::Arc;
use tabula::adapters::records::{MemorySource, RecordSource};
use tabula::config::{
    ApplicationConfig, ExportConfig, InputConfig, LoggingConfig, OutputConfig, TabulaConfig,
};
use tabula::core::export::ExportCoordinator;
use tabula::core::tables::{Schema, TableKind, TableWriterSet};
use tabula::domain::{Code, Encounter, HealthRecord, Person, Result};
use tokio::sync::watch;

fn person(id: &str) -> Person {
    let attributes = [
        ("address", "100 Main St"),
        ("city", "Springfield"),
        ("state", "IL"),
        ("zip", "62704"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Person {
        id: id.to_string(),
        attributes,
        record: HealthRecord {
            encounters: vec![Encounter {
                codes: vec![Code::new("185349003", "Check up")],
                ..Default::default()
            }],
            death: None,
        },
        ..Default::default()
    }
}

fn config(parallel_patients: usize) -> TabulaConfig {
    TabulaConfig {
        application: ApplicationConfig::default(),
        input: InputConfig {
            directory: "records".to_string(),
        },
        output: OutputConfig::default(),
        export: ExportConfig {
            parallel_patients,
            ..ExportConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

/// Raises the shutdown flag once the given patient has been loaded
struct SignallingSource {
    inner: MemorySource,
    trigger: String,
    shutdown: watch::Sender<bool>,
}

impl RecordSource for SignallingSource {
    fn list(&self) -> Result<Vec<String>> {
        self.inner.list()
    }

    fn load(&self, key: &str) -> Result<Person> {
        if key == self.trigger {
            let _ = self.shutdown.send(true);
        }
        self.inner.load(key)
    }
}

#[tokio::test]
async fn test_shutdown_mid_run_finishes_in_flight_patient() {
    let people: Vec<Person> = (0..10).map(|i| person(&format!("p-{i}"))).collect();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let source = SignallingSource {
        inner: MemorySource::new(people),
        trigger: "p-2".to_string(),
        shutdown: shutdown_tx,
    };

    let (tables, buffers) = TableWriterSet::in_memory(Schema::select(false, false)).unwrap();
    let coordinator = ExportCoordinator::from_parts(
        config(1),
        Arc::new(source),
        Arc::new(tables),
        shutdown_rx,
    );

    let summary = coordinator.execute_export().await.unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.successful_exports, 3);
    assert_eq!(summary.skipped_patients, 7);
    assert_eq!(summary.failed_exports, 0);

    // The patient that triggered shutdown was still exported in full.
    assert_eq!(summary.rows_per_table[&TableKind::Patients], 3);
    assert_eq!(summary.rows_per_table[&TableKind::Encounters], 3);
    assert_eq!(buffers[&TableKind::Encounters].lines().len(), 4);
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    shutdown_tx.send(true).unwrap();
    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}
