//! Export coordinator - main orchestrator for the export process
//!
//! Lists patient records, exports them concurrently through one shared
//! [`RecordWalker`], and gathers the outcome into an [`ExportSummary`].

use crate::adapters::records::json::JsonDirectorySource;
use crate::adapters::records::RecordSource;
use crate::config::TabulaConfig;
use crate::core::export::summary::{ExportError, ExportSummary};
use crate::core::export::walker::RecordWalker;
use crate::core::tables::{Schema, TableWriterSet};
use crate::domain::{Result, TabulaError};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Progress is logged every this many finished patients
const PROGRESS_INTERVAL: usize = 100;

/// How a single patient export ended
enum PatientOutcome {
    Exported,
    Failed(ExportError),
    /// Never started because of shutdown or fail-fast
    Skipped,
}

/// Export coordinator
pub struct ExportCoordinator {
    config: TabulaConfig,
    source: Arc<dyn RecordSource>,
    walker: Arc<RecordWalker>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator reading JSON records from `input.directory`
    ///
    /// Creates the output directory and every table file with its header.
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::Initialization`] if any table cannot be created;
    /// nothing is exported in that case.
    pub fn new(config: TabulaConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let source = Arc::new(JsonDirectorySource::new(&config.input.directory));
        let schema = Schema::select(config.output.timeline_layout, config.output.parse_address);
        let tables = TableWriterSet::create(&config.output.directory, schema)?;

        tracing::info!(
            input = %config.input.directory,
            output = %config.output.directory,
            variant = %schema.variant(),
            parse_address = schema.decomposes_address(),
            "Export coordinator initialized"
        );

        Ok(Self::from_parts(
            config,
            source,
            Arc::new(tables),
            shutdown_signal,
        ))
    }

    /// Create a coordinator over an explicit source and table set
    pub fn from_parts(
        config: TabulaConfig,
        source: Arc<dyn RecordSource>,
        tables: Arc<TableWriterSet>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            source,
            walker: Arc::new(RecordWalker::new(tables)),
            shutdown_signal,
        }
    }

    /// Execute the export
    ///
    /// At most `export.parallel_patients` patients are in flight. A failed
    /// patient is recorded and the run continues, unless `export.fail_fast`
    /// is set, in which case no further patients are started. A shutdown
    /// signal likewise stops scheduling; patients already running finish.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source cannot be listed or the tables
    /// cannot be flushed at the end. Per-patient failures land in the summary.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();
        let as_of = self.config.export.as_of_millis();

        let keys = self.source.list()?;
        summary.total_patients = keys.len();

        tracing::info!(
            patients = keys.len(),
            parallel_patients = self.config.export.parallel_patients,
            fail_fast = self.config.export.fail_fast,
            as_of,
            "Starting export process"
        );

        let abort = Arc::new(AtomicBool::new(false));
        let mut outcomes = stream::iter(keys)
            .map(|key| self.export_patient(key, as_of, Arc::clone(&abort)))
            .buffer_unordered(self.config.export.parallel_patients.max(1));

        let mut finished = 0usize;
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                PatientOutcome::Exported => summary.successful_exports += 1,
                PatientOutcome::Failed(error) => {
                    summary.failed_exports += 1;
                    summary.add_error(error);
                }
                PatientOutcome::Skipped => summary.skipped_patients += 1,
            }
            finished += 1;
            crate::log_export_progress!(finished, summary.total_patients, PROGRESS_INTERVAL);
        }

        if *self.shutdown_signal.borrow() {
            tracing::warn!(
                skipped = summary.skipped_patients,
                "Export interrupted by shutdown signal"
            );
            summary.interrupted = true;
        }

        let tables = self.walker.tables();
        tables.flush_all()?;
        summary.rows_per_table = tables.row_counts();

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Load and export one patient on the blocking pool
    async fn export_patient(&self, key: String, as_of: i64, abort: Arc<AtomicBool>) -> PatientOutcome {
        if *self.shutdown_signal.borrow() || abort.load(Ordering::SeqCst) {
            tracing::debug!(source = %key, "Skipping patient");
            return PatientOutcome::Skipped;
        }

        let source = Arc::clone(&self.source);
        let walker = Arc::clone(&self.walker);
        let task_key = key.clone();
        let joined = tokio::task::spawn_blocking(
            move || -> std::result::Result<String, (Option<String>, TabulaError)> {
                let person = source.load(&task_key).map_err(|e| (None, e))?;
                walker
                    .export(&person, as_of)
                    .map_err(|e| (Some(person.id.clone()), e))
            },
        )
        .await;

        let result = joined.unwrap_or_else(|e| {
            Err((
                None,
                TabulaError::Export(format!("Export task for {} failed: {}", key, e)),
            ))
        });

        match result {
            Ok(patient_id) => {
                crate::log_patient_exported!(patient_id, key);
                PatientOutcome::Exported
            }
            Err((patient_id, error)) => {
                if self.config.export.fail_fast || error.is_fatal() {
                    abort.store(true, Ordering::SeqCst);
                }
                tracing::warn!(
                    source = %key,
                    patient_id = patient_id.as_deref().unwrap_or("-"),
                    error = %error,
                    "Patient export failed"
                );

                let mut export_error = ExportError::from_error(&error).with_source(key);
                if let Some(patient_id) = patient_id {
                    export_error = export_error.with_patient_id(patient_id);
                }
                PatientOutcome::Failed(export_error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::records::memory::MemorySource;
    use crate::config::{
        ApplicationConfig, ExportConfig, InputConfig, LoggingConfig, OutputConfig,
    };
    use crate::core::export::summary::ExportErrorType;
    use crate::core::tables::TableKind;
    use crate::domain::{Code, Encounter, HealthRecord, Person};
    use std::collections::HashMap;

    fn config(fail_fast: bool, parallel_patients: usize) -> TabulaConfig {
        TabulaConfig {
            application: ApplicationConfig::default(),
            input: InputConfig {
                directory: "records".to_string(),
            },
            output: OutputConfig::default(),
            export: ExportConfig {
                parallel_patients,
                fail_fast,
                as_of: None,
            },
            logging: LoggingConfig::default(),
        }
    }

    fn person(id: &str, encounter_codes: Vec<Code>) -> Person {
        let attributes: HashMap<String, String> = [
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
                    codes: encounter_codes,
                    ..Default::default()
                }],
                death: None,
            },
            ..Default::default()
        }
    }

    fn healthy(id: &str) -> Person {
        person(id, vec![Code::new("185349003", "Check up")])
    }

    fn coordinator(
        people: Vec<Person>,
        config: TabulaConfig,
    ) -> (ExportCoordinator, watch::Sender<bool>) {
        let (tables, _buffers) = TableWriterSet::in_memory(Schema::select(false, false)).unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let coordinator = ExportCoordinator::from_parts(
            config,
            Arc::new(MemorySource::new(people)),
            Arc::new(tables),
            shutdown_rx,
        );
        (coordinator, shutdown_tx)
    }

    #[tokio::test]
    async fn test_exports_every_patient() {
        let people = (0..20).map(|i| healthy(&format!("p-{i}"))).collect();
        let (coordinator, _tx) = coordinator(people, config(false, 4));

        let summary = coordinator.execute_export().await.unwrap();
        assert_eq!(summary.total_patients, 20);
        assert_eq!(summary.successful_exports, 20);
        assert!(summary.is_successful());
        assert_eq!(summary.rows_per_table[&TableKind::Patients], 20);
        assert_eq!(summary.rows_per_table[&TableKind::Encounters], 20);
    }

    #[tokio::test]
    async fn test_malformed_patient_is_recorded_and_run_continues() {
        let people = vec![healthy("p-1"), person("p-2", vec![]), healthy("p-3")];
        let (coordinator, _tx) = coordinator(people, config(false, 1));

        let summary = coordinator.execute_export().await.unwrap();
        assert_eq!(summary.successful_exports, 2);
        assert_eq!(summary.failed_exports, 1);
        assert!(!summary.is_successful());

        let error = &summary.errors[0];
        assert_eq!(error.error_type, ExportErrorType::MalformedRecord);
        assert_eq!(error.detail.patient_id.as_deref(), Some("p-2"));
        assert_eq!(error.detail.source.as_deref(), Some("p-2"));
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining_patients() {
        let people = vec![person("p-1", vec![]), healthy("p-2"), healthy("p-3")];
        let (coordinator, _tx) = coordinator(people, config(true, 1));

        let summary = coordinator.execute_export().await.unwrap();
        assert_eq!(summary.failed_exports, 1);
        assert_eq!(summary.successful_exports, 0);
        assert_eq!(summary.skipped_patients, 2);
        assert!(!summary.interrupted);
    }

    #[tokio::test]
    async fn test_shutdown_before_start_skips_everything() {
        let people = vec![healthy("p-1"), healthy("p-2")];
        let (coordinator, tx) = coordinator(people, config(false, 2));
        tx.send(true).unwrap();

        let summary = coordinator.execute_export().await.unwrap();
        assert_eq!(summary.skipped_patients, 2);
        assert!(summary.interrupted);
        assert!(!summary.is_successful());
        assert_eq!(summary.rows_per_table[&TableKind::Patients], 0);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let (coordinator, _tx) = coordinator(Vec::new(), config(false, 8));

        let summary = coordinator.execute_export().await.unwrap();
        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.total_rows(), 0);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_new_fails_when_output_cannot_be_created() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mut config = config(false, 1);
        config.output.directory = blocker.join("tables").to_string_lossy().to_string();
        let (_tx, rx) = watch::channel(false);

        let result = ExportCoordinator::new(config, rx);
        assert!(matches!(result, Err(TabulaError::Initialization(_))));
    }
}
