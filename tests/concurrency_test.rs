//! Concurrent writers sharing one table set
//!
//! Rows from different patients may interleave across lines, but never
//! within one.

use std::fs;
use std::sync::Arc;
use std::thread;
use tabula::core::export::RecordWalker;
use tabula::core::tables::{Schema, TableKind, TableWriterSet};
use tabula::core::transform::Row;
use tabula::domain::{Code, Encounter, Entry, HealthRecord, Person};
use tempfile::TempDir;

const THREADS: usize = 8;
const ROWS_PER_THREAD: usize = 250;

fn person(id: String) -> Person {
    let attributes = [
        ("first", "Ana"),
        ("address", "100 Main St"),
        ("city", "Springfield"),
        ("state", "IL"),
        ("zip", "62704"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let conditions = (0..20)
        .map(|i| Entry {
            start: 1_577_836_800_000 + i * 86_400_000,
            codes: vec![Code::new("444814009", "Viral sinusitis")],
            ..Default::default()
        })
        .collect();

    Person {
        id,
        attributes,
        record: HealthRecord {
            encounters: vec![Encounter {
                start: 1_577_836_800_000,
                codes: vec![Code::new("185349003", "Check up")],
                conditions,
                ..Default::default()
            }],
            death: None,
        },
        ..Default::default()
    }
}

#[test]
fn test_concurrent_rows_never_mix_within_a_line() {
    let output = TempDir::new().unwrap();
    let schema = Schema::select(false, false);
    let tables = Arc::new(TableWriterSet::create(output.path(), schema).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let tables = Arc::clone(&tables);
            thread::spawn(move || {
                for i in 0..ROWS_PER_THREAD {
                    let marker = format!("t{t}-r{i}");
                    let row = Row::new().fields([
                        marker.clone(),
                        String::new(),
                        marker.clone(),
                        marker.clone(),
                        "code".to_string(),
                        marker,
                    ]);
                    tables.write_row(TableKind::Allergies, &row).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    tables.flush_all().unwrap();

    let contents = fs::read_to_string(output.path().join("allergies.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 1 + THREADS * ROWS_PER_THREAD);

    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6, "{line}");
        assert_eq!(fields[0], fields[2], "{line}");
        assert_eq!(fields[0], fields[5], "{line}");
    }
}

#[test]
fn test_concurrent_walkers_share_tables() {
    let output = TempDir::new().unwrap();
    let schema = Schema::select(true, false);
    let tables = Arc::new(TableWriterSet::create(output.path(), schema).unwrap());
    let walker = Arc::new(RecordWalker::new(Arc::clone(&tables)));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let walker = Arc::clone(&walker);
            thread::spawn(move || {
                for i in 0..10 {
                    walker
                        .export(&person(format!("p-{t}-{i}")), 1_609_459_200_000)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let counts = tables.row_counts();
    assert_eq!(counts[&TableKind::Patients], THREADS * 10);
    assert_eq!(counts[&TableKind::Conditions], THREADS * 10 * 20);

    let condition_columns = schema.column_count(TableKind::Conditions).unwrap();
    let contents = fs::read_to_string(output.path().join("condition.csv")).unwrap();
    for line in contents.lines().filter(|l| !l.is_empty()) {
        assert_eq!(line.split(',').count(), condition_columns, "{line}");
    }
}
