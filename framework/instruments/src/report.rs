mod operations_table;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use gust_core::prelude::Outcome;
use parking_lot::Mutex;
use tabled::settings::Style;
use tabled::Table;

use crate::report::operations_table::OperationRow;

/// A single executed action: its reporting name, how it went and how long it took.
///
/// Create the record before issuing the request and call [OperationRecord::finish] with the
/// outcome once the response (or transport error) has been classified.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    operation_id: String,
    started: Instant,
    elapsed: Option<Duration>,
    outcome: Option<Outcome>,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            outcome: None,
        }
    }

    pub fn finish(mut self, outcome: Outcome) -> Self {
        self.elapsed = Some(self.started.elapsed());
        self.outcome = Some(outcome);
        self
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// Collects operation records from every virtual user and prints a per-operation summary when
/// the run finishes.
///
/// Shared behind an `Arc` and fed concurrently, so the record list sits behind a mutex. The
/// lock is held only long enough to push one record.
#[derive(Debug, Default)]
pub struct Reporter {
    operation_records: Mutex<Vec<OperationRecord>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operation(&self, operation_record: OperationRecord) {
        self.operation_records.lock().push(operation_record);
    }

    /// Number of finished operations recorded so far, across all operations.
    pub fn operation_count(&self) -> usize {
        self.operation_records.lock().len()
    }

    /// Number of finished operations recorded for one operation id.
    pub fn operation_count_for(&self, operation_id: &str) -> usize {
        self.operation_records
            .lock()
            .iter()
            .filter(|record| record.operation_id() == operation_id)
            .count()
    }

    pub fn finalize(&self) {
        let records = self.operation_records.lock();
        log::debug!("Summarising {} operation records", records.len());

        if records.is_empty() {
            println!("\nNo operations were recorded");
            return;
        }

        let mut by_operation: HashMap<String, Vec<&OperationRecord>> = HashMap::new();
        for record in records.iter() {
            by_operation
                .entry(record.operation_id().to_string())
                .or_default()
                .push(record);
        }

        let mut rows = by_operation
            .into_iter()
            .map(|(operation_id, records)| OperationRow::summarise(operation_id, &records))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.operation.cmp(&b.operation));

        let mut table = Table::new(&rows);
        table.with(Style::modern());

        println!("\nSummary of operations");
        println!("{}", table);
    }
}
