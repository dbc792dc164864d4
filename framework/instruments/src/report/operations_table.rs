use gust_core::prelude::Outcome;
use tabled::Tabled;

use crate::OperationRecord;

#[derive(Tabled)]
pub(crate) struct OperationRow {
    pub operation: String,
    pub requests: usize,
    pub success: usize,
    pub expected_failures: usize,
    pub unexpected_failures: usize,
    pub avg_ms: String,
    pub min_ms: String,
    pub max_ms: String,
}

impl OperationRow {
    pub(crate) fn summarise(operation: String, records: &[&OperationRecord]) -> Self {
        let durations_micro = records
            .iter()
            .filter_map(|record| record.duration())
            .map(|duration| duration.as_micros())
            .collect::<Vec<_>>();

        let total_micro = durations_micro.iter().sum::<u128>();
        let avg_ms = if durations_micro.is_empty() {
            0.0
        } else {
            (total_micro as f64 / durations_micro.len() as f64) / 1000.0
        };
        let min_ms = durations_micro.iter().min().copied().unwrap_or(0) as f64 / 1000.0;
        let max_ms = durations_micro.iter().max().copied().unwrap_or(0) as f64 / 1000.0;

        let count_outcome = |outcome: Outcome| {
            records
                .iter()
                .filter(|record| record.outcome() == Some(outcome))
                .count()
        };

        Self {
            operation,
            requests: records.len(),
            success: count_outcome(Outcome::Success),
            expected_failures: count_outcome(Outcome::ExpectedFailure),
            unexpected_failures: count_outcome(Outcome::UnexpectedFailure),
            avg_ms: format!("{:.2}", avg_ms),
            min_ms: format!("{:.2}", min_ms),
            max_ms: format!("{:.2}", max_ms),
        }
    }
}
