mod report;

pub use report::{OperationRecord, Reporter};
