mod orchestrator;
pub mod types;

pub use orchestrator::BatchOrchestrator;
pub use types::{
    percent_of, BatchConfig, BatchEvent, BatchOutcome, BatchProgress, BatchReport, BatchState,
    BatchSummary,
};
