use crate::classifier::ValidationResult;

/// Whatever decides validity for the batch orchestrator.
///
/// Implementations must never panic on malformed input: every failure path
/// resolves to [`ValidationResult::invalid`].
pub trait Classify: Send + Sync {
    fn classify(&self, raw: &str) -> ValidationResult;
}
