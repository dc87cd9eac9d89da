mod interfaces;
mod result_cache;
mod validator;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod i18n;
pub mod sources;
pub(crate) mod string_util;

#[cfg(test)]
mod tests;

pub use batch::{BatchConfig, BatchEvent, BatchReport, BatchState, BatchSummary};
pub use classifier::{LineType, PhoneClassifier, ValidationResult};
pub use config::ValidatorConfig;
pub use errors::{ConfigError, Error, SourceError};
pub use interfaces::Classify;
pub use sources::{FragmentSource, SourceFormat, StagedUpload};
pub use validator::PhoneValidator;
