use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    batch::{BatchEvent, BatchOrchestrator, BatchReport},
    classifier::{PhoneClassifier, ValidationResult},
    config::ValidatorConfig,
    errors::Error,
    sources::{FragmentSource, StagedUpload},
};

/// Entry point for both request shapes: one number, or a batch over a
/// fragment source with progress streamed to an event channel.
///
/// A validator holds no per-batch state, so concurrent batches on one
/// instance are independent of each other.
pub struct PhoneValidator {
    orchestrator: BatchOrchestrator<PhoneClassifier>,
}

impl PhoneValidator {
    /// Fails on configuration errors such as an unknown default region, so
    /// a misconfigured service never gets as far as a batch.
    pub fn new(config: &ValidatorConfig) -> Result<Self, Error> {
        config.validate()?;
        let classifier = PhoneClassifier::new(config.region()?).with_cache(config.cache_capacity);
        info!(
            "Phone validator ready, default region {}",
            config.default_region.as_deref().unwrap_or("<none>")
        );
        Ok(Self {
            orchestrator: BatchOrchestrator::new(classifier, config.batch_config()),
        })
    }

    pub fn classifier(&self) -> &PhoneClassifier {
        self.orchestrator.classifier()
    }

    /// Classifies one number as typed by a user. Blank input is a caller
    /// error; anything else gets a verdict.
    pub fn validate_single(&self, raw: &str) -> Result<ValidationResult, Error> {
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(self.classifier().classify(raw))
    }

    /// A bounded channel sized for this validator's batches.
    pub fn event_channel(&self) -> (mpsc::Sender<BatchEvent>, mpsc::Receiver<BatchEvent>) {
        mpsc::channel(self.orchestrator.config().event_capacity)
    }

    pub async fn validate_bulk<S>(
        &self,
        source: S,
        events: mpsc::Sender<BatchEvent>,
        cancel: CancellationToken,
    ) -> BatchReport
    where
        S: FragmentSource + 'static,
    {
        self.orchestrator.run(source, events, cancel).await
    }

    /// Runs a batch over a staged upload and deletes the staged copy once
    /// the batch reaches a terminal state.
    ///
    /// An upload in a format nobody can read is rejected here, before any
    /// event is sent.
    pub async fn validate_upload(
        &self,
        upload: StagedUpload,
        events: mpsc::Sender<BatchEvent>,
        cancel: CancellationToken,
    ) -> Result<BatchReport, Error> {
        let source = upload.open()?;
        info!("Validating upload '{}'", upload.original_name());
        let report = self.orchestrator.run(source, events, cancel).await;

        let name = upload.original_name().to_owned();
        if let Err(err) = upload.close() {
            warn!("Failed to remove staged upload '{name}': {err}");
        }
        Ok(report)
    }
}
