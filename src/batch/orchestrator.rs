// Copyright (C) 2025 Kashin Vladislav
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::types::{
    BatchConfig, BatchEvent, BatchOutcome, BatchProgress, BatchReport, BatchState, BatchSummary,
};
use crate::{
    classifier::ValidationResult,
    errors::SourceError,
    extractor::{self, Candidate},
    interfaces::Classify,
    sources::FragmentSource,
};

/// Drives extraction and classification over a fragment source.
///
/// A run goes `Initialized → Counting → Processing → Completed | Failed |
/// Cancelled`. Counting drains the source on a blocking thread and extracts
/// every candidate, which fixes the total up front. Processing classifies
/// candidates `chunk_size` at a time, emits one progress event per chunk and
/// pauses between chunks so the runtime and the event consumer can catch up.
/// Chunks of one run never overlap and runs share no counters.
pub struct BatchOrchestrator<C> {
    classifier: C,
    config: BatchConfig,
}

/// Per-run state. Dropped at the end of [`BatchOrchestrator::run`].
struct BatchJob {
    state: BatchState,
    progress: BatchProgress,
    results: Vec<ValidationResult>,
}

impl BatchJob {
    fn new() -> Self {
        Self {
            state: BatchState::Initialized,
            progress: BatchProgress::default(),
            results: Vec::new(),
        }
    }

    fn transition(&mut self, next: BatchState) {
        debug!("Batch state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn report(&self) -> BatchReport {
        BatchReport { state: self.state, progress: self.progress }
    }
}

impl<C: Classify> BatchOrchestrator<C> {
    pub fn new(classifier: C, config: BatchConfig) -> Self {
        Self {
            classifier,
            config: BatchConfig {
                chunk_size: config.chunk_size.max(1),
                ..config
            },
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Runs one batch to a terminal state.
    ///
    /// Emits `progress` events after each chunk followed by exactly one
    /// `result` event on success, or a single `error` event when the source
    /// cannot be read to the end (no partial results are sent in that case).
    /// Cancelling `cancel` or dropping the receiver stops the run at the next
    /// yield point without further events. The source is released before
    /// this returns, whatever the terminal state.
    pub async fn run<S>(
        &self,
        source: S,
        events: mpsc::Sender<BatchEvent>,
        cancel: CancellationToken,
    ) -> BatchReport
    where
        S: FragmentSource + 'static,
    {
        let mut job = BatchJob::new();

        job.transition(BatchState::Counting);
        let candidates = match count_candidates(source, cancel.clone()).await {
            Ok(Some(candidates)) => candidates,
            Ok(None) => {
                info!("Batch cancelled while reading the source");
                job.transition(BatchState::Cancelled);
                return job.report();
            }
            Err(err) => {
                error!("Batch failed while reading the source: {err}");
                // Nobody to tell if the receiver is gone already.
                let _ = events.send(BatchEvent::Error { message: err.to_string() }).await;
                job.transition(BatchState::Failed);
                return job.report();
            }
        };

        let total = candidates.len();
        job.progress = BatchProgress::new(total);
        job.results.reserve_exact(total);
        info!("Batch counted {total} candidates, chunk size {}", self.config.chunk_size);

        let chunks = total.div_ceil(self.config.chunk_size);
        for (index, chunk) in candidates.chunks(self.config.chunk_size).enumerate() {
            if cancel.is_cancelled() || events.is_closed() {
                job.transition(BatchState::Cancelled);
                return job.report();
            }
            job.transition(BatchState::Processing { chunk: index + 1, chunks });
            self.process_chunk(&mut job, chunk);

            if events.send(BatchEvent::from(&job.progress)).await.is_err() {
                info!("Progress consumer went away, stopping batch");
                job.transition(BatchState::Cancelled);
                return job.report();
            }

            if index + 1 < chunks && self.yield_between_chunks(&cancel).await {
                info!("Batch cancelled after chunk {} of {chunks}", index + 1);
                job.transition(BatchState::Cancelled);
                return job.report();
            }
        }

        if total == 0 && events.send(BatchEvent::from(&job.progress)).await.is_err() {
            job.transition(BatchState::Cancelled);
            return job.report();
        }

        let outcome = BatchOutcome {
            summary: BatchSummary::from(&job.progress),
            results: std::mem::take(&mut job.results),
        };
        if events.send(BatchEvent::from(outcome)).await.is_err() {
            warn!("Batch finished but the consumer is gone, outcome dropped");
            job.transition(BatchState::Cancelled);
            return job.report();
        }

        info!(
            "Batch completed: {} processed, {} valid, {} invalid",
            job.progress.processed_count, job.progress.valid_count, job.progress.invalid_count
        );
        job.transition(BatchState::Completed);
        job.report()
    }

    fn process_chunk(&self, job: &mut BatchJob, chunk: &[Candidate]) {
        for candidate in chunk {
            let result = self.classifier.classify(&candidate.raw);
            job.progress.record(&result);
            job.results.push(result);
        }
        debug!(
            "Chunk done: {}/{} processed ({}%)",
            job.progress.processed_count, job.progress.total_count, job.progress.percent_complete
        );
    }

    /// Returns `true` when the batch was cancelled during the pause.
    async fn yield_between_chunks(&self, cancel: &CancellationToken) -> bool {
        if self.config.chunk_pause.is_zero() {
            tokio::task::yield_now().await;
            return cancel.is_cancelled();
        }
        tokio::select! {
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(self.config.chunk_pause) => false,
        }
    }
}

/// Drains the source on the blocking pool. `Ok(None)` means cancelled.
async fn count_candidates<S>(
    source: S,
    cancel: CancellationToken,
) -> Result<Option<Vec<Candidate>>, SourceError>
where
    S: FragmentSource + 'static,
{
    tokio::task::spawn_blocking(move || collect_candidates(source, &cancel))
        .await
        .map_err(|err| SourceError::Aborted(err.to_string()))?
}

fn collect_candidates<S: FragmentSource>(
    source: S,
    cancel: &CancellationToken,
) -> Result<Option<Vec<Candidate>>, SourceError> {
    let mut found = Vec::new();
    for (index, item) in source.enumerate() {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        match item {
            Ok(fragment) => found.extend(extractor::candidates(index, &fragment)),
            Err(err) if !err.is_fatal() => {
                warn!("Skipping fragment {index}: {err}");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(Some(found))
}
