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

use std::time::Duration;

use serde::Serialize;

use crate::classifier::ValidationResult;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_CHUNK_PAUSE: Duration = Duration::from_millis(10);
pub const DEFAULT_EVENT_CAPACITY: usize = 1;

/// Tuning of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Candidates classified between two progress events. Never zero.
    pub chunk_size: usize,
    /// Pause between chunks. Zero still yields to the runtime once.
    pub chunk_pause: Duration,
    /// Capacity of the event channel callers should create.
    pub event_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_pause: DEFAULT_CHUNK_PAUSE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Running counters of a batch. Every field only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub processed_count: usize,
    pub total_count: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub percent_complete: u8,
}

impl BatchProgress {
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            percent_complete: if total_count == 0 { 100 } else { 0 },
            ..Default::default()
        }
    }

    pub(super) fn record(&mut self, result: &ValidationResult) {
        self.processed_count += 1;
        if result.valid {
            self.valid_count += 1;
        } else {
            self.invalid_count += 1;
        }
        self.percent_complete = percent_of(self.processed_count, self.total_count);
    }
}

/// `round(processed / total * 100)`, and 100 for an empty batch.
pub fn percent_of(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (processed as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub processed: usize,
}

impl From<&BatchProgress> for BatchSummary {
    fn from(progress: &BatchProgress) -> Self {
        Self {
            total: progress.total_count,
            valid: progress.valid_count,
            invalid: progress.invalid_count,
            processed: progress.processed_count,
        }
    }
}

/// Final accounting of a completed batch. Produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub results: Vec<ValidationResult>,
}

/// One record on the progress channel, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchEvent {
    Progress {
        processed: usize,
        total: usize,
        percent: u8,
    },
    Result {
        count: usize,
        results: Vec<ValidationResult>,
        summary: BatchSummary,
    },
    Error {
        message: String,
    },
}

impl BatchEvent {
    /// Newline-delimited JSON form used on the wire.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl From<&BatchProgress> for BatchEvent {
    fn from(progress: &BatchProgress) -> Self {
        BatchEvent::Progress {
            processed: progress.processed_count,
            total: progress.total_count,
            percent: progress.percent_complete,
        }
    }
}

impl From<BatchOutcome> for BatchEvent {
    fn from(outcome: BatchOutcome) -> Self {
        BatchEvent::Result {
            count: outcome.results.len(),
            results: outcome.results,
            summary: outcome.summary,
        }
    }
}

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Initialized,
    /// Draining the source and extracting candidates; the total is not
    /// known yet.
    Counting,
    /// Classifying chunk `chunk` (1-based) of `chunks`.
    Processing { chunk: usize, chunks: usize },
    Completed,
    Failed,
    /// The caller cancelled or stopped listening.
    Cancelled,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchState::Completed | BatchState::Failed | BatchState::Cancelled)
    }
}

/// What a finished run leaves behind for the caller besides the events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub state: BatchState,
    pub progress: BatchProgress,
}
