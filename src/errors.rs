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

use thiserror::Error;

/// Errors surfaced to callers before any batch starts, or by the single
/// validation request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The caller handed over a source the pipeline has no adapter for.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Phone number is required")]
    EmptyInput,

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown region code: {0}")]
    UnknownRegion(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures raised while pulling fragments out of a source.
///
/// Whether an error aborts the batch is decided by [`SourceError::is_fatal`]:
/// a broken record only costs that record, while a source that can no longer
/// be read ends the batch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read source: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode {format} source: {reason}")]
    Decode { format: &'static str, reason: String },

    #[error("Malformed record {position}: {reason}")]
    MalformedRecord { position: usize, reason: String },

    #[error("Source reader stopped unexpectedly: {0}")]
    Aborted(String),
}

impl SourceError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::MalformedRecord { .. })
    }
}
