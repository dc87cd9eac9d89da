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

use serde::Serialize;

use super::LineType;

/// Verdict for one candidate string. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// The candidate exactly as received, minus surrounding whitespace.
    pub input: String,
    pub valid: bool,
    /// ISO 3166-1 alpha-2 region, e.g. `US`. `None` for invalid numbers and
    /// for non-geographic ones (`+800`, `+808`, ...), which belong to no region.
    pub country: Option<String>,
    /// `None` only for invalid numbers.
    pub line_type: Option<LineType>,
    /// e.g. `(773) 776-5277`
    pub formatted_national: Option<String>,
    /// e.g. `+1 773-776-5277`
    pub formatted_international: Option<String>,
}

impl ValidationResult {
    /// The shape every failure path resolves to.
    pub fn invalid(input: &str) -> Self {
        Self {
            input: input.trim().to_owned(),
            valid: false,
            country: None,
            line_type: None,
            formatted_national: None,
            formatted_international: None,
        }
    }
}
