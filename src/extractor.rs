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

//! Finds substrings of free text that look like phone numbers.
//!
//! The pattern is deliberately loose: dates, order numbers and the like will
//! come through and are rejected later by the classifier.

use std::sync::LazyLock;

use regex::Regex;

// Optional plus (ASCII or full-width) and an optional opening parenthesis.
const LEADING: &str = r"[+\x{FF0B}]?\(?";
const DIGIT: &str = r"\d";
// Horizontal whitespace only. Numbers on adjacent lines must stay apart.
const BODY: &str = r"[\d \t\x{00A0}\x{2007}\x{202F}().\-]";
// Together with the first and last digit: eight characters minimum.
const BODY_REPEAT: &str = "{6,}";

static CANDIDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = fast_cat::concat_str!(LEADING, DIGIT, BODY, BODY_REPEAT, DIGIT);
    Regex::new(&pattern).expect("candidate pattern must compile")
});

/// A raw substring that might be a phone number, plus the position of the
/// fragment it came from in the source's emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub raw: String,
    pub fragment: usize,
}

/// Returns every candidate in `fragment`, left to right, duplicates kept.
/// Empty and whitespace-only fragments yield nothing.
pub fn extract(fragment: &str) -> Vec<&str> {
    if fragment.trim().is_empty() {
        return Vec::new();
    }
    CANDIDATE_PATTERN
        .find_iter(fragment)
        .map(|found| found.as_str())
        .collect()
}

/// Owned variant of [`extract`] tagged with the fragment position.
pub fn candidates(fragment_index: usize, fragment: &str) -> impl Iterator<Item = Candidate> + '_ {
    extract(fragment).into_iter().map(move |raw| Candidate {
        raw: raw.to_owned(),
        fragment: fragment_index,
    })
}
