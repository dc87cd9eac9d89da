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

use std::panic;

use log::{trace, warn};
use phonenumber::{Mode, PhoneNumber, country::Id, metadata::DATABASE};

use super::{
    LineType, ValidationResult,
    helper_constants::{MAX_SIGNIFICANT_DIGITS, MIN_SIGNIFICANT_DIGITS},
};
use crate::{
    errors::ConfigError,
    i18n::RegionCode,
    interfaces::Classify,
    result_cache::ResultCache,
    string_util::{count_significant_digits, normalize_digits},
};

/// Normalizes, validates and classifies raw candidate strings.
///
/// Without a default region only numbers written with a leading
/// `+<country code>` can be valid; national-format numbers such as
/// `800-555-0199` need the region they are dialled in.
pub struct PhoneClassifier {
    default_region: Option<Id>,
    cache: Option<ResultCache>,
}

impl PhoneClassifier {
    pub fn new(default_region: Option<Id>) -> Self {
        Self { default_region, cache: None }
    }

    /// Builds a classifier from a region string such as `"US"`, `"uk"` or
    /// `""` (no default region).
    pub fn for_region(region: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(RegionCode::resolve(region)?))
    }

    /// Memoizes up to `capacity` verdicts. Zero disables the cache.
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| ResultCache::with_capacity(capacity));
        self
    }

    pub fn default_region(&self) -> Option<Id> {
        self.default_region
    }

    /// Classifies one candidate. Never panics and never fails: anything that
    /// cannot be confirmed as a valid number comes back as
    /// [`ValidationResult::invalid`].
    pub fn classify(&self, raw: &str) -> ValidationResult {
        let trimmed = raw.trim();
        match &self.cache {
            Some(cache) => cache.get_or_insert_with(trimmed, || self.classify_uncached(trimmed)),
            None => self.classify_uncached(trimmed),
        }
    }

    fn classify_uncached(&self, trimmed: &str) -> ValidationResult {
        let normalized = normalize_digits(trimmed);

        let digits = count_significant_digits(&normalized);
        if !(MIN_SIGNIFICANT_DIGITS..=MAX_SIGNIFICANT_DIGITS).contains(&digits) {
            trace!("Candidate '{trimmed}' has {digits} significant digits, out of range");
            return ValidationResult::invalid(trimmed);
        }

        let Some(number) = self.parse(trimmed, &normalized) else {
            return ValidationResult::invalid(trimmed);
        };

        if number.extension().is_some() {
            trace!("Candidate '{trimmed}' carries an extension, rejected");
            return ValidationResult::invalid(trimmed);
        }

        if !phonenumber::is_valid(&number) {
            trace!("Candidate '{trimmed}' parsed but is not a valid number for its region");
            return ValidationResult::invalid(trimmed);
        }

        let country = number
            .metadata(&DATABASE)
            .map(|meta| meta.id())
            .filter(|id| *id != RegionCode::un001())
            .map(str::to_owned);
        let line_type = LineType::from(number.number_type(&DATABASE));
        trace!("Candidate '{trimmed}' is a valid {line_type} number ({country:?})");

        ValidationResult {
            input: trimmed.to_owned(),
            valid: true,
            country,
            line_type: Some(line_type),
            formatted_national: Some(number.format().mode(Mode::National).to_string()),
            formatted_international: Some(number.format().mode(Mode::International).to_string()),
        }
    }

    fn parse(&self, trimmed: &str, normalized: &str) -> Option<PhoneNumber> {
        let region = self.default_region;
        // A panicking parser counts as a failed parse.
        match panic::catch_unwind(|| phonenumber::parse(region, normalized)) {
            Ok(Ok(number)) => Some(number),
            Ok(Err(err)) => {
                trace!("Candidate '{trimmed}' failed to parse: {err}");
                None
            }
            Err(_) => {
                warn!("Parser panicked on candidate '{trimmed}', recording it as invalid");
                None
            }
        }
    }
}

impl Classify for PhoneClassifier {
    fn classify(&self, raw: &str) -> ValidationResult {
        PhoneClassifier::classify(self, raw)
    }
}
