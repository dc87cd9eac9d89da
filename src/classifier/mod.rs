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

mod helper_constants;
pub mod enums;
pub mod classifier;
pub mod validation_result;

pub use enums::LineType;
pub use classifier::PhoneClassifier;
pub use validation_result::ValidationResult;
pub use helper_constants::MIN_SIGNIFICANT_DIGITS;

use phonenumber::country::Id;

/// One-shot classification without a cache. Prefer a shared
/// [`PhoneClassifier`] when classifying more than a handful of numbers.
pub fn classify(raw: &str, default_region: Option<Id>) -> ValidationResult {
    PhoneClassifier::new(default_region).classify(raw)
}
