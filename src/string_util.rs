// Copyright (C) 2025 Kashin Vladislav (Rust adaptation author)
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

use std::borrow::Cow;

use dec_from_char::DecimalExtended;

/// Counts every character that is a decimal digit in any script.
pub fn count_significant_digits(s: &str) -> usize {
    s.chars().filter(|c| c.is_decimal_utf8()).count()
}

/// Rewrites non-ASCII decimal digits (full-width, Arabic-Indic, ...) into
/// ASCII ones. Returns `Cow::Borrowed` when nothing had to change.
pub fn normalize_digits(s: &str) -> Cow<'_, str> {
    if s.chars().all(|c| c.is_ascii() || !c.is_decimal_utf8()) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(dec_from_char::normalize_decimals(s).to_string())
}

/// Renders a spreadsheet-style float without a fractional part when it has
/// none, so `7737765277.0` becomes `7737765277` rather than a string the
/// extractor would split on the period.
pub fn float_cell_to_string(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e17 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
