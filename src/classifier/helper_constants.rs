// Anything with fewer significant digits than this is rejected before the
// parser sees it. Bare local numbers without an area code are never
// meaningful in bulk input.
pub const MIN_SIGNIFICANT_DIGITS: usize = 8;
// The ITU says the maximum length should be 15, but we have found longer
// numbers in Germany. Three more digits for the country calling code and
// a long international prefix.
pub const MAX_SIGNIFICANT_DIGITS: usize = 17 + 3 + 4;
