use phonenumber::country::Id;

use crate::errors::ConfigError;

pub struct RegionCode {
}

impl RegionCode {
    /// Returns a region code string representing the "unknown" region.
    pub fn get_unknown() -> &'static str {
        return Self::zz();
    }

    pub fn zz() -> &'static str {
        return "ZZ";
    }

    /// Region id the metadata uses for non-geographic entities such as
    /// international freephone (`+800`) and shared-cost (`+808`) numbers.
    pub fn un001() -> &'static str {
        return "001";
    }

    /// Turns a user supplied region into the parser's region id.
    ///
    /// Blank input and the unknown region `ZZ` mean "no default region".
    /// `UK` is accepted as an alias for `GB` since people type it far more
    /// often than the ISO code.
    pub fn resolve(region: &str) -> Result<Option<Id>, ConfigError> {
        let normalized = region.trim().to_ascii_uppercase();
        if normalized.is_empty() || normalized == Self::get_unknown() {
            return Ok(None);
        }
        let code = match normalized.as_str() {
            "UK" => "GB",
            other => other,
        };
        code.parse::<Id>()
            .map(Some)
            .map_err(|_| ConfigError::UnknownRegion(region.to_owned()))
    }
}
