use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NearbyError;

/// The selectable search radii offered by the map and the nearby-events sheet.
///
/// This is a closed set; configuration values that do not name one of these radii
/// are rejected rather than rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RadiusOption {
    OneKm,
    #[default]
    FiveKm,
    TenKm,
}

impl RadiusOption {
    /// Every option, smallest first.
    pub const ALL: [RadiusOption; 3] = [
        RadiusOption::OneKm,
        RadiusOption::FiveKm,
        RadiusOption::TenKm,
    ];

    pub fn km(self) -> f64 {
        match self {
            RadiusOption::OneKm => 1.0,
            RadiusOption::FiveKm => 5.0,
            RadiusOption::TenKm => 10.0,
        }
    }
}

impl fmt::Display for RadiusOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km", self.km())
    }
}

impl TryFrom<f64> for RadiusOption {
    type Error = NearbyError;

    fn try_from(km: f64) -> Result<Self, Self::Error> {
        RadiusOption::ALL
            .into_iter()
            .find(|option| option.km() == km)
            .ok_or_else(|| {
                NearbyError::InvalidArgument(format!(
                    "{} km is not a supported radius (expected one of 1, 5, 10)",
                    km
                ))
            })
    }
}

impl From<RadiusOption> for f64 {
    fn from(option: RadiusOption) -> f64 {
        option.km()
    }
}

impl FromStr for RadiusOption {
    type Err = NearbyError;

    /// Accepts `"5"`, `"5km"` and `"5 km"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix("km")
            .map(str::trim_end)
            .unwrap_or(trimmed);
        let km: f64 = number.parse().map_err(|_| {
            NearbyError::InvalidArgument(format!("Cannot parse radius from '{}'", s))
        })?;
        RadiusOption::try_from(km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configuration_spellings() {
        assert_eq!("1".parse::<RadiusOption>().unwrap(), RadiusOption::OneKm);
        assert_eq!("5km".parse::<RadiusOption>().unwrap(), RadiusOption::FiveKm);
        assert_eq!(" 10 km ".parse::<RadiusOption>().unwrap(), RadiusOption::TenKm);
        assert!(matches!(
            "7".parse::<RadiusOption>(),
            Err(NearbyError::InvalidArgument(_))
        ));
        assert!("ten".parse::<RadiusOption>().is_err());
    }

    #[test]
    fn serializes_as_kilometers() {
        assert_eq!(serde_json::to_string(&RadiusOption::TenKm).unwrap(), "10.0");
        let parsed: RadiusOption = serde_json::from_str("1.0").unwrap();
        assert_eq!(parsed, RadiusOption::OneKm);
        assert!(serde_json::from_str::<RadiusOption>("2.5").is_err());
    }

    #[test]
    fn display_and_default() {
        assert_eq!(RadiusOption::default(), RadiusOption::FiveKm);
        assert_eq!(RadiusOption::OneKm.to_string(), "1 km");
    }
}
