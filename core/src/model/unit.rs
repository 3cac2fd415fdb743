use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dose-rate units offered by the capture form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoseUnit {
    #[default]
    #[serde(rename = "µSv/h")]
    MicroSievertPerHour,
    #[serde(rename = "mSv/h")]
    MilliSievertPerHour,
}

impl DoseUnit {
    pub const ALL: [DoseUnit; 2] = [DoseUnit::MicroSievertPerHour, DoseUnit::MilliSievertPerHour];

    pub fn label(self) -> &'static str {
        match self {
            DoseUnit::MicroSievertPerHour => "µSv/h",
            DoseUnit::MilliSievertPerHour => "mSv/h",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|unit| unit.label()).collect()
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown dose unit `{0}`")]
pub struct UnknownUnit(pub String);

impl FromStr for DoseUnit {
    type Err = UnknownUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Older tables were written with Ukrainian labels.
        match value.trim() {
            "µSv/h" | "μSv/h" | "uSv/h" | "мкЗв/год" => Ok(DoseUnit::MicroSievertPerHour),
            "mSv/h" | "мЗв/год" => Ok(DoseUnit::MilliSievertPerHour),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_labels() {
        assert_eq!("µSv/h".parse::<DoseUnit>(), Ok(DoseUnit::MicroSievertPerHour));
        assert_eq!("мкЗв/год".parse::<DoseUnit>(), Ok(DoseUnit::MicroSievertPerHour));
        assert_eq!(" mSv/h ".parse::<DoseUnit>(), Ok(DoseUnit::MilliSievertPerHour));
        assert_eq!("мЗв/год".parse::<DoseUnit>(), Ok(DoseUnit::MilliSievertPerHour));
    }

    #[test]
    fn rejects_unknown_label() {
        let err = "R/h".parse::<DoseUnit>().unwrap_err();
        assert_eq!(err, UnknownUnit("R/h".into()));
    }

    #[test]
    fn labels_follow_declaration_order() {
        assert_eq!(DoseUnit::labels(), vec!["µSv/h", "mSv/h"]);
        assert_eq!(DoseUnit::default(), DoseUnit::MicroSievertPerHour);
    }
}
