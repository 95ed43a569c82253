use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

/// Internal NASR facility key (`SITE_NO`). Runways and airspace join on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SiteNumber(String);

impl SiteNumber {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(SiteNumber(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public airport identifier: the ICAO id when present, else the FAA id.
/// Output records and approach plates are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    /// Picks `icao` over `fallback` after trimming and upper-casing both.
    pub fn derive(icao: &str, fallback: &str) -> Option<Self> {
        let icao = crate::utils::normalize_code(icao);
        let code = if icao.is_empty() {
            crate::utils::normalize_code(fallback)
        } else {
            icao
        };
        if code.is_empty() {
            None
        } else {
            Some(AirportCode(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub site_no: SiteNumber,
    pub code: AirportCode,
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub state: String,
    pub country: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Runway {
    pub rwy_id: String,
    pub length: String,
    pub width: String,
    pub surface: String,
    pub condition: String,
}

/// Airspace tiers, declared lowest to highest so `Ord` follows precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum AirspaceClass {
    #[default]
    G,
    E,
    D,
    C,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Airspace {
    pub class: AirspaceClass,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Approach {
    pub chart_name: String,
    pub pdf_url: String,
    pub procuid: String,
    pub amdtnum: String,
    pub amdtdate: String,
}

pub type RunwayIndex = HashMap<SiteNumber, Vec<Runway>>;
pub type AirspaceIndex = HashMap<SiteNumber, Airspace>;
pub type ApproachIndex = HashMap<AirportCode, Vec<Approach>>;

/// Output entry. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedAirport {
    pub site_no: SiteNumber,
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub state: String,
    pub country: String,
    pub airport_name: String,
    pub runways: Vec<Runway>,
    pub airspace: AirspaceClass,
    pub remarks: String,
    pub approaches: Vec<Approach>,
}

pub type AirportMap = BTreeMap<AirportCode, MergedAirport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_prefers_icao() {
        let code = AirportCode::derive(" ksea ", "SEA").unwrap();
        assert_eq!(code.as_str(), "KSEA");
    }

    #[test]
    fn code_falls_back_to_faa_id() {
        let code = AirportCode::derive("   ", "s43").unwrap();
        assert_eq!(code.as_str(), "S43");
        assert!(AirportCode::derive("", " ").is_none());
    }

    #[test]
    fn blank_site_number() {
        assert!(SiteNumber::parse("  ").is_none());
        assert_eq!(SiteNumber::parse(" 26386.*A ").unwrap().as_str(), "26386.*A");
    }

    #[test]
    fn keys_display_as_stored() {
        let code = AirportCode::derive("", " s43").unwrap();
        assert_eq!(code.to_string(), "S43");
        assert_eq!(format!("{}", SiteNumber::parse(" 26386.*A").unwrap()), "26386.*A");
    }

    #[test]
    fn class_precedence() {
        assert!(AirspaceClass::B > AirspaceClass::C);
        assert!(AirspaceClass::C > AirspaceClass::D);
        assert!(AirspaceClass::D > AirspaceClass::E);
        assert!(AirspaceClass::E > AirspaceClass::G);
        assert_eq!(AirspaceClass::default(), AirspaceClass::G);
    }

    #[test]
    fn class_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&AirspaceClass::D).unwrap(), "\"D\"");
    }
}
