use std::path::Path;

use serde::Deserialize;

use super::read_table;
use crate::error::SourceError;
use crate::metrics::StageStats;
use crate::model::{AirportCode, AirportRecord, SiteNumber};
use crate::settings::Settings;
use crate::utils::parse_coordinate;

const REQUIRED: &[&str] = &[
    "SITE_TYPE_CODE",
    "ICAO_ID",
    "ARPT_ID",
    "LAT_DECIMAL",
    "LONG_DECIMAL",
    "SITE_NO",
];

/// One row of `APT_BASE.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaseRow {
    #[serde(rename = "SITE_TYPE_CODE")]
    pub site_type: String,
    #[serde(rename = "ICAO_ID")]
    pub icao_id: String,
    #[serde(rename = "ARPT_ID")]
    pub arpt_id: String,
    #[serde(rename = "LAT_DECIMAL")]
    pub lat: String,
    #[serde(rename = "LONG_DECIMAL")]
    pub lon: String,
    #[serde(rename = "SITE_NO")]
    pub site_no: String,
    #[serde(rename = "CITY")]
    pub city: String,
    #[serde(rename = "STATE_CODE")]
    pub state: String,
    #[serde(rename = "COUNTRY_CODE")]
    pub country: String,
    #[serde(rename = "ARPT_NAME")]
    pub name: String,
}

/// Filters the NASR base table down to usable airport facilities.
pub struct AirportLoader {
    site_type: String,
}

impl AirportLoader {
    pub fn new(site_type: &str) -> Self {
        AirportLoader {
            site_type: site_type.trim().to_uppercase(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.airport_site_type)
    }

    /// Load and filter the base table. Fails if nothing survives.
    pub fn load(&self, path: &Path) -> Result<(Vec<AirportRecord>, StageStats), SourceError> {
        let table = read_table::<BaseRow>(path, REQUIRED)?;
        let (airports, mut stats) = self.collect(table.rows);
        stats.read += table.malformed;
        if airports.is_empty() {
            return Err(SourceError::NoAirports {
                path: path.to_path_buf(),
            });
        }
        Ok((airports, stats))
    }

    /// Order-preserving filter. Duplicate codes are kept; the merge resolves them.
    pub fn collect(&self, rows: impl IntoIterator<Item = BaseRow>) -> (Vec<AirportRecord>, StageStats) {
        let mut stats = StageStats::default();
        let mut airports = Vec::new();
        for row in rows {
            stats.read += 1;
            if let Some(airport) = self.convert(row) {
                airports.push(airport);
            }
        }
        stats.kept = airports.len();
        (airports, stats)
    }

    fn convert(&self, row: BaseRow) -> Option<AirportRecord> {
        if !row.site_type.trim().eq_ignore_ascii_case(&self.site_type) {
            return None;
        }
        let code = AirportCode::derive(&row.icao_id, &row.arpt_id)?;
        let lat = parse_coordinate(&row.lat)?;
        let lon = parse_coordinate(&row.lon)?;
        let site_no = SiteNumber::parse(&row.site_no)?;

        Some(AirportRecord {
            site_no,
            code,
            lat,
            lon,
            city: row.city.trim().to_string(),
            state: row.state.trim().to_string(),
            country: row.country.trim().to_string(),
            name: row.name.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(site_type: &str, icao: &str, arpt: &str, site: &str, lat: &str, lon: &str) -> BaseRow {
        BaseRow {
            site_type: site_type.into(),
            icao_id: icao.into(),
            arpt_id: arpt.into(),
            site_no: site.into(),
            lat: lat.into(),
            lon: lon.into(),
            ..BaseRow::default()
        }
    }

    #[test]
    fn keeps_only_airports() {
        let loader = AirportLoader::new("A");
        let (airports, stats) = loader.collect(vec![
            row("A", "KBFI", "BFI", "1", "47.5", "-122.3"),
            row("H", "", "0WA1", "2", "47.6", "-122.3"),
            row("a", "", "S43", "3", "47.9", "-122.1"),
            row("S", "", "W36", "4", "47.0", "-122.0"),
        ]);
        let codes: Vec<&str> = airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["KBFI", "S43"]);
        assert_eq!(stats, StageStats { read: 4, kept: 2 });
    }

    #[test]
    fn code_falls_back_to_facility_id() {
        let loader = AirportLoader::new("A");
        let (airports, _) = loader.collect(vec![row("A", "  ", " abc ", "100", "47.1", "-122.2")]);
        assert_eq!(airports[0].code.as_str(), "ABC");
        assert_eq!(airports[0].site_no.as_str(), "100");
        assert_eq!(airports[0].lat, 47.1);
        assert_eq!(airports[0].lon, -122.2);
    }

    #[test]
    fn drops_rows_missing_required_fields() {
        let loader = AirportLoader::new("A");
        let (airports, stats) = loader.collect(vec![
            row("A", "", "", "1", "47.1", "-122.2"),
            row("A", "KAAA", "AAA", "", "47.1", "-122.2"),
            row("A", "KBBB", "BBB", "3", "", "-122.2"),
            row("A", "KCCC", "CCC", "4", "47.1", "west"),
        ]);
        assert!(airports.is_empty());
        assert_eq!(stats.dropped(), 4);
    }

    #[test]
    fn duplicate_codes_are_not_deduplicated() {
        let loader = AirportLoader::new("A");
        let (airports, _) = loader.collect(vec![
            row("A", "KDUP", "D1", "1", "10.0", "10.0"),
            row("A", "KDUP", "D2", "2", "20.0", "20.0"),
        ]);
        assert_eq!(airports.len(), 2);
        assert_eq!(airports[1].site_no.as_str(), "2");
    }

    #[test]
    fn loads_fixture() {
        let loader = AirportLoader::new("A");
        let (airports, stats) = loader.load(Path::new("tests/fixtures/APT_BASE.csv")).unwrap();
        let codes: Vec<&str> = airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["KSEA", "ABC", "KBFI", "S43", "KDUP", "KDUP"]);
        assert_eq!(stats.read, 10);
        let sea = &airports[0];
        assert_eq!(sea.city, "SEATTLE");
        assert_eq!(sea.state, "WA");
        assert_eq!(sea.country, "US");
        assert_eq!(sea.name, "SEATTLE-TACOMA INTL");
    }

    #[test]
    fn no_survivors_is_fatal() {
        let loader = AirportLoader::new("Z");
        let err = loader.load(Path::new("tests/fixtures/APT_BASE.csv")).unwrap_err();
        assert!(matches!(err, SourceError::NoAirports { .. }));
    }
}
