use std::path::Path;

use serde::Deserialize;

use super::read_table;
use crate::error::SourceError;
use crate::metrics::StageStats;
use crate::model::{Runway, RunwayIndex, SiteNumber};
use crate::settings::Settings;
use crate::utils::normalize_code;

const REQUIRED: &[&str] = &["SITE_NO", "RWY_ID", "RWY_LEN"];

/// One row of `APT_RWY.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunwayRow {
    #[serde(rename = "SITE_NO")]
    pub site_no: String,
    #[serde(rename = "RWY_ID")]
    pub rwy_id: String,
    #[serde(rename = "RWY_LEN")]
    pub length: String,
    #[serde(rename = "RWY_WIDTH")]
    pub width: String,
    #[serde(rename = "SURFACE_TYPE_CODE")]
    pub surface: String,
    #[serde(rename = "COND")]
    pub condition: String,
}

/// Groups usable runways by site, in table order.
pub struct RunwayAggregator {
    closed_marker: String,
    unknown_condition: String,
}

impl RunwayAggregator {
    pub fn new(closed_marker: &str, unknown_condition: &str) -> Self {
        RunwayAggregator {
            closed_marker: closed_marker.to_string(),
            unknown_condition: unknown_condition.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.closed_runway_marker, &settings.unknown_condition)
    }

    pub fn load(&self, path: &Path) -> Result<(RunwayIndex, StageStats), SourceError> {
        let table = read_table::<RunwayRow>(path, REQUIRED)?;
        let (index, mut stats) = self.collect(table.rows);
        stats.read += table.malformed;
        Ok((index, stats))
    }

    pub fn collect(&self, rows: impl IntoIterator<Item = RunwayRow>) -> (RunwayIndex, StageStats) {
        let mut stats = StageStats::default();
        let mut index = RunwayIndex::new();
        for row in rows {
            stats.read += 1;
            let Some(site_no) = SiteNumber::parse(&row.site_no) else {
                continue;
            };
            let Some(runway) = self.convert(row) else {
                continue;
            };
            stats.kept += 1;
            index.entry(site_no).or_default().push(runway);
        }
        (index, stats)
    }

    fn convert(&self, row: RunwayRow) -> Option<Runway> {
        let rwy_id = row.rwy_id.trim();
        if !self.closed_marker.is_empty() && rwy_id.contains(self.closed_marker.as_str()) {
            return None;
        }
        let length = row.length.trim();
        if length.is_empty() || length == "0" {
            return None;
        }

        let mut condition = normalize_code(&row.condition);
        if condition.is_empty() {
            condition = self.unknown_condition.clone();
        }

        Some(Runway {
            rwy_id: rwy_id.to_string(),
            length: length.to_string(),
            width: row.width.trim().to_string(),
            surface: normalize_code(&row.surface),
            condition,
        })
    }
}
