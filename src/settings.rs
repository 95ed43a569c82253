//! Run configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `AIRPORT_JSON_*` environment variables
//! (e.g. `AIRPORT_JSON_OUTPUT_DIR=out`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "airport_json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Parent of the extracted 28-day NASR subscription.
    pub data_root: PathBuf,
    /// NASR effective date, used to locate the CSV directory.
    pub effective_date: NaiveDate,
    /// Overrides the directory derived from `data_root` and `effective_date`.
    pub nasr_csv_dir: Option<PathBuf>,
    pub base_file: String,
    pub runway_file: String,
    pub airspace_file: String,

    pub output_dir: PathBuf,
    pub output_file: String,
    pub output_mini_file: Option<String>,
    pub cycle_file: String,

    pub airport_site_type: String,
    pub closed_runway_marker: String,
    pub unknown_condition: String,

    pub dtpp_enabled: bool,
    pub dtpp_index_url: String,
    pub dtpp_metafile_url: String,
    pub dtpp_metafile_path: Option<PathBuf>,
    pub dtpp_pdf_base_url: String,
    pub fallback_cycle: String,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_root: PathBuf::from("data"),
            effective_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap_or_default(),
            nasr_csv_dir: None,
            base_file: "APT_BASE.csv".into(),
            runway_file: "APT_RWY.csv".into(),
            airspace_file: "CLS_ARSP.csv".into(),
            output_dir: PathBuf::from("json_data"),
            output_file: "airport_base_info_with_runways_airspace.json".into(),
            output_mini_file: Some("airport_base_info_with_runways_airspace_mini.json".into()),
            cycle_file: "dtpp_cycle.txt".into(),
            airport_site_type: "A".into(),
            closed_runway_marker: "X".into(),
            unknown_condition: "Unknown Condition".into(),
            dtpp_enabled: true,
            dtpp_index_url:
                "https://www.faa.gov/air_traffic/flight_info/aeronav/digital_products/dtpp/".into(),
            dtpp_metafile_url: "https://aeronav.faa.gov/d-tpp/{cycle}/xml_data/d-TPP_Metafile.xml"
                .into(),
            dtpp_metafile_path: None,
            dtpp_pdf_base_url: "https://aeronav.faa.gov/d-tpp/{cycle}/".into(),
            fallback_cycle: "2503".into(),
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("AIRPORT_JSON"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Directory holding the NASR CSV tables, e.g.
    /// `data/28DaySubscription_Effective_2025-03-20/CSV_Data/20_Mar_2025_CSV`.
    pub fn csv_dir(&self) -> PathBuf {
        if let Some(dir) = &self.nasr_csv_dir {
            return dir.clone();
        }
        let date = self.effective_date;
        self.data_root
            .join(format!("28DaySubscription_Effective_{}", date.format("%Y-%m-%d")))
            .join("CSV_Data")
            .join(format!("{}_CSV", date.format("%d_%b_%Y")))
    }

    pub fn base_path(&self) -> PathBuf {
        self.csv_dir().join(&self.base_file)
    }

    pub fn runway_path(&self) -> PathBuf {
        self.csv_dir().join(&self.runway_file)
    }

    pub fn airspace_path(&self) -> PathBuf {
        self.csv_dir().join(&self.airspace_file)
    }
}
