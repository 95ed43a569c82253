pub mod fetch;
pub mod metafile;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::metrics::StageStats;
use crate::model::{AirportCode, Approach, ApproachIndex};
use crate::settings::Settings;
use crate::utils::with_cycle;
use metafile::Metafile;

/// Chart code of instrument approach procedures.
pub const IAP_CHART_CODE: &str = "IAP";

/// Builds the approach-plate lookup from a parsed metafile.
pub struct ApproachIndexer {
    pdf_base: String,
}

impl ApproachIndexer {
    /// `pdf_base` is prepended verbatim to every `pdf_name`.
    pub fn new(pdf_base: impl Into<String>) -> Self {
        ApproachIndexer {
            pdf_base: pdf_base.into(),
        }
    }

    pub fn for_cycle(settings: &Settings, cycle: &str) -> Self {
        Self::new(with_cycle(&settings.dtpp_pdf_base_url, cycle))
    }

    /// Key each airport by ICAO id, falling back to the FAA id, and keep its
    /// IAP charts. Airports without any IAP chart are left out.
    pub fn index(&self, meta: Metafile) -> (ApproachIndex, StageStats) {
        let mut stats = StageStats::default();
        let mut index = ApproachIndex::new();
        for airport in meta.airports {
            stats.read += airport.records.len();
            let Some(code) = AirportCode::derive(&airport.icao_ident, &airport.apt_ident) else {
                continue;
            };
            let approaches: Vec<Approach> = airport
                .records
                .into_iter()
                .filter(|r| r.chart_code.eq_ignore_ascii_case(IAP_CHART_CODE))
                .map(|r| Approach {
                    pdf_url: format!("{}{}", self.pdf_base, r.pdf_name),
                    chart_name: r.chart_name,
                    procuid: r.procuid,
                    amdtnum: r.amdtnum,
                    amdtdate: r.amdtdate,
                })
                .collect();
            if approaches.is_empty() {
                debug!(code = %code, alnum = %airport.alnum, "no instrument approaches");
                continue;
            }
            stats.kept += approaches.len();
            index.insert(code, approaches);
        }
        (index, stats)
    }
}

/// Approach plates for one run.
pub struct Approaches {
    pub index: ApproachIndex,
    /// Publication cycle reported for the run.
    pub cycle: String,
    pub stats: StageStats,
}

impl Approaches {
    fn unavailable(cycle: &str) -> Self {
        Approaches {
            index: ApproachIndex::new(),
            cycle: cycle.to_string(),
            stats: StageStats::default(),
        }
    }
}

/// Load and index the metafile. Never fails: any retrieval or parse problem
/// yields an empty index and the fallback cycle.
pub fn load(settings: &Settings, offline: bool) -> Approaches {
    let fallback = settings.fallback_cycle.as_str();
    if !settings.dtpp_enabled {
        info!("Approach plates disabled");
        return Approaches::unavailable(fallback);
    }

    let (xml, cycle) = match read_metafile(settings, offline) {
        Ok(Some(found)) => found,
        Ok(None) => {
            info!("Offline with no local metafile; skipping approach plates");
            return Approaches::unavailable(fallback);
        }
        Err(e) => {
            warn!("Approach plates unavailable: {:#}", e);
            return Approaches::unavailable(fallback);
        }
    };

    let meta = match metafile::parse(&xml) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("Failed to parse d-TPP metafile: {:#}", e);
            return Approaches::unavailable(fallback);
        }
    };

    let cycle = meta.cycle.clone().unwrap_or(cycle);
    let (index, stats) = ApproachIndexer::for_cycle(settings, &cycle).index(meta);
    info!("Indexed approaches for {} airports (cycle {})", index.len(), cycle);
    Approaches {
        index,
        cycle,
        stats,
    }
}

/// Metafile text plus the cycle it was requested for.
fn read_metafile(settings: &Settings, offline: bool) -> Result<Option<(String, String)>> {
    if let Some(path) = &settings.dtpp_metafile_path {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Some((xml, settings.fallback_cycle.clone())));
    }
    if offline {
        return Ok(None);
    }

    let client = fetch::client(settings.http_timeout_secs)?;
    let cycle = fetch::discover_cycle(&client, &settings.dtpp_index_url, &settings.fallback_cycle);
    let url = with_cycle(&settings.dtpp_metafile_url, &cycle);
    let xml = fetch::fetch_metafile(&client, &url)?;
    Ok(Some((xml, cycle)))
}

#[cfg(test)]
mod tests {
    use super::metafile::{ChartRecord, MetaAirport};
    use super::*;
    use std::path::PathBuf;

    fn chart(code: &str, name: &str, pdf: &str) -> ChartRecord {
        ChartRecord {
            chart_code: code.into(),
            chart_name: name.into(),
            pdf_name: pdf.into(),
            ..ChartRecord::default()
        }
    }

    fn airport(apt: &str, icao: &str, records: Vec<ChartRecord>) -> MetaAirport {
        MetaAirport {
            apt_ident: apt.into(),
            icao_ident: icao.into(),
            alnum: String::new(),
            records,
        }
    }

    fn code(s: &str) -> AirportCode {
        AirportCode::derive(s, "").unwrap()
    }

    #[test]
    fn keeps_only_iap_charts() {
        let meta = Metafile {
            cycle: None,
            airports: vec![airport(
                "SEA",
                "KSEA",
                vec![
                    chart("APD", "AIRPORT DIAGRAM", "00582AD.PDF"),
                    chart("IAP", "ILS OR LOC RWY 16L", "00582IL16L.PDF"),
                    chart("DP", "HAROB SIX", "00582HAROB.PDF"),
                ],
            )],
        };
        let (index, stats) = ApproachIndexer::new("https://aeronav.faa.gov/d-tpp/2503/").index(meta);
        let sea = &index[&code("KSEA")];
        assert_eq!(sea.len(), 1);
        assert_eq!(sea[0].chart_name, "ILS OR LOC RWY 16L");
        assert_eq!(sea[0].pdf_url, "https://aeronav.faa.gov/d-tpp/2503/00582IL16L.PDF");
        assert_eq!(sea[0].procuid, "");
        assert_eq!(stats, StageStats { read: 3, kept: 1 });
    }

    #[test]
    fn keys_on_faa_id_without_icao() {
        let meta = Metafile {
            cycle: None,
            airports: vec![airport("0s9", "", vec![chart("IAP", "RNAV (GPS) RWY 27", "05457R27.PDF")])],
        };
        let (index, _) = ApproachIndexer::new("base/").index(meta);
        assert!(index.contains_key(&code("0S9")));
    }

    #[test]
    fn airports_without_approaches_are_omitted() {
        let meta = Metafile {
            cycle: None,
            airports: vec![
                airport("S43", "", vec![chart("APD", "AIRPORT DIAGRAM", "x.PDF")]),
                airport("E01", "", vec![]),
                airport("", "", vec![chart("IAP", "VOR-A", "y.PDF")]),
            ],
        };
        let (index, _) = ApproachIndexer::new("base/").index(meta);
        assert!(index.is_empty());
    }

    #[test]
    fn local_metafile_sets_cycle_from_document() {
        let settings = Settings {
            dtpp_metafile_path: Some(PathBuf::from("tests/fixtures/d-TPP_Metafile.xml")),
            fallback_cycle: "2401".into(),
            ..Settings::default()
        };
        let approaches = load(&settings, true);
        assert_eq!(approaches.cycle, "2503");
        let sea = &approaches.index[&code("KSEA")];
        assert_eq!(sea.len(), 2);
        assert!(sea[0].pdf_url.starts_with("https://aeronav.faa.gov/d-tpp/2503/"));
    }

    #[test]
    fn unreadable_metafile_degrades_to_fallback() {
        let settings = Settings {
            dtpp_metafile_path: Some(PathBuf::from("tests/fixtures/missing.xml")),
            fallback_cycle: "2401".into(),
            ..Settings::default()
        };
        let approaches = load(&settings, true);
        assert!(approaches.index.is_empty());
        assert_eq!(approaches.cycle, "2401");
    }

    #[test]
    fn unparseable_metafile_degrades_to_fallback() {
        let settings = Settings {
            dtpp_metafile_path: Some(PathBuf::from("tests/fixtures/broken_metafile.xml")),
            ..Settings::default()
        };
        let approaches = load(&settings, true);
        assert!(approaches.index.is_empty());
        assert_eq!(approaches.cycle, settings.fallback_cycle);
    }

    #[test]
    fn offline_without_local_file_is_empty() {
        let approaches = load(&Settings::default(), true);
        assert!(approaches.index.is_empty());
        assert_eq!(approaches.cycle, "2503");
    }

    #[test]
    fn disabled_is_empty() {
        let settings = Settings {
            dtpp_enabled: false,
            dtpp_metafile_path: Some(PathBuf::from("tests/fixtures/d-TPP_Metafile.xml")),
            ..Settings::default()
        };
        assert!(load(&settings, false).index.is_empty());
    }
}
