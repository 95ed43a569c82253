use std::path::Path;

use serde::Deserialize;

use super::read_table;
use crate::error::SourceError;
use crate::metrics::StageStats;
use crate::model::{Airspace, AirspaceClass, AirspaceIndex, SiteNumber};

const REQUIRED: &[&str] = &[
    "SITE_NO",
    "CLASS_B_AIRSPACE",
    "CLASS_C_AIRSPACE",
    "CLASS_D_AIRSPACE",
    "CLASS_E_AIRSPACE",
];

/// One row of `CLS_ARSP.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirspaceRow {
    #[serde(rename = "SITE_NO")]
    pub site_no: String,
    #[serde(rename = "CLASS_B_AIRSPACE")]
    pub class_b: String,
    #[serde(rename = "CLASS_C_AIRSPACE")]
    pub class_c: String,
    #[serde(rename = "CLASS_D_AIRSPACE")]
    pub class_d: String,
    #[serde(rename = "CLASS_E_AIRSPACE")]
    pub class_e: String,
    #[serde(rename = "REMARK")]
    pub remark: String,
}

impl AirspaceRow {
    /// The most restrictive class this row asserts.
    pub fn class(&self) -> AirspaceClass {
        let flag = |v: &str| v.trim().eq_ignore_ascii_case("Y");
        if flag(&self.class_b) {
            AirspaceClass::B
        } else if flag(&self.class_c) {
            AirspaceClass::C
        } else if flag(&self.class_d) {
            AirspaceClass::D
        } else if flag(&self.class_e) {
            AirspaceClass::E
        } else {
            AirspaceClass::G
        }
    }
}

pub fn load(path: &Path) -> Result<(AirspaceIndex, StageStats), SourceError> {
    let table = read_table::<AirspaceRow>(path, REQUIRED)?;
    let (index, mut stats) = classify(table.rows);
    stats.read += table.malformed;
    Ok((index, stats))
}

/// Reduce rows to one `Airspace` per site.
///
/// The class is the highest asserted by any of the site's rows. The remark
/// always comes from the site's last row, whichever row set the class.
pub fn classify(rows: impl IntoIterator<Item = AirspaceRow>) -> (AirspaceIndex, StageStats) {
    let mut stats = StageStats::default();
    let mut index = AirspaceIndex::new();
    for row in rows {
        stats.read += 1;
        let Some(site_no) = SiteNumber::parse(&row.site_no) else {
            continue;
        };
        stats.kept += 1;
        let class = row.class();
        let entry = index.entry(site_no).or_insert_with(Airspace::default);
        if class > entry.class {
            entry.class = class;
        }
        entry.remark = row.remark.trim().to_string();
    }
    (index, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(site: &str, tier: char, remark: &str) -> AirspaceRow {
        let yn = |c: char| if tier == c { "Y" } else { "N" }.to_string();
        AirspaceRow {
            site_no: site.into(),
            class_b: yn('B'),
            class_c: yn('C'),
            class_d: yn('D'),
            class_e: yn('E'),
            remark: remark.into(),
        }
    }

    fn site(s: &str) -> SiteNumber {
        SiteNumber::parse(s).unwrap()
    }

    #[test]
    fn row_class_picks_most_restrictive_flag() {
        let mut r = row("1", 'E', "");
        r.class_c = "Y".into();
        assert_eq!(r.class(), AirspaceClass::C);
        assert_eq!(row("1", 'G', "").class(), AirspaceClass::G);
        assert_eq!(row("1", 'B', "").class(), AirspaceClass::B);
    }

    #[test]
    fn highest_class_wins_last_remark_wins() {
        let (index, _) = classify(vec![
            row("1", 'E', "from E"),
            row("1", 'B', "from B"),
            row("1", 'C', "from C"),
        ]);
        let a = &index[&site("1")];
        assert_eq!(a.class, AirspaceClass::B);
        assert_eq!(a.remark, "from C");
    }

    #[test]
    fn blank_remark_on_last_row_clears_remark() {
        let (index, _) = classify(vec![row("1", 'D', "tower hours"), row("1", 'E', "")]);
        let a = &index[&site("1")];
        assert_eq!(a.class, AirspaceClass::D);
        assert_eq!(a.remark, "");
    }

    #[test]
    fn sites_are_independent() {
        let (index, stats) = classify(vec![
            row("1", 'C', "one"),
            row("2", 'G', "two"),
            row("", 'B', "orphan"),
        ]);
        assert_eq!(index[&site("1")].class, AirspaceClass::C);
        assert_eq!(index[&site("2")].class, AirspaceClass::G);
        assert_eq!(index.len(), 2);
        assert_eq!(stats, StageStats { read: 3, kept: 2 });
    }

    #[test]
    fn loads_fixture() {
        let (index, _) = load(Path::new("tests/fixtures/CLS_ARSP.csv")).unwrap();
        let sea = &index[&site("26386.*A")];
        assert_eq!(sea.class, AirspaceClass::B);
        assert_eq!(sea.remark, "CLASS C SHELF");
        assert!(!index.contains_key(&site("100")));
    }
}
