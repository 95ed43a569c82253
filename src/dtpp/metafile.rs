//! Reader for the d-TPP metafile (`d-TPP_Metafile.xml`).
//!
//! Layout: `digital_tpp[cycle]` > `state_code` > `city_name` >
//! `airport_name[apt_ident, icao_ident, alnum]` > `record` with one child
//! element per field. Only the fields the indexer uses are kept.

use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

#[derive(Debug, Default)]
pub struct Metafile {
    /// `cycle` attribute of the root element, e.g. "2503".
    pub cycle: Option<String>,
    pub airports: Vec<MetaAirport>,
}

#[derive(Debug, Default, Clone)]
pub struct MetaAirport {
    pub apt_ident: String,
    pub icao_ident: String,
    pub alnum: String,
    pub records: Vec<ChartRecord>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChartRecord {
    pub chart_code: String,
    pub chart_name: String,
    pub pdf_name: String,
    pub procuid: String,
    pub amdtnum: String,
    pub amdtdate: String,
}

impl ChartRecord {
    fn field_mut(&mut self, name: &[u8]) -> Option<&mut String> {
        match name {
            b"chart_code" => Some(&mut self.chart_code),
            b"chart_name" => Some(&mut self.chart_name),
            b"pdf_name" => Some(&mut self.pdf_name),
            b"procuid" => Some(&mut self.procuid),
            b"amdtnum" => Some(&mut self.amdtnum),
            b"amdtdate" => Some(&mut self.amdtdate),
            _ => None,
        }
    }

    fn trim_fields(&mut self) {
        for field in [
            &mut self.chart_code,
            &mut self.chart_name,
            &mut self.pdf_name,
            &mut self.procuid,
            &mut self.amdtnum,
            &mut self.amdtdate,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }
}

/// Parse a whole metafile document.
pub fn parse(xml: &str) -> Result<Metafile> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut meta = Metafile::default();
    let mut airport: Option<MetaAirport> = None;
    let mut record: Option<ChartRecord> = None;
    let mut field: Option<Vec<u8>> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"digital_tpp" => meta.cycle = Some(attr(&e, "cycle")?).filter(|c| !c.is_empty()),
                b"airport_name" => airport = Some(open_airport(&e)?),
                b"record" if airport.is_some() => record = Some(ChartRecord::default()),
                name if record.is_some() => {
                    field = Some(name.to_vec());
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"digital_tpp" => meta.cycle = Some(attr(&e, "cycle")?).filter(|c| !c.is_empty()),
                b"airport_name" => meta.airports.push(open_airport(&e)?),
                _ => {}
            },
            Ok(Event::Text(e)) if field.is_some() => match e.unescape() {
                Ok(t) => text.push_str(&t),
                Err(err) => {
                    warn!("Keeping raw text at byte {}: {}", reader.buffer_position(), err);
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            },
            Ok(Event::CData(e)) if field.is_some() => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"record" => {
                    if let (Some(mut r), Some(a)) = (record.take(), airport.as_mut()) {
                        r.trim_fields();
                        a.records.push(r);
                    }
                }
                b"airport_name" => {
                    if let Some(a) = airport.take() {
                        meta.airports.push(a);
                    }
                }
                name => {
                    if field.as_deref() == Some(name) {
                        if let Some(slot) = record.as_mut().and_then(|r| r.field_mut(name)) {
                            *slot = std::mem::take(&mut text);
                        }
                        field = None;
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(meta)
}

fn open_airport(e: &BytesStart) -> Result<MetaAirport> {
    Ok(MetaAirport {
        apt_ident: attr(e, "apt_ident")?,
        icao_ident: attr(e, "icao_ident")?,
        alnum: attr(e, "alnum")?,
        records: Vec::new(),
    })
}

/// Trimmed attribute value, or "" when absent.
fn attr(e: &BytesStart, name: &str) -> Result<String> {
    Ok(match e.try_get_attribute(name)? {
        Some(a) => a.unescape_value()?.trim().to_string(),
        None => String::new(),
    })
}
