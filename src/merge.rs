use crate::model::{
    AirportMap, AirportRecord, Airspace, AirspaceIndex, ApproachIndex, MergedAirport, RunwayIndex,
};

/// Output of the merge pass.
#[derive(Debug, Default)]
pub struct Merged {
    pub airports: AirportMap,
    /// Airports (in input order, before key collisions) with at least one approach.
    pub with_approaches: usize,
    pub without_approaches: usize,
}

/// The read-only lookup tables produced by the leaf stages.
pub struct Lookups<'a> {
    pub runways: &'a RunwayIndex,
    pub airspace: &'a AirspaceIndex,
    pub approaches: &'a ApproachIndex,
}

/// Join every airport with its runways and airspace (by site number) and its
/// approach plates (by airport code). A later airport with the same code
/// replaces an earlier one.
pub fn merge(airports: &[AirportRecord], lookups: &Lookups) -> Merged {
    let mut merged = Merged::default();
    for airport in airports {
        let runways = lookups
            .runways
            .get(&airport.site_no)
            .cloned()
            .unwrap_or_default();
        let airspace = lookups
            .airspace
            .get(&airport.site_no)
            .cloned()
            .unwrap_or_else(Airspace::default);
        let approaches = lookups
            .approaches
            .get(&airport.code)
            .cloned()
            .unwrap_or_default();

        if approaches.is_empty() {
            merged.without_approaches += 1;
        } else {
            merged.with_approaches += 1;
        }

        merged.airports.insert(
            airport.code.clone(),
            MergedAirport {
                site_no: airport.site_no.clone(),
                lat: airport.lat,
                lon: airport.lon,
                city: airport.city.clone(),
                state: airport.state.clone(),
                country: airport.country.clone(),
                airport_name: airport.name.clone(),
                runways,
                airspace: airspace.class,
                remarks: airspace.remark,
                approaches,
            },
        );
    }
    merged
}
