use anyhow::Result;
use tracing::info;

use crate::dtpp;
use crate::loader::{airports::AirportLoader, airspace, runways::RunwayAggregator};
use crate::merge::{self, Lookups, Merged};
use crate::metrics::RunTracker;
use crate::output::{self, OutputPlan, Written};
use crate::settings::Settings;

pub struct RunOptions {
    /// Never touch the network.
    pub offline: bool,
    /// Skip the compact JSON artifact.
    pub no_mini: bool,
}

pub struct RunReport {
    pub merged: Merged,
    pub cycle: String,
    pub written: Written,
    pub tracker: RunTracker,
}

/// Leaf stages, merge, write. Source errors abort before anything is written.
pub fn run(settings: &Settings, opts: &RunOptions) -> Result<RunReport> {
    let mut tracker = RunTracker::new();
    info!("Reading NASR tables from {}", settings.csv_dir().display());

    let (airports, stats) = AirportLoader::from_settings(settings).load(&settings.base_path())?;
    tracker.record("airports", stats);

    let (runways, stats) = RunwayAggregator::from_settings(settings).load(&settings.runway_path())?;
    tracker.record("runways", stats);

    let (airspace, stats) = airspace::load(&settings.airspace_path())?;
    tracker.record("airspace", stats);

    let approaches = dtpp::load(settings, opts.offline);
    tracker.record("approaches", approaches.stats);

    let merged = merge::merge(
        &airports,
        &Lookups {
            runways: &runways,
            airspace: &airspace,
            approaches: &approaches.index,
        },
    );
    info!(
        airports = merged.airports.len(),
        with_approaches = merged.with_approaches,
        without_approaches = merged.without_approaches,
        "merge complete"
    );

    let plan = OutputPlan {
        dir: &settings.output_dir,
        file: &settings.output_file,
        mini_file: if opts.no_mini {
            None
        } else {
            settings.output_mini_file.as_deref()
        },
        cycle_file: &settings.cycle_file,
    };
    let written = output::write_outputs(&plan, &merged.airports, &approaches.cycle)?;

    Ok(RunReport {
        merged,
        cycle: approaches.cycle,
        written,
        tracker,
    })
}
