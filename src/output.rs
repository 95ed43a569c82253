use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::model::AirportMap;

/// Where to write one run's artifacts.
pub struct OutputPlan<'a> {
    pub dir: &'a Path,
    pub file: &'a str,
    pub mini_file: Option<&'a str>,
    pub cycle_file: &'a str,
}

/// Paths actually written.
#[derive(Debug)]
pub struct Written {
    pub pretty: PathBuf,
    pub mini: Option<PathBuf>,
    pub cycle: PathBuf,
}

/// Writes every artifact under a temporary name first and renames them into
/// place only once all have been written, so a failed run leaves the
/// previous outputs untouched.
pub fn write_outputs(plan: &OutputPlan, airports: &AirportMap, cycle: &str) -> Result<Written> {
    fs::create_dir_all(plan.dir)
        .with_context(|| format!("Failed to create {}", plan.dir.display()))?;

    let pretty = plan.dir.join(plan.file);
    let mini = plan.mini_file.map(|name| plan.dir.join(name));
    let cycle_path = plan.dir.join(plan.cycle_file);

    let mut staged: Vec<(PathBuf, &Path)> = Vec::new();
    let result = stage_all(&mut staged, &pretty, mini.as_deref(), &cycle_path, airports, cycle)
        .and_then(|()| {
            for (tmp, dest) in &staged {
                fs::rename(tmp, dest).with_context(|| {
                    format!("Failed to move {} to {}", tmp.display(), dest.display())
                })?;
            }
            Ok(())
        });
    if let Err(e) = result {
        for (tmp, _) in &staged {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }

    info!("Wrote {} airports to {}", airports.len(), pretty.display());
    Ok(Written {
        pretty,
        mini,
        cycle: cycle_path,
    })
}

fn stage_all<'a>(
    staged: &mut Vec<(PathBuf, &'a Path)>,
    pretty: &'a Path,
    mini: Option<&'a Path>,
    cycle_path: &'a Path,
    airports: &AirportMap,
    cycle: &str,
) -> Result<()> {
    let tmp = temp_path(pretty);
    staged.push((tmp.clone(), pretty));
    write_json(&tmp, airports, true)?;

    if let Some(mini) = mini {
        let tmp = temp_path(mini);
        staged.push((tmp.clone(), mini));
        write_json(&tmp, airports, false)?;
    }

    let tmp = temp_path(cycle_path);
    staged.push((tmp.clone(), cycle_path));
    fs::write(&tmp, format!("{}\n", cycle))
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    Ok(())
}

/// Sibling of `path` so the final rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_json(path: &Path, airports: &AirportMap, pretty: bool) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut w, airports)?;
    } else {
        serde_json::to_writer(&mut w, airports)?;
    }
    w.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
