use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::blocking::Client;
use tracing::{info, warn};

/// Blocking client shared by cycle discovery and the metafile download.
/// Requests are not retried.
pub fn client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("airport_json/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Current d-TPP cycle as published on the FAA product page, or `fallback`.
pub fn discover_cycle(client: &Client, index_url: &str, fallback: &str) -> String {
    info!("Discovering d-TPP cycle: {}", index_url);
    let page = client
        .get(index_url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text());

    match page {
        Ok(html) => match find_cycle(&html) {
            Some(cycle) => {
                info!("Current d-TPP cycle: {}", cycle);
                cycle
            }
            None => {
                warn!("No cycle found on {}, using fallback {}", index_url, fallback);
                fallback.to_string()
            }
        },
        Err(e) => {
            warn!("Cycle discovery failed ({}), using fallback {}", e, fallback);
            fallback.to_string()
        }
    }
}

/// First four-digit cycle id in a product page: either a `d-tpp/NNNN/` link
/// or a "Cycle NNNN" label.
fn find_cycle(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)(?:d-tpp/|cycle\W{0,3})(\d{4})\b").expect("valid cycle pattern")
    });
    re.captures(html).map(|caps| caps[1].to_string())
}

/// Download the metafile body.
pub fn fetch_metafile(client: &Client, url: &str) -> Result<String> {
    info!("Fetching d-TPP metafile: {}", url);
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Failed to fetch {}", url))?;

    let pb = ProgressBar::new(response.content_length().unwrap_or(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {bytes}/{total_bytes} ({bytes_per_sec})")?
            .progress_chars("=> "),
    );

    let mut body = String::new();
    pb.wrap_read(response)
        .read_to_string(&mut body)
        .with_context(|| format!("Failed to read {}", url))?;
    pb.finish_and_clear();

    info!("Metafile size: {} bytes", body.len());
    Ok(body)
}
