// Worker-thread HTTP: the place feed fetch and the IP-based locate lookup.
// Both run once per request on their own thread and report over a channel
// polled from the update loop. No retry; failure is surfaced as a message.

use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use crossbeam_channel::{Receiver, bounded};
use serde_json::Value;

use crate::place::Place;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const LOCATE_TIMEOUT: Duration = Duration::from_secs(10);
const LOCATE_URL: &str = "http://ip-api.com/json";

/// Fetch and parse the place feed. A non-2xx status or a body that is not a
/// JSON array is a load failure for this session.
pub fn fetch_places(url: &str) -> anyhow::Result<Vec<Place>> {
    let client = reqwest::blocking::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let response = client.get(url).send().with_context(|| format!("GET {}", url))?;

    if !response.status().is_success() {
        bail!("Failed to fetch places: {}", response.status());
    }

    let body: Value = response.json().context("Malformed places JSON")?;
    let Some(items) = body.as_array() else {
        bail!("Places response is not an array");
    };

    Ok(items.iter().map(Place::from_value).collect())
}

/// Kick off the feed fetch on a worker thread.
pub fn spawn_fetch(url: String) -> Receiver<Result<Vec<Place>, String>> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let result = fetch_places(&url).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });
    rx
}

/// Approximate device location via IP geolocation. The desktop stand-in for
/// the browser geolocation API: single request, fixed timeout, no retry.
pub fn spawn_locate() -> Receiver<Result<(f64, f64), String>> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let result = locate().map_err(|e| e.to_string());
        let _ = tx.send(result);
    });
    rx
}

fn locate() -> anyhow::Result<(f64, f64)> {
    let client = reqwest::blocking::Client::builder().timeout(LOCATE_TIMEOUT).build()?;
    let response = client.get(LOCATE_URL).send().context("Location lookup failed")?;

    if !response.status().is_success() {
        bail!("Location lookup failed: {}", response.status());
    }

    let body: Value = response.json().context("Malformed location response")?;
    let lat = body.get("lat").and_then(Value::as_f64);
    let lon = body.get("lon").and_then(Value::as_f64);
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => bail!("Location response missing coordinates"),
    }
}
