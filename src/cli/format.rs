//! Output formatting for CLI display.

use serde::Serialize;
use trailmap::model::{Hop, Trail};
use trailmap::{EngineError, Reconstruction};

/// A trail as printed, optionally with its hops.
#[derive(Serialize)]
struct TrailView<'a> {
    #[serde(flatten)]
    trail: &'a Trail,

    #[serde(skip_serializing_if = "Option::is_none")]
    hops: Option<Vec<Hop>>,
}

/// Render trails as a pretty JSON array.
pub(super) fn render_trails(trails: &[Trail], hops: bool) -> Result<String, String> {
    let views: Vec<TrailView<'_>> = trails
        .iter()
        .map(|trail| TrailView {
            trail,
            hops: hops.then(|| trail.hops()),
        })
        .collect();
    serde_json::to_string_pretty(&views).map_err(|e| format!("failed to serialize trails: {e}"))
}

/// A single structured error body: `{"error": ..., "kind": ...}`.
pub(super) fn error_json(err: &EngineError) -> String {
    serde_json::json!({
        "error": err.to_string(),
        "kind": err.kind(),
    })
    .to_string()
}

/// One-line human summary of a run.
pub(super) fn summarize(result: &Reconstruction, shown: usize, total: usize) -> String {
    let trails = if shown == total {
        plural(total, "trail")
    } else {
        format!("{shown} of {}", plural(total, "trail"))
    };
    let mut line = format!("{trails} from {}", plural(result.records, "record"));
    if result.skipped > 0 {
        line.push_str(&format!(" ({} skipped)", plural(result.skipped, "visit")));
    }
    line
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
