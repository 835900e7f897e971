// Writing the boards to the data directory: one JSON file per dataset plus
// an optional script that embeds everything for pages opened from disk.

use std::path::{Path, PathBuf};

use pitchlab_engine::leaderboard::Leaderboards;
use serde::Serialize;
use tracing::info;

use crate::config::OutputConfig;

pub const PITCH_LEADERBOARD_FILE: &str = "pitch_leaderboard.json";
pub const PITCHER_LEADERBOARD_FILE: &str = "pitcher_leaderboard.json";
pub const HITTER_LEADERBOARD_FILE: &str = "hitter_leaderboard.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const EMBEDDED_JS_FILE: &str = "data_embedded.js";

const EMBEDDED_HEADER: &str = "// Auto-generated by pitchlab. Do not edit.\n";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, OutputError> {
    serde_json::to_string(value).map_err(|e| OutputError::Json { what, source: e })
}

fn to_json_pretty<T: Serialize + ?Sized>(
    what: &'static str,
    value: &T,
) -> Result<String, OutputError> {
    serde_json::to_string_pretty(value).map_err(|e| OutputError::Json { what, source: e })
}

/// Render the embedded-data script: one `window.*` assignment per dataset.
pub fn render_embedded_js(boards: &Leaderboards) -> Result<String, OutputError> {
    let assignments: [(&str, String); 6] = [
        ("PITCH_DATA", to_json("pitch leaderboard", &boards.pitching.pitch_rows)?),
        ("PITCHER_DATA", to_json("pitcher leaderboard", &boards.pitching.pitcher_rows)?),
        ("HITTER_DATA", to_json("hitter leaderboard", &boards.hitting.hitter_rows)?),
        ("METADATA", to_json("metadata", &boards.metadata)?),
        ("PITCH_DETAILS", to_json("pitch details", &boards.pitching.pitch_samples)?),
        (
            "HITTER_PITCH_DETAILS",
            to_json("hitter pitch details", &boards.hitting.breakdowns)?,
        ),
    ];

    let mut script = String::from(EMBEDDED_HEADER);
    for (name, json) in &assignments {
        script.push_str("window.");
        script.push_str(name);
        script.push_str(" = ");
        script.push_str(json);
        script.push_str(";\n");
    }
    Ok(script)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|e| OutputError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write every output file into `data_dir`, creating it if needed. Returns
/// the paths written, in write order.
pub fn write_all(
    boards: &Leaderboards,
    data_dir: &Path,
    options: &OutputConfig,
) -> Result<Vec<PathBuf>, OutputError> {
    std::fs::create_dir_all(data_dir).map_err(|e| OutputError::Io {
        path: data_dir.display().to_string(),
        source: e,
    })?;

    let metadata = if options.pretty_metadata {
        to_json_pretty("metadata", &boards.metadata)?
    } else {
        to_json("metadata", &boards.metadata)?
    };

    let mut files = vec![
        (
            PITCH_LEADERBOARD_FILE,
            to_json("pitch leaderboard", &boards.pitching.pitch_rows)?,
        ),
        (
            PITCHER_LEADERBOARD_FILE,
            to_json("pitcher leaderboard", &boards.pitching.pitcher_rows)?,
        ),
        (
            HITTER_LEADERBOARD_FILE,
            to_json("hitter leaderboard", &boards.hitting.hitter_rows)?,
        ),
        (METADATA_FILE, metadata),
    ];
    if options.embedded_js {
        files.push((EMBEDDED_JS_FILE, render_embedded_js(boards)?));
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = data_dir.join(name);
        write_file(&path, &contents)?;
        written.push(path);
    }

    info!(
        "Output written to {}: {} pitch rows, {} pitcher rows, {} hitter rows",
        data_dir.display(),
        boards.pitching.pitch_rows.len(),
        boards.pitching.pitcher_rows.len(),
        boards.hitting.hitter_rows.len()
    );
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
