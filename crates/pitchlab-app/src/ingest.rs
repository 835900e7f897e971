// Sheet ingestion: CSV exports -> raw records -> normalized pitch events.
//
// One CSV file per exported sheet. The header row names the columns; columns
// with a blank header are dropped, and short rows are padded with absent
// values. Normalization (and the no-actor discard) is the engine's job.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use pitchlab_engine::record::{PitchEvent, RawRecord, Role};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

/// Read every data row of one sheet as a column -> value record.
pub fn records_from_reader<R: Read>(rdr: R) -> Result<Vec<RawRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(row) => records.push(to_raw(&headers, &row)),
            Err(e) => {
                warn!("skipping malformed row: {}", e);
            }
        }
    }
    Ok(records)
}

fn to_raw(headers: &StringRecord, row: &StringRecord) -> RawRecord {
    let mut raw = RawRecord::with_capacity(headers.len());
    for (i, name) in headers.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = row.get(i).unwrap_or_default();
        // First column wins when a header repeats.
        raw.entry(name.to_string()).or_insert_with(|| value.to_string());
    }
    raw
}

/// Read one sheet and normalize it for `role`, discarding rows without an
/// actor name.
pub fn events_from_reader<R: Read>(rdr: R, role: Role) -> Result<Vec<PitchEvent>, csv::Error> {
    let records = records_from_reader(rdr)?;
    let total = records.len();
    let events: Vec<PitchEvent> = records
        .iter()
        .filter_map(|raw| PitchEvent::from_raw(raw, role))
        .collect();

    let discarded = total - events.len();
    if discarded > 0 {
        debug!(
            "discarded {} of {} rows without a {} name",
            discarded,
            total,
            role.actor_column()
        );
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load one sheet export from disk.
pub fn load_events(path: &Path, role: Role) -> Result<Vec<PitchEvent>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    events_from_reader(file, role).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load every sheet of one side, concatenated in file order. A side with no
/// usable events is an error when `require_rows` is set; otherwise it is
/// logged and returned empty.
pub fn load_side(
    paths: &[PathBuf],
    role: Role,
    require_rows: bool,
) -> Result<Vec<PitchEvent>, IngestError> {
    let mut events = Vec::new();
    for path in paths {
        let sheet = load_events(path, role)?;
        info!("Read {} pitches from {}", sheet.len(), path.display());
        events.extend(sheet);
    }

    let side = role.actor_column().to_lowercase();
    if events.is_empty() {
        if require_rows {
            return Err(IngestError::Validation(format!(
                "no usable {} rows in {} input file(s)",
                side,
                paths.len()
            )));
        }
        warn!(
            "no usable {} rows in {} input file(s); {} boards will be empty",
            side,
            paths.len(),
            side
        );
        return Ok(events);
    }

    info!(
        "Read {} {} pitches from {} sheet(s)",
        events.len(),
        side,
        paths.len()
    );
    Ok(events)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
