// Full run: both sides of the record set plus the metadata document.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::hitting::{build_hitting, HittingBoards};
use crate::league::LeagueAverage;
use crate::pitching::{build_pitching, PitchMetric, PitchingBoards};
use crate::record::PitchEvent;
use crate::stats::{HitterStat, PitchStat};

/// Format of `generatedAt`.
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Summary document shipped alongside the leaderboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub teams: Vec<String>,
    pub pitch_types: Vec<String>,
    pub generated_at: String,
    pub total_pitches: usize,
    pub total_pitchers: usize,
    pub total_hitters: usize,
    pub league_averages: BTreeMap<String, LeagueAverage<PitchMetric>>,
    pub pitcher_league_averages: LeagueAverage<PitchStat>,
    pub hitter_league_averages: LeagueAverage<HitterStat>,
}

#[derive(Debug, Clone)]
pub struct Leaderboards {
    pub pitching: PitchingBoards,
    pub hitting: HittingBoards,
    pub metadata: Metadata,
}

/// Aggregate both record sets. `generated_at` is stamped into the metadata
/// as-is; the engine never reads the clock.
pub fn build(
    pitching_events: &[PitchEvent],
    hitting_events: &[PitchEvent],
    generated_at: NaiveDateTime,
) -> Leaderboards {
    let pitching = build_pitching(pitching_events);
    let hitting = build_hitting(hitting_events);

    let teams: BTreeSet<String> = pitching
        .teams
        .iter()
        .chain(hitting.teams.iter())
        .cloned()
        .collect();

    let metadata = Metadata {
        teams: teams.into_iter().collect(),
        pitch_types: pitching.pitch_types.clone(),
        generated_at: generated_at.format(GENERATED_AT_FORMAT).to_string(),
        total_pitches: pitching.total_pitches,
        total_pitchers: pitching.pitcher_rows.len(),
        total_hitters: hitting.hitter_rows.len(),
        league_averages: pitching.pitch_type_averages.clone(),
        pitcher_league_averages: pitching.pitcher_averages.clone(),
        hitter_league_averages: hitting.hitter_averages.clone(),
    };

    info!(
        "Leaderboards built: {} pitches, {} pitchers, {} hitters, {} teams",
        metadata.total_pitches,
        metadata.total_pitchers,
        metadata.total_hitters,
        metadata.teams.len()
    );

    Leaderboards {
        pitching,
        hitting,
        metadata,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
