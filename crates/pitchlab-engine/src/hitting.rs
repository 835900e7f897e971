// Hitting boards: hitter leaderboard, per-pitch-type breakdowns, and the
// hitter league average.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::grouping::{group_by, HitterKey};
use crate::league::LeagueAverage;
use crate::percentile::{MetricRow, PeerGroups, Percentiles};
use crate::record::PitchEvent;
use crate::stats::{HitterStat, HitterStats};

/// One hitter from one side of the plate.
#[derive(Debug, Clone, Serialize)]
pub struct HitterRow {
    pub hitter: String,
    pub team: Option<String>,
    pub stands: Option<String>,
    pub count: usize,
    #[serde(flatten)]
    pub stats: HitterStats,
    #[serde(flatten)]
    pub percentiles: Percentiles<HitterStat>,
}

impl MetricRow<HitterStat> for HitterRow {
    fn metric_value(&self, metric: HitterStat) -> Option<f64> {
        self.stats.get(metric)
    }

    fn percentiles(&self) -> &Percentiles<HitterStat> {
        &self.percentiles
    }

    fn percentiles_mut(&mut self) -> &mut Percentiles<HitterStat> {
        &mut self.percentiles
    }
}

/// A hitter's stats against one pitch type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchTypeBreakdown {
    pub pitch_type: String,
    pub count: usize,
    #[serde(flatten)]
    pub stats: HitterStats,
}

#[derive(Debug, Clone)]
pub struct HittingBoards {
    /// Sorted by count, descending.
    pub hitter_rows: Vec<HitterRow>,
    /// Hitter name -> breakdown by pitch type faced, most-seen first.
    pub breakdowns: BTreeMap<String, Vec<PitchTypeBreakdown>>,
    pub hitter_averages: LeagueAverage<HitterStat>,
    /// Sorted distinct teams seen in the hitting events.
    pub teams: Vec<String>,
    pub total_pitches: usize,
}

/// Build every hitting board from one snapshot of hitter-facing events.
pub fn build_hitting(events: &[PitchEvent]) -> HittingBoards {
    let mut rows: Vec<HitterRow> = group_by(events, HitterKey::of)
        .into_iter()
        .map(|(key, members)| HitterRow {
            hitter: key.hitter,
            team: key.team,
            stands: key.stands,
            count: members.len(),
            stats: HitterStats::compute(&members),
            percentiles: Percentiles::default(),
        })
        .collect();

    PeerGroups::whole(&rows).rank_all(&mut rows, &HitterStat::ALL);
    invert_lower_is_better(&mut rows);

    let hitter_averages = LeagueAverage::summarize(&rows, &HitterStat::ALL);
    rows.sort_by(|a, b| b.count.cmp(&a.count));

    let breakdowns = build_breakdowns(events);

    let mut teams: Vec<String> = events.iter().filter_map(|e| e.team.clone()).collect();
    teams.sort();
    teams.dedup();

    info!(
        "Hitting boards: {} hitter rows, {} hitters with pitch-type breakdowns",
        rows.len(),
        breakdowns.len()
    );

    HittingBoards {
        hitter_rows: rows,
        breakdowns,
        hitter_averages,
        teams,
        total_pitches: events.len(),
    }
}

/// For stats where less is better for the hitter, a high percentile should
/// still read as good.
fn invert_lower_is_better(rows: &mut [HitterRow]) {
    for row in rows {
        for stat in HitterStat::LOWER_IS_BETTER {
            row.percentiles.invert(stat);
        }
    }
}

fn build_breakdowns(events: &[PitchEvent]) -> BTreeMap<String, Vec<PitchTypeBreakdown>> {
    let by_hitter = group_by(events, |e: &PitchEvent| e.actor.clone());

    by_hitter
        .into_iter()
        .map(|(hitter, members)| {
            let typed = members
                .into_iter()
                .filter_map(|e| e.pitch_type.as_ref().map(|pt| (pt.clone(), e)));
            let mut by_type: BTreeMap<String, Vec<&PitchEvent>> = BTreeMap::new();
            for (pt, e) in typed {
                by_type.entry(pt).or_default().push(e);
            }

            let mut entries: Vec<PitchTypeBreakdown> = by_type
                .into_iter()
                .map(|(pitch_type, pitches)| PitchTypeBreakdown {
                    pitch_type,
                    count: pitches.len(),
                    stats: HitterStats::compute(&pitches),
                })
                .collect();
            // Stable sort keeps pitch-type name order among equal counts.
            entries.sort_by(|a, b| b.count.cmp(&a.count));
            (hitter, entries)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
