// Pitching boards: pitch-type leaderboard, pitcher leaderboard, scatter
// samples, and their league averages.
//
// Pitch rows are ranked per pitch type (physical metrics and rate stats),
// then the stuff score is composed from the velocity and spin-rate
// percentiles and ranked in a second pass. Pitcher rows are ranked on rate
// stats across every pitcher.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::composite::{Composite, CompositeRow, FirstPass};
use crate::grouping::{group_by, ActorTeamKey, PitchTypeKey, PitcherKey};
use crate::league::LeagueAverage;
use crate::percentile::{Metric, MetricRow, PeerGroups, Percentiles};
use crate::record::{PhysicalMetric, PhysicalMetrics, PitchEvent};
use crate::stats::{average_physical, round_to, PitchStat, PitchStats};
use crate::tilt::{mean_tilt, tilt_display};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Everything ranked on the pitch-type board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchMetric {
    Physical(PhysicalMetric),
    Stat(PitchStat),
    StuffScore,
}

impl PitchMetric {
    /// First-pass metrics: the eleven physical averages and five rate stats.
    pub fn base() -> Vec<PitchMetric> {
        PhysicalMetric::ALL
            .into_iter()
            .map(PitchMetric::Physical)
            .chain(PitchStat::ALL.into_iter().map(PitchMetric::Stat))
            .collect()
    }
}

impl Metric for PitchMetric {
    fn key(self) -> &'static str {
        match self {
            PitchMetric::Physical(m) => m.key(),
            PitchMetric::Stat(s) => s.key(),
            PitchMetric::StuffScore => "stuffScore",
        }
    }

    fn summary_places(self) -> i32 {
        match self {
            PitchMetric::Physical(m) => m.summary_places(),
            PitchMetric::Stat(s) => s.summary_places(),
            PitchMetric::StuffScore => 0,
        }
    }
}

/// Stuff score: mean of velocity and spin-rate percentiles within a pitch type.
pub const STUFF_SCORE: Composite<PitchMetric> = Composite {
    inputs: [
        PitchMetric::Physical(PhysicalMetric::Velocity),
        PitchMetric::Physical(PhysicalMetric::SpinRate),
    ],
    output: PitchMetric::StuffScore,
};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One pitcher's one pitch type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchRow {
    pub pitcher: String,
    pub team: Option<String>,
    pub throws: Option<String>,
    pub pitch_type: String,
    pub count: usize,
    /// Share of this pitcher's (same team) pitches thrown as this type.
    pub usage_pct: Option<f64>,
    #[serde(flatten)]
    pub metrics: PhysicalMetrics,
    pub break_tilt: Option<String>,
    pub break_tilt_minutes: Option<u32>,
    #[serde(flatten)]
    pub stats: PitchStats,
    pub stuff_score: Option<u8>,
    #[serde(flatten)]
    pub percentiles: Percentiles<PitchMetric>,
}

impl MetricRow<PitchMetric> for PitchRow {
    fn metric_value(&self, metric: PitchMetric) -> Option<f64> {
        match metric {
            PitchMetric::Physical(m) => self.metrics.get(m),
            PitchMetric::Stat(s) => self.stats.get(s),
            PitchMetric::StuffScore => self.stuff_score.map(f64::from),
        }
    }

    fn percentiles(&self) -> &Percentiles<PitchMetric> {
        &self.percentiles
    }

    fn percentiles_mut(&mut self) -> &mut Percentiles<PitchMetric> {
        &mut self.percentiles
    }

    fn tilt_minutes(&self) -> Option<u32> {
        self.break_tilt_minutes
    }
}

impl CompositeRow<PitchMetric> for PitchRow {
    fn set_composite(&mut self, metric: PitchMetric, score: Option<u8>) {
        if metric == PitchMetric::StuffScore {
            self.stuff_score = score;
        }
    }
}

/// All of one pitcher's pitches, regardless of type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitcherRow {
    pub pitcher: String,
    pub team: Option<String>,
    pub throws: Option<String>,
    pub count: usize,
    #[serde(flatten)]
    pub stats: PitchStats,
    #[serde(flatten)]
    pub percentiles: Percentiles<PitchStat>,
}

impl MetricRow<PitchStat> for PitcherRow {
    fn metric_value(&self, metric: PitchStat) -> Option<f64> {
        self.stats.get(metric)
    }

    fn percentiles(&self) -> &Percentiles<PitchStat> {
        &self.percentiles
    }

    fn percentiles_mut(&mut self) -> &mut Percentiles<PitchStat> {
        &mut self.percentiles
    }
}

/// One pitch for movement scatter plots and velocity distributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchSample {
    pub pt: String,
    pub ivb: f64,
    pub hb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rz: Option<f64>,
}

impl PitchSample {
    /// Requires a pitch type plus both break components.
    pub fn from_event(event: &PitchEvent) -> Option<Self> {
        let pt = event.pitch_type.clone()?;
        let ivb = event.physical.ind_vert_brk?;
        let hb = event.physical.horz_brk?;
        Some(Self {
            pt,
            ivb: round_to(ivb, 1),
            hb: round_to(hb, 1),
            v: event.physical.velocity.map(|v| round_to(v, 1)),
            rx: event.physical.rel_pos_x.map(|v| round_to(v, 2)),
            rz: event.physical.rel_pos_z.map(|v| round_to(v, 2)),
        })
    }
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

/// Everything produced from the pitching record set.
#[derive(Debug, Clone)]
pub struct PitchingBoards {
    /// Sorted by count, descending.
    pub pitch_rows: Vec<PitchRow>,
    /// Sorted by count, descending.
    pub pitcher_rows: Vec<PitcherRow>,
    /// Pitcher name -> scatter samples, in event order.
    pub pitch_samples: BTreeMap<String, Vec<PitchSample>>,
    /// Pitch type -> averages over that type's pitch rows.
    pub pitch_type_averages: BTreeMap<String, LeagueAverage<PitchMetric>>,
    pub pitcher_averages: LeagueAverage<PitchStat>,
    /// Sorted distinct teams seen in the pitching events.
    pub teams: Vec<String>,
    /// Sorted distinct pitch types seen in the pitching events.
    pub pitch_types: Vec<String>,
    pub total_pitches: usize,
}

/// Build every pitching board from one snapshot of pitch events.
pub fn build_pitching(events: &[PitchEvent]) -> PitchingBoards {
    let teams: BTreeSet<String> = events.iter().filter_map(|e| e.team.clone()).collect();
    let pitch_types: BTreeSet<String> = events.iter().filter_map(|e| e.pitch_type.clone()).collect();

    let (pitch_rows, pitch_type_averages) = build_pitch_rows(events);
    let (pitcher_rows, pitcher_averages) = build_pitcher_rows(events);
    let pitch_samples = build_pitch_samples(events);

    info!(
        "Pitching boards: {} pitch rows, {} pitcher rows, {} samples across {} pitchers",
        pitch_rows.len(),
        pitcher_rows.len(),
        pitch_samples.values().map(Vec::len).sum::<usize>(),
        pitch_samples.len()
    );

    PitchingBoards {
        pitch_rows,
        pitcher_rows,
        pitch_samples,
        pitch_type_averages,
        pitcher_averages,
        teams: teams.into_iter().collect(),
        pitch_types: pitch_types.into_iter().collect(),
        total_pitches: events.len(),
    }
}

fn build_pitch_rows(
    events: &[PitchEvent],
) -> (Vec<PitchRow>, BTreeMap<String, LeagueAverage<PitchMetric>>) {
    let totals = group_by(events, ActorTeamKey::of);

    let cohorts = group_by(events, PitchTypeKey::of);
    debug!(
        "{} pitch-type cohorts over {} pitches",
        cohorts.len(),
        cohorts.event_count()
    );
    let mut rows = Vec::with_capacity(cohorts.len());
    let mut untyped = 0usize;

    for (key, members) in cohorts {
        let Some(pitch_type) = key.pitch_type else {
            untyped += members.len();
            continue;
        };

        let total = totals
            .get(&ActorTeamKey {
                actor: key.pitcher.clone(),
                team: key.team.clone(),
            })
            .map_or(0, |all| all.len());
        let usage_pct = if total > 0 {
            Some(round_to(members.len() as f64 / total as f64, 4))
        } else {
            None
        };

        let break_tilt_minutes = mean_tilt(members.iter().filter_map(|e| e.break_tilt.as_ref()));

        rows.push(PitchRow {
            pitcher: key.pitcher,
            team: key.team,
            throws: key.throws,
            pitch_type,
            count: members.len(),
            usage_pct,
            metrics: average_physical(&members),
            break_tilt: break_tilt_minutes.map(tilt_display),
            break_tilt_minutes,
            stats: PitchStats::compute(&members),
            stuff_score: None,
            percentiles: Percentiles::default(),
        });
    }

    if untyped > 0 {
        debug!("{} pitches without a pitch type left off the pitch board", untyped);
    }

    let peers = PeerGroups::by_key(&rows, |r: &PitchRow| r.pitch_type.clone());
    let ranked = FirstPass::run(rows, peers, &PitchMetric::base()).second_pass(STUFF_SCORE);

    let summary_metrics = PitchMetric::base();
    let averages: BTreeMap<String, LeagueAverage<PitchMetric>> = ranked
        .peers()
        .iter()
        .map(|(pitch_type, members)| {
            let group = members.iter().map(|&i| &ranked.rows()[i]);
            (pitch_type.clone(), LeagueAverage::summarize(group, &summary_metrics))
        })
        .collect();

    let mut rows = ranked.into_rows();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    (rows, averages)
}

fn build_pitcher_rows(events: &[PitchEvent]) -> (Vec<PitcherRow>, LeagueAverage<PitchStat>) {
    let mut rows: Vec<PitcherRow> = group_by(events, PitcherKey::of)
        .into_iter()
        .map(|(key, members)| PitcherRow {
            pitcher: key.pitcher,
            team: key.team,
            throws: key.throws,
            count: members.len(),
            stats: PitchStats::compute(&members),
            percentiles: Percentiles::default(),
        })
        .collect();

    PeerGroups::whole(&rows).rank_all(&mut rows, &PitchStat::ALL);
    let averages = LeagueAverage::summarize(&rows, &PitchStat::ALL);

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    (rows, averages)
}

fn build_pitch_samples(events: &[PitchEvent]) -> BTreeMap<String, Vec<PitchSample>> {
    let mut samples: BTreeMap<String, Vec<PitchSample>> = BTreeMap::new();
    for event in events {
        if let Some(sample) = PitchSample::from_event(event) {
            samples.entry(event.actor.clone()).or_default().push(sample);
        }
    }
    samples
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
