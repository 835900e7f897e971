// End-to-end tests for the aggregation engine.
//
// Rows start out as raw column -> string records, the way ingestion hands
// them over, and go through normalization, grouping, ranking and
// summarizing via the public API only.

use chrono::NaiveDate;

use pitchlab_engine::leaderboard::{self, Leaderboards};
use pitchlab_engine::percentile::Metric;
use pitchlab_engine::pitching::{build_pitching, PitchMetric, PitchRow, PitchingBoards};
use pitchlab_engine::record::{BattedBallType, PhysicalMetric, PitchEvent, RawRecord, Role};
use pitchlab_engine::stats::{HitterStat, PitchStat};

// ===========================================================================
// Test helpers
// ===========================================================================

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn raw(cells: &[(&str, &str)]) -> RawRecord {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn pitching_event(cells: &[(&str, &str)]) -> PitchEvent {
    PitchEvent::from_raw(&raw(cells), Role::Pitcher).expect("pitcher present")
}

fn hitting_event(cells: &[(&str, &str)]) -> PitchEvent {
    PitchEvent::from_raw(&raw(cells), Role::Hitter).expect("hitter present")
}

fn velocity() -> PitchMetric {
    PitchMetric::Physical(PhysicalMetric::Velocity)
}

fn pitch_row<'a>(boards: &'a PitchingBoards, pitcher: &str) -> &'a PitchRow {
    boards
        .pitch_rows
        .iter()
        .find(|r| r.pitcher == pitcher)
        .expect("pitch row present")
}

fn run(pitching: &[PitchEvent], hitting: &[PitchEvent]) -> Leaderboards {
    let stamp = NaiveDate::from_ymd_opt(2025, 4, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    leaderboard::build(pitching, hitting, stamp)
}

/// Three fastballs from one pitcher, all in the zone.
fn three_fastballs() -> Vec<PitchEvent> {
    [
        ("95.0", "2200", "Called Strike"),
        ("96.0", "2300", "Swinging Strike"),
        ("97.0", "2400", "Foul"),
    ]
    .into_iter()
    .map(|(velo, spin, desc)| {
        pitching_event(&[
            ("Pitcher", "A"),
            ("Team", "X"),
            ("Throws", "R"),
            ("Pitch Type", "FB"),
            ("Velocity", velo),
            ("Spin Rate", spin),
            ("Zone", "5"),
            ("Description", desc),
        ])
    })
    .collect()
}

// ===========================================================================
// Pitch-level cohort
// ===========================================================================

#[test]
fn three_pitch_cohort_end_to_end() {
    let boards = run(&three_fastballs(), &[]);
    let rows = &boards.pitching.pitch_rows;
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.pitcher, "A");
    assert_eq!(row.team.as_deref(), Some("X"));
    assert_eq!(row.pitch_type, "FB");
    assert_eq!(row.count, 3);
    assert_eq!(row.metrics.velocity, Some(96.0));
    assert_eq!(row.metrics.spin_rate, Some(2300.0));
    assert_eq!(row.stats.iz_pct, Some(1.0));
    assert!(approx_eq(row.stats.sw_str_pct.unwrap(), 1.0 / 3.0, 1e-12));
    assert!(approx_eq(row.stats.csw_pct.unwrap(), 2.0 / 3.0, 1e-12));
    assert_eq!(row.stats.chase_pct, None);
    assert_eq!(row.stats.gb_pct, None);

    // Alone in its pitch type: every valued metric sits at 50.
    assert_eq!(row.percentiles.get(velocity()), Some(50));
    assert_eq!(row.stuff_score, Some(50));
    assert_eq!(row.percentiles.get(PitchMetric::StuffScore), Some(50));
    assert_eq!(row.percentiles.get(PitchMetric::Stat(PitchStat::ChasePct)), None);
}

#[test]
fn pitch_row_wire_shape() {
    let boards = run(&three_fastballs(), &[]);
    let json = serde_json::to_value(&boards.pitching.pitch_rows[0]).unwrap();

    assert_eq!(json["pitcher"], "A");
    assert_eq!(json["pitchType"], "FB");
    assert_eq!(json["count"], 3);
    assert_eq!(json["usagePct"], 1.0);
    assert_eq!(json["velocity"], 96.0);
    assert_eq!(json["spinRate"], 2300.0);
    assert_eq!(json["izPct"], 1.0);
    assert!(json["chasePct"].is_null());
    assert_eq!(json["velocity_pctl"], 50);
    assert!(json["chasePct_pctl"].is_null());
    assert_eq!(json["stuffScore"], 50);
    assert_eq!(json["stuffScore_pctl"], 50);
    assert!(json["breakTilt"].is_null());
}

// ===========================================================================
// Percentile properties
// ===========================================================================

#[test]
fn percentiles_are_bounded_and_null_iff_value_is_null() {
    let velos = ["92.1", "94.0", "94.0", "", "99.3", "88.8", "abc"];
    let events: Vec<PitchEvent> = velos
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let name = format!("P{i}");
            pitching_event(&[
                ("Pitcher", name.as_str()),
                ("Pitch Type", "SL"),
                ("Velocity", *v),
            ])
        })
        .collect();

    let boards = build_pitching(&events);
    assert_eq!(boards.pitch_rows.len(), velos.len());
    for row in &boards.pitch_rows {
        let pctl = row.percentiles.get(velocity());
        assert_eq!(pctl.is_none(), row.metrics.velocity.is_none());
        if let Some(p) = pctl {
            assert!(p <= 100);
        }
    }

    let by_name = |name: &str| {
        boards
            .pitch_rows
            .iter()
            .find(|r| r.pitcher == name)
            .unwrap()
            .percentiles
            .get(velocity())
    };
    // Unique minimum and maximum hit the ends.
    assert_eq!(by_name("P5"), Some(0));
    assert_eq!(by_name("P4"), Some(100));
}

#[test]
fn percentiles_rank_within_pitch_type_only() {
    let mk = |name: &str, pt: &str, velo: &str| {
        pitching_event(&[("Pitcher", name), ("Pitch Type", pt), ("Velocity", velo)])
    };
    let events = vec![
        mk("A", "FB", "94"),
        mk("B", "FB", "98"),
        mk("C", "CU", "78"),
        mk("D", "CU", "82"),
        mk("E", "CU", "82"),
    ];
    let boards = build_pitching(&events);
    let pctl = |name: &str| {
        boards
            .pitch_rows
            .iter()
            .find(|r| r.pitcher == name)
            .and_then(|r| r.percentiles.get(velocity()))
    };
    assert_eq!(pctl("A"), Some(0));
    assert_eq!(pctl("B"), Some(100));
    assert_eq!(pctl("C"), Some(0));
    // Tied pair shares rank (1 + 0.5) / 2.
    assert_eq!(pctl("D"), Some(75));
    assert_eq!(pctl("E"), Some(75));
}

#[test]
fn fully_tied_group_ranks_fifty() {
    let events: Vec<PitchEvent> = (0..4)
        .map(|i| {
            let name = format!("P{i}");
            pitching_event(&[("Pitcher", name.as_str()), ("Pitch Type", "CH"), ("Velocity", "85")])
        })
        .collect();
    let boards = build_pitching(&events);
    assert!(boards
        .pitch_rows
        .iter()
        .all(|r| r.percentiles.get(velocity()) == Some(50)));
}

// ===========================================================================
// Stuff score
// ===========================================================================

#[test]
fn stuff_score_is_reranked_within_pitch_type() {
    let mk = |name: &str, velo: &str, spin: &str| {
        pitching_event(&[
            ("Pitcher", name),
            ("Pitch Type", "FB"),
            ("Velocity", velo),
            ("Spin Rate", spin),
        ])
    };
    let events = vec![
        mk("A", "93", "2100"),
        mk("B", "95", "2500"),
        mk("C", "97", "2300"),
        mk("D", "99", ""),
    ];
    let boards = build_pitching(&events);
    let row = |name: &str| boards.pitch_rows.iter().find(|r| r.pitcher == name).unwrap();

    // Velocity pctl 0/33/67/100; spin over A-C only: 0/100/50.
    assert_eq!(row("A").stuff_score, Some(0));
    assert_eq!(row("B").stuff_score, Some(66)); // (33 + 100) / 2 = 66.5 -> 66
    assert_eq!(row("C").stuff_score, Some(58)); // (67 + 50) / 2 = 58.5 -> 58
    assert_eq!(row("D").stuff_score, None);

    assert_eq!(row("A").percentiles.get(PitchMetric::StuffScore), Some(0));
    assert_eq!(row("B").percentiles.get(PitchMetric::StuffScore), Some(100));
    assert_eq!(row("C").percentiles.get(PitchMetric::StuffScore), Some(50));
    assert_eq!(row("D").percentiles.get(PitchMetric::StuffScore), None);
}

// ===========================================================================
// Break tilt
// ===========================================================================

#[test]
fn break_tilt_wraps_around_twelve() {
    let mk = |tilt: &str| {
        pitching_event(&[("Pitcher", "A"), ("Pitch Type", "FB"), ("Break Tilt", tilt)])
    };
    let events = vec![mk("11:58"), mk("12:02"), mk("not a tilt")];
    let boards = build_pitching(&events);
    let row = pitch_row(&boards, "A");
    assert_eq!(row.break_tilt_minutes, Some(0));
    assert_eq!(row.break_tilt.as_deref(), Some("12:00"));
}

#[test]
fn break_tilt_accepts_timestamp_cells() {
    let events = vec![
        pitching_event(&[("Pitcher", "A"), ("Pitch Type", "SL"), ("Break Tilt", "1899-12-30 09:15:00")]),
        pitching_event(&[("Pitcher", "A"), ("Pitch Type", "SL"), ("Break Tilt", "9:15")]),
    ];
    let boards = build_pitching(&events);
    let row = pitch_row(&boards, "A");
    assert_eq!(row.break_tilt.as_deref(), Some("9:15"));
    assert_eq!(row.break_tilt_minutes, Some(555));
}

// ===========================================================================
// Discards and degenerate inputs
// ===========================================================================

#[test]
fn records_without_actor_are_discarded() {
    assert!(PitchEvent::from_raw(&raw(&[("Team", "X"), ("Pitch Type", "FB")]), Role::Pitcher).is_none());
    assert!(PitchEvent::from_raw(&raw(&[("Pitcher", ""), ("Pitch Type", "FB")]), Role::Pitcher).is_none());
    // A pitching record has no Hitter column.
    assert!(PitchEvent::from_raw(&raw(&[("Pitcher", "A")]), Role::Hitter).is_none());
}

#[test]
fn untyped_pitches_still_count_for_pitcher_totals() {
    let mut events = three_fastballs();
    events.push(pitching_event(&[
        ("Pitcher", "A"),
        ("Team", "X"),
        ("Throws", "R"),
        ("Zone", "12"),
        ("Description", "Ball"),
    ]));
    let boards = run(&events, &[]);

    assert_eq!(boards.pitching.pitch_rows.len(), 1);
    assert_eq!(boards.pitching.pitch_rows[0].count, 3);
    assert_eq!(boards.pitching.pitch_rows[0].usage_pct, Some(0.75));

    let pitcher = &boards.pitching.pitcher_rows[0];
    assert_eq!(pitcher.count, 4);
    // One out-of-zone pitch, not swung at.
    assert_eq!(pitcher.stats.chase_pct, Some(0.0));
    assert_eq!(boards.metadata.total_pitches, 4);
    assert_eq!(boards.metadata.pitch_types, vec!["FB"]);
}

#[test]
fn rows_sorted_by_count_descending() {
    let mk = |name: &str| pitching_event(&[("Pitcher", name), ("Pitch Type", "FB")]);
    let events = vec![mk("A"), mk("B"), mk("B"), mk("C"), mk("C"), mk("C")];
    let boards = build_pitching(&events);
    let counts: Vec<usize> = boards.pitch_rows.iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![3, 2, 1]);
    let counts: Vec<usize> = boards.pitcher_rows.iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![3, 2, 1]);
}

// ===========================================================================
// Hitting side
// ===========================================================================

#[test]
fn hitter_board_end_to_end() {
    let seen = |hitter: &str, zone: &str, desc: &str| {
        hitting_event(&[
            ("Hitter", hitter),
            ("Team", "Y"),
            ("Stands", "L"),
            ("Pitch Type", "FB"),
            ("Zone", zone),
            ("Description", desc),
        ])
    };
    let mut barrel = seen("H1", "5", "In Play");
    barrel.bb_type = Some(BattedBallType::LineDrive);
    barrel.exit_velocity = Some(104.0);
    barrel.launch_angle = Some(27.0);

    let hitting = vec![
        barrel,
        seen("H1", "12", "Ball"),
        seen("H2", "5", "Swinging Strike"),
        seen("H2", "13", "Swinging Strike"),
    ];
    let boards = run(&three_fastballs(), &hitting);

    let h1 = boards.hitting.hitter_rows.iter().find(|r| r.hitter == "H1").unwrap();
    let h2 = boards.hitting.hitter_rows.iter().find(|r| r.hitter == "H2").unwrap();

    assert_eq!(h1.stats.chase_pct, Some(0.0));
    assert_eq!(h2.stats.chase_pct, Some(1.0));
    // Lower chase is better: H1 ranks high after inversion.
    assert_eq!(h1.percentiles.get(HitterStat::ChasePct), Some(100));
    assert_eq!(h2.percentiles.get(HitterStat::ChasePct), Some(0));
    assert_eq!(h1.stats.barrel_pct, Some(1.0));
    assert_eq!(h2.stats.barrel_pct, None);
    assert_eq!(h1.percentiles.get(HitterStat::BarrelPct), Some(50));

    assert_eq!(boards.metadata.teams, vec!["X", "Y"]);
    assert_eq!(boards.metadata.total_hitters, 2);
    assert_eq!(boards.metadata.hitter_league_averages.count(), 2);
    assert_eq!(
        boards.metadata.hitter_league_averages.get(HitterStat::ChasePct),
        Some(0.5)
    );
    assert_eq!(boards.hitting.breakdowns["H2"][0].pitch_type, "FB");
    assert_eq!(boards.hitting.breakdowns["H2"][0].count, 2);
}

// ===========================================================================
// League averages
// ===========================================================================

#[test]
fn league_averages_per_pitch_type() {
    let mut events = three_fastballs();
    events.push(pitching_event(&[
        ("Pitcher", "B"),
        ("Team", "X"),
        ("Pitch Type", "FB"),
        ("Velocity", "93.0"),
        ("Spin Rate", "2101"),
    ]));
    let boards = run(&events, &[]);
    let fb = &boards.metadata.league_averages["FB"];

    assert_eq!(fb.count(), 2);
    assert_eq!(fb.get(velocity()), Some(94.5));
    assert_eq!(fb.get(PitchMetric::Physical(PhysicalMetric::SpinRate)), Some(2200.5));
    assert_eq!(fb.get(PitchMetric::StuffScore), None);

    let json = serde_json::to_value(&boards.metadata).unwrap();
    assert_eq!(json["leagueAverages"]["FB"][velocity().key()], 94.5);
    assert_eq!(json["pitcherLeagueAverages"]["count"], 2);
}
