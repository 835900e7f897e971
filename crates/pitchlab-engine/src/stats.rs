// Per-cohort statistics: averages, medians, rate stats and the barrel rule.
//
// Every rate is `successes / denominator`, and `None` when the denominator
// is zero. Pitcher-side and hitter-side cohorts share the helpers here but
// compute different stat blocks.

use serde::Serialize;

use crate::percentile::Metric;
use crate::record::{BattedBallType, Description, PhysicalMetric, PhysicalMetrics, PitchEvent};

/// Zone codes inside the strike zone.
pub const IN_ZONE: [i32; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Zone codes outside the strike zone. Zone 10 is unused by the trackers.
pub const OUT_ZONE: [i32; 4] = [11, 12, 13, 14];

/// Minimum exit velocity (mph) for a barrel.
pub const BARREL_MIN_EV: f64 = 98.0;

/// Launch-angle floor and ceiling (degrees) the barrel window never crosses.
const BARREL_LA_FLOOR: f64 = 8.0;
const BARREL_LA_CEILING: f64 = 50.0;

pub fn in_zone(zone: Option<i32>) -> bool {
    zone.is_some_and(|z| IN_ZONE.contains(&z))
}

pub fn out_of_zone(zone: Option<i32>) -> bool {
    zone.is_some_and(|z| OUT_ZONE.contains(&z))
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Round to `places` decimals, resolving exact halves to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    if places <= 0 {
        return value.round_ties_even();
    }
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Mean of the present values, or `None` if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Median of a slice; even-length inputs average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

fn count<F>(events: &[&PitchEvent], pred: F) -> usize
where
    F: Fn(&PitchEvent) -> bool,
{
    events.iter().filter(|e| pred(e)).count()
}

// ---------------------------------------------------------------------------
// Physical averages
// ---------------------------------------------------------------------------

/// Average every physical metric over a cohort, rounded per metric.
pub fn average_physical(events: &[&PitchEvent]) -> PhysicalMetrics {
    let mut averages = PhysicalMetrics::default();
    for metric in PhysicalMetric::ALL {
        let avg = mean(events.iter().map(|e| e.physical.get(metric)))
            .map(|v| round_to(v, metric.cohort_places()));
        averages.set(metric, avg);
    }
    averages
}

// ---------------------------------------------------------------------------
// Barrels
// ---------------------------------------------------------------------------

/// Barrel rule: at least 98 mph, with a launch-angle window that opens as
/// exit velocity climbs (26-30 degrees at 98 mph, capped at 8-50).
pub fn is_barrel(exit_velocity: Option<f64>, launch_angle: Option<f64>) -> bool {
    let (Some(ev), Some(la)) = (exit_velocity, launch_angle) else {
        return false;
    };
    if ev < BARREL_MIN_EV {
        return false;
    }
    let over = ev - BARREL_MIN_EV;
    let lower = BARREL_LA_FLOOR.max(26.0 - over);
    let upper = BARREL_LA_CEILING.min(30.0 + 1.2 * over);
    (lower..=upper).contains(&la)
}

// ---------------------------------------------------------------------------
// Pitcher-side stats
// ---------------------------------------------------------------------------

/// Rate stats ranked on the pitch and pitcher boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchStat {
    IzPct,
    SwStrPct,
    CswPct,
    ChasePct,
    GbPct,
}

impl PitchStat {
    pub const ALL: [PitchStat; 5] = [
        PitchStat::IzPct,
        PitchStat::SwStrPct,
        PitchStat::CswPct,
        PitchStat::ChasePct,
        PitchStat::GbPct,
    ];
}

impl Metric for PitchStat {
    fn key(self) -> &'static str {
        match self {
            PitchStat::IzPct => "izPct",
            PitchStat::SwStrPct => "swStrPct",
            PitchStat::CswPct => "cswPct",
            PitchStat::ChasePct => "chasePct",
            PitchStat::GbPct => "gbPct",
        }
    }

    fn summary_places(self) -> i32 {
        4
    }
}

/// Location and outcome rates for a pitcher-side cohort. Unrounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchStats {
    pub iz_pct: Option<f64>,
    pub sw_str_pct: Option<f64>,
    pub csw_pct: Option<f64>,
    pub chase_pct: Option<f64>,
    pub gb_pct: Option<f64>,
}

impl PitchStats {
    pub fn compute(events: &[&PitchEvent]) -> Self {
        let total = events.len();
        if total == 0 {
            return Self::default();
        }

        let iz = count(events, |e| in_zone(e.zone));
        let swstr = count(events, |e| {
            e.description
                .as_ref()
                .is_some_and(|d| matches!(d, Description::SwingingStrike))
        });
        let csw = count(events, |e| {
            e.description
                .as_ref()
                .is_some_and(|d| d.is_called_or_swinging_strike())
        });

        let ooz: Vec<&PitchEvent> = events.iter().copied().filter(|e| out_of_zone(e.zone)).collect();
        let ooz_swung = count(&ooz, |e| {
            e.description.as_ref().is_some_and(|d| d.is_pitcher_chase_swing())
        });

        let bip: Vec<&PitchEvent> = events.iter().copied().filter(|e| e.is_batted_ball()).collect();
        let gb = count(&bip, |e| e.bb_type == Some(BattedBallType::GroundBall));

        Self {
            iz_pct: ratio(iz, total),
            sw_str_pct: ratio(swstr, total),
            csw_pct: ratio(csw, total),
            chase_pct: ratio(ooz_swung, ooz.len()),
            gb_pct: ratio(gb, bip.len()),
        }
    }

    pub fn get(&self, stat: PitchStat) -> Option<f64> {
        match stat {
            PitchStat::IzPct => self.iz_pct,
            PitchStat::SwStrPct => self.sw_str_pct,
            PitchStat::CswPct => self.csw_pct,
            PitchStat::ChasePct => self.chase_pct,
            PitchStat::GbPct => self.gb_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Hitter-side stats
// ---------------------------------------------------------------------------

/// Stats ranked on the hitter board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HitterStat {
    SwingPct,
    IzSwingPct,
    ChasePct,
    IzSwChase,
    WhiffPct,
    MedEv,
    MaxEv,
    BarrelPct,
    XBa,
    XSlg,
    GbPct,
    LdPct,
    FbPct,
    MedLa,
}

impl HitterStat {
    pub const ALL: [HitterStat; 14] = [
        HitterStat::SwingPct,
        HitterStat::IzSwingPct,
        HitterStat::ChasePct,
        HitterStat::IzSwChase,
        HitterStat::WhiffPct,
        HitterStat::MedEv,
        HitterStat::MaxEv,
        HitterStat::BarrelPct,
        HitterStat::XBa,
        HitterStat::XSlg,
        HitterStat::GbPct,
        HitterStat::LdPct,
        HitterStat::FbPct,
        HitterStat::MedLa,
    ];

    /// Stats where a lower value is the better outcome for the hitter.
    pub const LOWER_IS_BETTER: [HitterStat; 4] = [
        HitterStat::SwingPct,
        HitterStat::ChasePct,
        HitterStat::WhiffPct,
        HitterStat::GbPct,
    ];
}

impl Metric for HitterStat {
    fn key(self) -> &'static str {
        match self {
            HitterStat::SwingPct => "swingPct",
            HitterStat::IzSwingPct => "izSwingPct",
            HitterStat::ChasePct => "chasePct",
            HitterStat::IzSwChase => "izSwChase",
            HitterStat::WhiffPct => "whiffPct",
            HitterStat::MedEv => "medEV",
            HitterStat::MaxEv => "maxEV",
            HitterStat::BarrelPct => "barrelPct",
            HitterStat::XBa => "xBA",
            HitterStat::XSlg => "xSLG",
            HitterStat::GbPct => "gbPct",
            HitterStat::LdPct => "ldPct",
            HitterStat::FbPct => "fbPct",
            HitterStat::MedLa => "medLA",
        }
    }

    fn summary_places(self) -> i32 {
        4
    }
}

/// Plate-discipline and batted-ball stats for a hitter-side cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HitterStats {
    #[serde(rename = "nSwings")]
    pub n_swings: usize,
    #[serde(rename = "swingPct")]
    pub swing_pct: Option<f64>,
    #[serde(rename = "izSwingPct")]
    pub iz_swing_pct: Option<f64>,
    #[serde(rename = "chasePct")]
    pub chase_pct: Option<f64>,
    #[serde(rename = "izSwChase")]
    pub iz_sw_chase: Option<f64>,
    #[serde(rename = "whiffPct")]
    pub whiff_pct: Option<f64>,
    #[serde(rename = "medEV")]
    pub med_ev: Option<f64>,
    #[serde(rename = "maxEV")]
    pub max_ev: Option<f64>,
    #[serde(rename = "barrelPct")]
    pub barrel_pct: Option<f64>,
    #[serde(rename = "xBA")]
    pub xba: Option<f64>,
    #[serde(rename = "xSLG")]
    pub xslg: Option<f64>,
    #[serde(rename = "gbPct")]
    pub gb_pct: Option<f64>,
    #[serde(rename = "ldPct")]
    pub ld_pct: Option<f64>,
    #[serde(rename = "fbPct")]
    pub fb_pct: Option<f64>,
    #[serde(rename = "medLA")]
    pub med_la: Option<f64>,
}

impl HitterStats {
    pub fn compute(events: &[&PitchEvent]) -> Self {
        let total = events.len();
        if total == 0 {
            return Self::default();
        }

        // Swings
        let is_swing = |e: &PitchEvent| e.description.as_ref().is_some_and(|d| d.is_swing());
        let n_swings = count(events, is_swing);
        let whiffs = count(events, |e| e.description.as_ref().is_some_and(|d| d.is_whiff()));

        // Zone partition
        let iz: Vec<&PitchEvent> = events.iter().copied().filter(|e| in_zone(e.zone)).collect();
        let ooz: Vec<&PitchEvent> = events.iter().copied().filter(|e| out_of_zone(e.zone)).collect();
        let iz_swing_pct = ratio(count(&iz, is_swing), iz.len());
        let chase_pct = ratio(count(&ooz, is_swing), ooz.len());
        let iz_sw_chase = match (iz_swing_pct, chase_pct) {
            (Some(iz), Some(chase)) => Some(round_to(iz - chase, 4)),
            _ => None,
        };

        // Batted balls
        let bip: Vec<&PitchEvent> = events.iter().copied().filter(|e| e.is_batted_ball()).collect();
        let n_bip = bip.len();
        let gb = count(&bip, |e| e.bb_type == Some(BattedBallType::GroundBall));
        let ld = count(&bip, |e| e.bb_type == Some(BattedBallType::LineDrive));
        let fb = count(&bip, |e| e.bb_type.as_ref().is_some_and(|t| t.is_fly_ball_class()));

        // Exit velocity only on balls hit in the air (LA > 0)
        let evs_positive: Vec<f64> = bip
            .iter()
            .filter(|e| e.launch_angle.is_some_and(|la| la > 0.0))
            .filter_map(|e| e.exit_velocity)
            .collect();
        let max_ev = evs_positive.iter().copied().reduce(f64::max);

        let tracked: Vec<(f64, f64)> = bip
            .iter()
            .filter_map(|e| Some((e.exit_velocity?, e.launch_angle?)))
            .collect();
        let barrels = tracked
            .iter()
            .filter(|(ev, la)| is_barrel(Some(*ev), Some(*la)))
            .count();

        let all_la: Vec<f64> = bip.iter().filter_map(|e| e.launch_angle).collect();

        Self {
            n_swings,
            swing_pct: ratio(n_swings, total),
            iz_swing_pct,
            chase_pct,
            iz_sw_chase,
            whiff_pct: ratio(whiffs, n_swings),
            med_ev: median(&evs_positive).map(|v| round_to(v, 1)),
            max_ev: max_ev.map(|v| round_to(v, 1)),
            barrel_pct: ratio(barrels, tracked.len()),
            xba: mean(bip.iter().map(|e| e.xba)).map(|v| round_to(v, 3)),
            xslg: mean(bip.iter().map(|e| e.xslg)).map(|v| round_to(v, 3)),
            gb_pct: ratio(gb, n_bip),
            ld_pct: ratio(ld, n_bip),
            fb_pct: ratio(fb, n_bip),
            med_la: median(&all_la).map(|v| round_to(v, 1)),
        }
    }

    pub fn get(&self, stat: HitterStat) -> Option<f64> {
        match stat {
            HitterStat::SwingPct => self.swing_pct,
            HitterStat::IzSwingPct => self.iz_swing_pct,
            HitterStat::ChasePct => self.chase_pct,
            HitterStat::IzSwChase => self.iz_sw_chase,
            HitterStat::WhiffPct => self.whiff_pct,
            HitterStat::MedEv => self.med_ev,
            HitterStat::MaxEv => self.max_ev,
            HitterStat::BarrelPct => self.barrel_pct,
            HitterStat::XBa => self.xba,
            HitterStat::XSlg => self.xslg,
            HitterStat::GbPct => self.gb_pct,
            HitterStat::LdPct => self.ld_pct,
            HitterStat::FbPct => self.fb_pct,
            HitterStat::MedLa => self.med_la,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn pitch(zone: Option<i32>, description: &str) -> PitchEvent {
        PitchEvent {
            actor: "A".into(),
            zone,
            description: Some(Description::parse(description)),
            ..Default::default()
        }
    }

    fn batted(bb: &str, ev: Option<f64>, la: Option<f64>) -> PitchEvent {
        PitchEvent {
            actor: "H".into(),
            zone: Some(5),
            description: Some(Description::InPlay),
            bb_type: Some(BattedBallType::parse(bb)),
            exit_velocity: ev,
            launch_angle: la,
            ..Default::default()
        }
    }

    // -- Helpers --

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(95.96, 1), 96.0);
        assert_eq!(round_to(2299.6, 0), 2300.0);
        assert_eq!(round_to(-4.567, 2), -4.57);
        assert_eq!(round_to(0.125, 2), 0.12);
    }

    #[test]
    fn mean_ignores_missing() {
        assert_eq!(mean(vec![Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean(vec![None, None]), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    // -- Barrel rule --

    #[test]
    fn barrel_lower_bound_inclusive_at_98() {
        assert!(is_barrel(Some(98.0), Some(26.0)));
        assert!(is_barrel(Some(98.0), Some(30.0)));
        assert!(!is_barrel(Some(98.0), Some(25.9)));
        assert!(!is_barrel(Some(98.0), Some(7.0)));
    }

    #[test]
    fn barrel_window_widens_with_velocity() {
        assert!(is_barrel(Some(110.0), Some(40.0)));
        assert!(is_barrel(Some(116.0), Some(8.0)));
        assert!(!is_barrel(Some(116.0), Some(7.9)));
        assert!(is_barrel(Some(120.0), Some(50.0)));
        assert!(!is_barrel(Some(120.0), Some(50.1)));
    }

    #[test]
    fn barrel_needs_98_and_both_values() {
        assert!(!is_barrel(Some(97.9), Some(27.0)));
        assert!(!is_barrel(None, Some(27.0)));
        assert!(!is_barrel(Some(105.0), None));
    }

    // -- Pitcher stats --

    #[test]
    fn pitch_stats_basic_rates() {
        let events = vec![
            pitch(Some(5), "Called Strike"),
            pitch(Some(5), "Swinging Strike"),
            pitch(Some(5), "Foul"),
        ];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = PitchStats::compute(&refs);
        assert_eq!(stats.iz_pct, Some(1.0));
        assert!(approx_eq(stats.sw_str_pct.unwrap(), 1.0 / 3.0, 1e-12));
        assert!(approx_eq(stats.csw_pct.unwrap(), 2.0 / 3.0, 1e-12));
        assert_eq!(stats.chase_pct, None);
        assert_eq!(stats.gb_pct, None);
    }

    #[test]
    fn pitch_chase_uses_narrow_swing_set() {
        let events = vec![
            pitch(Some(11), "Swinging Strike"),
            pitch(Some(12), "Foul Tip"),
            pitch(Some(13), "Ball"),
            pitch(Some(14), "In Play"),
            pitch(Some(10), "Foul"),
            pitch(None, "Foul"),
        ];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = PitchStats::compute(&refs);
        assert_eq!(stats.chase_pct, Some(0.5));
        assert_eq!(stats.iz_pct, Some(0.0));
    }

    #[test]
    fn pitch_gb_rate_among_batted_balls() {
        let events = vec![
            batted("ground_ball", None, None),
            batted("fly_ball", None, None),
            batted("ground_ball", None, None),
            pitch(Some(3), "Ball"),
        ];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = PitchStats::compute(&refs);
        assert!(approx_eq(stats.gb_pct.unwrap(), 2.0 / 3.0, 1e-12));
    }

    #[test]
    fn empty_cohort_is_all_none() {
        assert_eq!(PitchStats::compute(&[]), PitchStats::default());
        assert_eq!(HitterStats::compute(&[]), HitterStats::default());
    }

    // -- Physical averages --

    #[test]
    fn physical_averages_round_per_metric() {
        let mut a = PitchEvent::default();
        a.physical.velocity = Some(95.04);
        a.physical.spin_rate = Some(2210.4);
        a.physical.vaa = Some(-4.556);
        let mut b = PitchEvent::default();
        b.physical.velocity = Some(95.1);
        b.physical.spin_rate = Some(2211.0);
        b.physical.vaa = None;
        let refs = vec![&a, &b];

        let avg = average_physical(&refs);
        assert_eq!(avg.velocity, Some(95.1));
        assert_eq!(avg.spin_rate, Some(2211.0));
        assert_eq!(avg.vaa, Some(-4.56));
        assert_eq!(avg.extension, None);
    }

    // -- Hitter stats --

    #[test]
    fn hitter_swing_rates() {
        let events = vec![
            pitch(Some(5), "Swinging Strike"),
            pitch(Some(5), "Called Strike"),
            pitch(Some(12), "Foul Tip"),
            pitch(Some(13), "Ball"),
            pitch(Some(2), "Swinging Strike (Blocked)"),
        ];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = HitterStats::compute(&refs);

        assert_eq!(stats.n_swings, 3);
        assert!(approx_eq(stats.swing_pct.unwrap(), 0.6, 1e-12));
        assert!(approx_eq(stats.iz_swing_pct.unwrap(), 2.0 / 3.0, 1e-12));
        assert_eq!(stats.chase_pct, Some(0.5));
        assert_eq!(stats.iz_sw_chase, Some(0.1667));
        assert!(approx_eq(stats.whiff_pct.unwrap(), 2.0 / 3.0, 1e-12));
    }

    #[test]
    fn hitter_whiff_null_without_swings() {
        let events = vec![pitch(Some(5), "Called Strike"), pitch(Some(11), "Ball")];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = HitterStats::compute(&refs);
        assert_eq!(stats.n_swings, 0);
        assert_eq!(stats.whiff_pct, None);
        assert_eq!(stats.chase_pct, Some(0.0));
        assert_eq!(stats.barrel_pct, None);
        assert_eq!(stats.med_la, None);
    }

    #[test]
    fn iz_sw_chase_needs_both_zone_rates() {
        // In-zone pitches only: no chase rate.
        let events = vec![pitch(Some(5), "Swinging Strike"), pitch(Some(1), "Ball")];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = HitterStats::compute(&refs);
        assert_eq!(stats.iz_swing_pct, Some(0.5));
        assert_eq!(stats.chase_pct, None);
        assert_eq!(stats.iz_sw_chase, None);

        // Out-of-zone pitches only: no in-zone swing rate.
        let events = vec![pitch(Some(11), "Foul"), pitch(Some(14), "Ball")];
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = HitterStats::compute(&refs);
        assert_eq!(stats.iz_swing_pct, None);
        assert_eq!(stats.chase_pct, Some(0.5));
        assert_eq!(stats.iz_sw_chase, None);
    }

    #[test]
    fn hitter_batted_ball_stats() {
        let mut events = vec![
            batted("line_drive", Some(104.06), Some(28.0)), // barrel
            batted("ground_ball", Some(90.0), Some(-5.0)),
            batted("fly_ball", Some(99.0), Some(45.0)),
            batted("popup", Some(70.0), Some(60.0)),
            batted("ground_ball", None, Some(2.0)),
        ];
        events[0].xba = Some(0.7);
        events[1].xba = Some(0.2);
        events[0].xslg = Some(1.5);
        let refs: Vec<&PitchEvent> = events.iter().collect();
        let stats = HitterStats::compute(&refs);

        assert_eq!(stats.gb_pct, Some(0.4));
        assert_eq!(stats.ld_pct, Some(0.2));
        assert_eq!(stats.fb_pct, Some(0.4));
        // EV stats use LA > 0 with EV present: 104.06, 99, 70
        assert_eq!(stats.med_ev, Some(99.0));
        assert_eq!(stats.max_ev, Some(104.1));
        // One barrel among four tracked balls
        assert_eq!(stats.barrel_pct, Some(0.25));
        assert_eq!(stats.xba, Some(0.45));
        assert_eq!(stats.xslg, Some(1.5));
        // Median LA over all batted balls: -5, 2, 28, 45, 60
        assert_eq!(stats.med_la, Some(28.0));
    }

    #[test]
    fn hitter_stats_serialize_wire_keys() {
        let stats = HitterStats {
            med_ev: Some(101.2),
            xba: Some(0.301),
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["medEV"], 101.2);
        assert_eq!(json["xBA"], 0.301);
        assert_eq!(json["nSwings"], 0);
        assert!(json["medLA"].is_null());
    }
}
