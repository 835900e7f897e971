// Pitch event records and their normalization from raw sheet rows.
//
// Raw rows arrive as column -> string maps. Every numeric column is optional:
// empty, non-numeric, or non-finite cells normalize to `None` ("unknown"),
// never to zero.

use std::collections::HashMap;

use serde::Serialize;

use crate::percentile::Metric;
use crate::tilt::TiltValue;

/// One raw row as exported from the source sheet: column name -> cell text.
pub type RawRecord = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which participant the actor column of a record identifies.
///
/// Pitching exports carry `Pitcher`/`Throws`; hitting exports carry
/// `Hitter`/`Stands`. Everything else about the row shape is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Pitcher,
    Hitter,
}

impl Role {
    pub fn actor_column(self) -> &'static str {
        match self {
            Role::Pitcher => "Pitcher",
            Role::Hitter => "Hitter",
        }
    }

    pub fn handedness_column(self) -> &'static str {
        match self {
            Role::Pitcher => "Throws",
            Role::Hitter => "Stands",
        }
    }
}

// ---------------------------------------------------------------------------
// Enumerated cells
// ---------------------------------------------------------------------------

/// Pitch outcome as recorded in the `Description` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    SwingingStrike,
    SwingingStrikeBlocked,
    CalledStrike,
    Foul,
    FoulTip,
    InPlay,
    /// Balls, hit-by-pitch, and anything else the trackers emit.
    Other(String),
}

impl Description {
    pub fn parse(text: &str) -> Self {
        match text {
            "Swinging Strike" => Description::SwingingStrike,
            "Swinging Strike (Blocked)" => Description::SwingingStrikeBlocked,
            "Called Strike" => Description::CalledStrike,
            "Foul" => Description::Foul,
            "Foul Tip" => Description::FoulTip,
            "In Play" => Description::InPlay,
            other => Description::Other(other.to_string()),
        }
    }

    /// Called strike or swinging strike (CSW). The blocked variant is excluded.
    pub fn is_called_or_swinging_strike(&self) -> bool {
        matches!(self, Description::CalledStrike | Description::SwingingStrike)
    }

    /// Swing set used for pitcher-side chase rate.
    pub fn is_pitcher_chase_swing(&self) -> bool {
        matches!(
            self,
            Description::SwingingStrike | Description::InPlay | Description::Foul
        )
    }

    /// Broad swing set used on the hitter side.
    pub fn is_swing(&self) -> bool {
        matches!(
            self,
            Description::SwingingStrike
                | Description::SwingingStrikeBlocked
                | Description::Foul
                | Description::FoulTip
                | Description::InPlay
        )
    }

    /// Swing-and-miss, including blocked swinging strikes.
    pub fn is_whiff(&self) -> bool {
        matches!(
            self,
            Description::SwingingStrike | Description::SwingingStrikeBlocked
        )
    }
}

/// Batted-ball classification from the `BB Type` column.
///
/// Any non-empty value marks the pitch as a batted ball, even when the class
/// is not one of the four known ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattedBallType {
    GroundBall,
    LineDrive,
    FlyBall,
    Popup,
    Other(String),
}

impl BattedBallType {
    pub fn parse(text: &str) -> Self {
        match text {
            "ground_ball" => BattedBallType::GroundBall,
            "line_drive" => BattedBallType::LineDrive,
            "fly_ball" => BattedBallType::FlyBall,
            "popup" => BattedBallType::Popup,
            other => BattedBallType::Other(other.to_string()),
        }
    }

    /// Fly-ball class for rate purposes merges fly balls and popups.
    pub fn is_fly_ball_class(&self) -> bool {
        matches!(self, BattedBallType::FlyBall | BattedBallType::Popup)
    }
}

// ---------------------------------------------------------------------------
// Physical metrics
// ---------------------------------------------------------------------------

/// The eleven continuous tracking metrics averaged per pitch cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhysicalMetric {
    Velocity,
    SpinRate,
    IndVertBrk,
    HorzBrk,
    RelPosZ,
    RelPosX,
    Extension,
    Vaa,
    Haa,
    Vra,
    Hra,
}

impl PhysicalMetric {
    pub const ALL: [PhysicalMetric; 11] = [
        PhysicalMetric::Velocity,
        PhysicalMetric::SpinRate,
        PhysicalMetric::IndVertBrk,
        PhysicalMetric::HorzBrk,
        PhysicalMetric::RelPosZ,
        PhysicalMetric::RelPosX,
        PhysicalMetric::Extension,
        PhysicalMetric::Vaa,
        PhysicalMetric::Haa,
        PhysicalMetric::Vra,
        PhysicalMetric::Hra,
    ];

    /// Source column name in the raw export.
    pub fn column(self) -> &'static str {
        match self {
            PhysicalMetric::Velocity => "Velocity",
            PhysicalMetric::SpinRate => "Spin Rate",
            PhysicalMetric::IndVertBrk => "IndVertBrk",
            PhysicalMetric::HorzBrk => "HorzBrk",
            PhysicalMetric::RelPosZ => "RelPosZ",
            PhysicalMetric::RelPosX => "RelPosX",
            PhysicalMetric::Extension => "Extension",
            PhysicalMetric::Vaa => "VAA",
            PhysicalMetric::Haa => "HAA",
            PhysicalMetric::Vra => "VRA",
            PhysicalMetric::Hra => "HRA",
        }
    }

    /// Decimal places kept on a cohort average: spin rate to the integer,
    /// approach angles to hundredths, everything else to tenths.
    pub fn cohort_places(self) -> i32 {
        match self {
            PhysicalMetric::SpinRate => 0,
            PhysicalMetric::Vaa | PhysicalMetric::Haa | PhysicalMetric::Vra | PhysicalMetric::Hra => 2,
            _ => 1,
        }
    }
}

impl Metric for PhysicalMetric {
    fn key(self) -> &'static str {
        match self {
            PhysicalMetric::Velocity => "velocity",
            PhysicalMetric::SpinRate => "spinRate",
            PhysicalMetric::IndVertBrk => "indVertBrk",
            PhysicalMetric::HorzBrk => "horzBrk",
            PhysicalMetric::RelPosZ => "relPosZ",
            PhysicalMetric::RelPosX => "relPosX",
            PhysicalMetric::Extension => "extension",
            PhysicalMetric::Vaa => "vaa",
            PhysicalMetric::Haa => "haa",
            PhysicalMetric::Vra => "vra",
            PhysicalMetric::Hra => "hra",
        }
    }

    fn summary_places(self) -> i32 {
        2
    }
}

/// One value per physical metric. Used both for a single pitch and for a
/// cohort's rounded averages; the serialized field names are the wire keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalMetrics {
    pub velocity: Option<f64>,
    pub spin_rate: Option<f64>,
    pub ind_vert_brk: Option<f64>,
    pub horz_brk: Option<f64>,
    pub rel_pos_z: Option<f64>,
    pub rel_pos_x: Option<f64>,
    pub extension: Option<f64>,
    pub vaa: Option<f64>,
    pub haa: Option<f64>,
    pub vra: Option<f64>,
    pub hra: Option<f64>,
}

impl PhysicalMetrics {
    pub fn get(&self, metric: PhysicalMetric) -> Option<f64> {
        match metric {
            PhysicalMetric::Velocity => self.velocity,
            PhysicalMetric::SpinRate => self.spin_rate,
            PhysicalMetric::IndVertBrk => self.ind_vert_brk,
            PhysicalMetric::HorzBrk => self.horz_brk,
            PhysicalMetric::RelPosZ => self.rel_pos_z,
            PhysicalMetric::RelPosX => self.rel_pos_x,
            PhysicalMetric::Extension => self.extension,
            PhysicalMetric::Vaa => self.vaa,
            PhysicalMetric::Haa => self.haa,
            PhysicalMetric::Vra => self.vra,
            PhysicalMetric::Hra => self.hra,
        }
    }

    pub fn set(&mut self, metric: PhysicalMetric, value: Option<f64>) {
        let slot = match metric {
            PhysicalMetric::Velocity => &mut self.velocity,
            PhysicalMetric::SpinRate => &mut self.spin_rate,
            PhysicalMetric::IndVertBrk => &mut self.ind_vert_brk,
            PhysicalMetric::HorzBrk => &mut self.horz_brk,
            PhysicalMetric::RelPosZ => &mut self.rel_pos_z,
            PhysicalMetric::RelPosX => &mut self.rel_pos_x,
            PhysicalMetric::Extension => &mut self.extension,
            PhysicalMetric::Vaa => &mut self.vaa,
            PhysicalMetric::Haa => &mut self.haa,
            PhysicalMetric::Vra => &mut self.vra,
            PhysicalMetric::Hra => &mut self.hra,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// PitchEvent
// ---------------------------------------------------------------------------

/// One observed pitch, normalized. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchEvent {
    /// Pitcher or hitter name, depending on the export's role. Never empty.
    pub actor: String,
    pub team: Option<String>,
    /// `Throws` for pitchers, `Stands` for hitters.
    pub handedness: Option<String>,
    pub pitch_type: Option<String>,
    /// Zone code, 1-9 in the strike zone and 11-14 outside it.
    pub zone: Option<i32>,
    pub description: Option<Description>,
    pub bb_type: Option<BattedBallType>,
    pub physical: PhysicalMetrics,
    pub break_tilt: Option<TiltValue>,
    pub exit_velocity: Option<f64>,
    pub launch_angle: Option<f64>,
    pub xba: Option<f64>,
    pub xslg: Option<f64>,
}

impl PitchEvent {
    /// Normalize a raw row. Returns `None` when the actor column is missing
    /// or blank; such rows never reach the engine.
    pub fn from_raw(raw: &RawRecord, role: Role) -> Option<Self> {
        let actor = cell(raw, role.actor_column())?.to_string();

        let mut physical = PhysicalMetrics::default();
        for metric in PhysicalMetric::ALL {
            physical.set(metric, cell(raw, metric.column()).and_then(parse_f64));
        }

        Some(PitchEvent {
            actor,
            team: cell(raw, "Team").map(str::to_string),
            handedness: cell(raw, role.handedness_column()).map(str::to_string),
            pitch_type: cell(raw, "Pitch Type").map(str::to_string),
            zone: cell(raw, "Zone").and_then(parse_int),
            description: cell(raw, "Description").map(Description::parse),
            bb_type: cell(raw, "BB Type").map(BattedBallType::parse),
            physical,
            break_tilt: cell(raw, "Break Tilt").map(TiltValue::from_cell),
            exit_velocity: cell(raw, "Exit Velocity").and_then(parse_f64),
            launch_angle: cell(raw, "Launch Angle").and_then(parse_f64),
            xba: cell(raw, "xBA").and_then(parse_f64),
            xslg: cell(raw, "xSLG").and_then(parse_f64),
        })
    }

    pub fn is_batted_ball(&self) -> bool {
        self.bb_type.is_some()
    }
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Trimmed cell text, with empty cells treated as absent.
fn cell<'a>(raw: &'a RawRecord, column: &str) -> Option<&'a str> {
    raw.get(column)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Parse a numeric cell. Non-numeric and non-finite text is unknown.
pub fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer cell, accepting float spellings such as `"5.0"`
/// (truncated toward zero).
pub fn parse_int(text: &str) -> Option<i32> {
    let value = parse_f64(text)?;
    if value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -- Actor handling --

    #[test]
    fn missing_actor_is_discarded() {
        let row = raw(&[("Team", "NYY"), ("Velocity", "95.1")]);
        assert!(PitchEvent::from_raw(&row, Role::Pitcher).is_none());
    }

    #[test]
    fn blank_actor_is_discarded() {
        let row = raw(&[("Pitcher", "   "), ("Velocity", "95.1")]);
        assert!(PitchEvent::from_raw(&row, Role::Pitcher).is_none());
    }

    #[test]
    fn role_selects_actor_and_handedness_columns() {
        let row = raw(&[
            ("Pitcher", "Gerrit Cole"),
            ("Hitter", "Aaron Judge"),
            ("Throws", "R"),
            ("Stands", "L"),
        ]);
        let as_pitcher = PitchEvent::from_raw(&row, Role::Pitcher).unwrap();
        assert_eq!(as_pitcher.actor, "Gerrit Cole");
        assert_eq!(as_pitcher.handedness.as_deref(), Some("R"));

        let as_hitter = PitchEvent::from_raw(&row, Role::Hitter).unwrap();
        assert_eq!(as_hitter.actor, "Aaron Judge");
        assert_eq!(as_hitter.handedness.as_deref(), Some("L"));
    }

    // -- Numeric coercion --

    #[test]
    fn numeric_cells_coerce_to_unknown() {
        let row = raw(&[
            ("Pitcher", "A"),
            ("Velocity", "95.5"),
            ("Spin Rate", "n/a"),
            ("VAA", ""),
            ("Exit Velocity", "NaN"),
            ("Launch Angle", "inf"),
        ]);
        let event = PitchEvent::from_raw(&row, Role::Pitcher).unwrap();
        assert_eq!(event.physical.velocity, Some(95.5));
        assert_eq!(event.physical.spin_rate, None);
        assert_eq!(event.physical.vaa, None);
        assert_eq!(event.exit_velocity, None);
        assert_eq!(event.launch_angle, None);
    }

    #[test]
    fn zone_accepts_float_spelling() {
        assert_eq!(parse_int("5"), Some(5));
        assert_eq!(parse_int("13.0"), Some(13));
        assert_eq!(parse_int(" 7 "), Some(7));
        assert_eq!(parse_int("zone"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn empty_strings_are_absent() {
        let row = raw(&[
            ("Pitcher", "A"),
            ("Team", ""),
            ("Pitch Type", ""),
            ("BB Type", ""),
            ("Description", ""),
        ]);
        let event = PitchEvent::from_raw(&row, Role::Pitcher).unwrap();
        assert!(event.team.is_none());
        assert!(event.pitch_type.is_none());
        assert!(event.bb_type.is_none());
        assert!(event.description.is_none());
        assert!(!event.is_batted_ball());
    }

    // -- Enumerated cells --

    #[test]
    fn description_swing_sets() {
        let foul_tip = Description::parse("Foul Tip");
        assert!(foul_tip.is_swing());
        assert!(!foul_tip.is_pitcher_chase_swing());

        let blocked = Description::parse("Swinging Strike (Blocked)");
        assert!(blocked.is_whiff());
        assert!(blocked.is_swing());
        assert!(!blocked.is_called_or_swinging_strike());

        let ball = Description::parse("Ball");
        assert_eq!(ball, Description::Other("Ball".into()));
        assert!(!ball.is_swing());
    }

    #[test]
    fn unknown_batted_ball_type_still_counts_as_batted_ball() {
        let row = raw(&[("Hitter", "H"), ("BB Type", "bunt")]);
        let event = PitchEvent::from_raw(&row, Role::Hitter).unwrap();
        assert!(event.is_batted_ball());
        assert_eq!(event.bb_type, Some(BattedBallType::Other("bunt".into())));
    }

    #[test]
    fn popup_merges_into_fly_ball_class() {
        assert!(BattedBallType::Popup.is_fly_ball_class());
        assert!(BattedBallType::FlyBall.is_fly_ball_class());
        assert!(!BattedBallType::LineDrive.is_fly_ball_class());
    }
}
