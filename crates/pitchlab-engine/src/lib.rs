// Library root: the leaderboard aggregation engine.
//
// Data flows strictly forward: records -> cohorts -> per-cohort metrics ->
// percentile ranks -> composite ranks -> league averages. Nothing here
// performs I/O; callers hand in normalized events and get back in-memory
// boards ready for serialization.

pub mod composite;
pub mod grouping;
pub mod hitting;
pub mod leaderboard;
pub mod league;
pub mod percentile;
pub mod pitching;
pub mod record;
pub mod stats;
pub mod tilt;
