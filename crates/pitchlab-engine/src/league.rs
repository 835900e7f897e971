// League averages: one summary record per peer group.
//
// Each tracked metric is the unweighted mean over member rows that have a
// value for it; rows without the metric are left out of that mean rather than
// counted as zero.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::percentile::{Metric, MetricRow};
use crate::stats::{mean, round_to};
use crate::tilt::{circular_mean_minutes, tilt_display};

/// Group-level averages plus the member count.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueAverage<M: Metric> {
    averages: BTreeMap<M, f64>,
    break_tilt_minutes: Option<u32>,
    count: usize,
}

impl<M: Metric> LeagueAverage<M> {
    /// Summarize `rows` over `metrics`. Averages are rounded to each metric's
    /// summary precision. The break tilt average is the circular mean of the
    /// rows' own tilt minutes, present when at least one row has one.
    pub fn summarize<'a, R, I>(rows: I, metrics: &[M]) -> Self
    where
        R: MetricRow<M> + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let rows: Vec<&R> = rows.into_iter().collect();

        let mut averages = BTreeMap::new();
        for &metric in metrics {
            if let Some(avg) = mean(rows.iter().map(|r| r.metric_value(metric))) {
                averages.insert(metric, round_to(avg, metric.summary_places()));
            }
        }

        let tilts: Vec<u32> = rows.iter().filter_map(|r| r.tilt_minutes()).collect();

        Self {
            averages,
            break_tilt_minutes: circular_mean_minutes(&tilts),
            count: rows.len(),
        }
    }

    pub fn get(&self, metric: M) -> Option<f64> {
        self.averages.get(&metric).copied()
    }

    pub fn break_tilt_minutes(&self) -> Option<u32> {
        self.break_tilt_minutes
    }

    pub fn break_tilt(&self) -> Option<String> {
        self.break_tilt_minutes.map(tilt_display)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Serialized as a flat object: one key per averaged metric, the tilt pair
/// when present, then `count`. Metrics with no data are omitted.
impl<M: Metric> Serialize for LeagueAverage<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (metric, value) in &self.averages {
            map.serialize_entry(metric.key(), value)?;
        }
        if let Some(minutes) = self.break_tilt_minutes {
            map.serialize_entry("breakTiltMinutes", &minutes)?;
            map.serialize_entry("breakTilt", &tilt_display(minutes))?;
        }
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
