// Tie-aware percentile ranking within peer groups.
//
// Percentile = (below + 0.5 * (equal - 1)) / (n - 1) * 100, where `below`
// and `equal` count peer values strictly less than / equal to the row's own
// value and `n` counts peers that have a value at all. Rows without a value
// get `None` and never influence anyone else's rank.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Percentile assigned to every valued row when fewer than two peers have a
/// value (there is no spread to rank against).
pub const DEGENERATE_PERCENTILE: u8 = 50;

/// Suffix appended to a metric key to form its percentile field name.
pub const PERCENTILE_SUFFIX: &str = "_pctl";

// ---------------------------------------------------------------------------
// Metric traits
// ---------------------------------------------------------------------------

/// A named, rankable statistic.
pub trait Metric: Copy + Ord + Debug {
    /// Wire key of the base value (e.g. `"velocity"`, `"izPct"`).
    fn key(self) -> &'static str;

    /// Decimal places kept when this metric is averaged across a peer group.
    fn summary_places(self) -> i32;
}

/// A leaderboard row that exposes metric values and stores percentiles.
pub trait MetricRow<M: Metric> {
    fn metric_value(&self, metric: M) -> Option<f64>;

    fn percentiles(&self) -> &Percentiles<M>;

    fn percentiles_mut(&mut self) -> &mut Percentiles<M>;

    /// Row-level average break tilt in minutes, for row types that track one.
    fn tilt_minutes(&self) -> Option<u32> {
        None
    }
}

// ---------------------------------------------------------------------------
// Percentiles container
// ---------------------------------------------------------------------------

/// Percentile fields of one row. A metric appears here once it has been
/// ranked over the row's peer group, with `None` when the base value was
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percentiles<M: Metric> {
    ranks: BTreeMap<M, Option<u8>>,
}

impl<M: Metric> Default for Percentiles<M> {
    fn default() -> Self {
        Self {
            ranks: BTreeMap::new(),
        }
    }
}

impl<M: Metric> Percentiles<M> {
    pub fn get(&self, metric: M) -> Option<u8> {
        self.ranks.get(&metric).copied().flatten()
    }

    pub fn is_ranked(&self, metric: M) -> bool {
        self.ranks.contains_key(&metric)
    }

    pub fn set(&mut self, metric: M, rank: Option<u8>) {
        self.ranks.insert(metric, rank);
    }

    /// Flip a percentile so that low base values rank high. `None` stays
    /// `None`.
    pub fn invert(&mut self, metric: M) {
        if let Some(Some(p)) = self.ranks.get_mut(&metric) {
            *p = 100 - *p;
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl<M: Metric> Serialize for Percentiles<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ranks.len()))?;
        for (metric, rank) in &self.ranks {
            map.serialize_entry(&format!("{}{}", metric.key(), PERCENTILE_SUFFIX), rank)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Core ranking
// ---------------------------------------------------------------------------

/// Percentile rank of each value against all the present values in the slice.
///
/// Output is index-aligned with the input.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<u8>> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    let n = sorted.len();

    if n < 2 {
        return values
            .iter()
            .map(|v| v.map(|_| DEGENERATE_PERCENTILE))
            .collect();
    }

    sorted.sort_by(f64::total_cmp);
    // n >= 2 here, so the max(1) guard never changes the divisor.
    let spread = (n - 1).max(1) as f64;

    values
        .iter()
        .map(|value| {
            value.map(|v| {
                let below = sorted.partition_point(|&x| x < v);
                let through = sorted.partition_point(|&x| x <= v);
                let equal = through - below;
                let pctl = (below as f64 + 0.5 * (equal as f64 - 1.0)) / spread * 100.0;
                pctl.round_ties_even().clamp(0.0, 100.0) as u8
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Peer groups
// ---------------------------------------------------------------------------

/// A fixed partition of a row slice into comparison sets, stored as row
/// indices. Groups appear in the order their first row appears.
///
/// Built once per row slice; reordering the slice afterwards makes the
/// indices (and any ranks computed from them) stale.
#[derive(Debug, Clone)]
pub struct PeerGroups<K> {
    groups: Vec<(K, Vec<usize>)>,
    row_count: usize,
}

impl<K: Eq + Hash + Clone> PeerGroups<K> {
    pub fn by_key<R, F>(rows: &[R], mut key: F) -> Self
    where
        F: FnMut(&R) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<usize>)> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let k = key(row);
            match index.get(&k) {
                Some(&slot) => groups[slot].1.push(i),
                None => {
                    index.insert(k.clone(), groups.len());
                    groups.push((k, vec![i]));
                }
            }
        }
        Self {
            groups,
            row_count: rows.len(),
        }
    }
}

impl PeerGroups<()> {
    /// Every row in one group.
    pub fn whole<R>(rows: &[R]) -> Self {
        let groups = if rows.is_empty() {
            Vec::new()
        } else {
            vec![((), (0..rows.len()).collect())]
        };
        Self {
            groups,
            row_count: rows.len(),
        }
    }
}

impl<K> PeerGroups<K> {
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[usize])> {
        self.groups.iter().map(|(k, idx)| (k, idx.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rank one metric within every group, writing a percentile field
    /// (possibly `None`) onto every row.
    ///
    /// # Panics
    ///
    /// If `rows` is not the same length as the slice the groups were built
    /// over.
    pub fn rank<M, R>(&self, rows: &mut [R], metric: M)
    where
        M: Metric,
        R: MetricRow<M>,
    {
        assert_eq!(rows.len(), self.row_count, "peer groups built over a different slice");
        for (_, members) in &self.groups {
            let values: Vec<Option<f64>> =
                members.iter().map(|&i| rows[i].metric_value(metric)).collect();
            let ranks = percentile_ranks(&values);
            for (&i, rank) in members.iter().zip(ranks) {
                rows[i].percentiles_mut().set(metric, rank);
            }
        }
    }

    pub fn rank_all<M, R>(&self, rows: &mut [R], metrics: &[M])
    where
        M: Metric,
        R: MetricRow<M>,
    {
        for &metric in metrics {
            self.rank(rows, metric);
        }
    }

    /// True when every row of every group carries a percentile for `metric`.
    pub fn all_ranked<M, R>(&self, rows: &[R], metric: M) -> bool
    where
        M: Metric,
        R: MetricRow<M>,
    {
        self.groups
            .iter()
            .flat_map(|(_, members)| members.iter())
            .all(|&i| rows[i].percentiles().is_ranked(metric))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
