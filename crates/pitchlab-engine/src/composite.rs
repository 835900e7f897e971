// Two-pass ranking for composite scores.
//
// A composite (the stuff score) is built from percentiles of other metrics,
// then ranked itself within the same peer groups. The stages are separate
// types: `FirstPass` owns the rows and their fixed peer groups after the
// base metrics are ranked, and only `FirstPass::second_pass` can produce the
// composite and its percentile. Rows cannot be regrouped in between.

use std::collections::BTreeSet;

use tracing::debug;

use crate::percentile::{Metric, MetricRow, PeerGroups};

/// A composite metric: the rounded mean of two input percentiles, written
/// onto each row and then ranked as `output`.
#[derive(Debug, Clone, Copy)]
pub struct Composite<M> {
    pub inputs: [M; 2],
    pub output: M,
}

/// A row type that can store a composite score.
pub trait CompositeRow<M: Metric>: MetricRow<M> {
    fn set_composite(&mut self, metric: M, score: Option<u8>);
}

/// Rounded mean of two percentiles; `None` unless both are present.
pub fn combine_percentiles(a: Option<u8>, b: Option<u8>) -> Option<u8> {
    let (a, b) = (a?, b?);
    let mean = (f64::from(a) + f64::from(b)) / 2.0;
    Some(mean.round_ties_even() as u8)
}

// ---------------------------------------------------------------------------
// Stage 1
// ---------------------------------------------------------------------------

/// Rows with their base metrics ranked over fixed peer groups.
#[derive(Debug)]
pub struct FirstPass<R, K, M: Metric> {
    rows: Vec<R>,
    peers: PeerGroups<K>,
    ranked: BTreeSet<M>,
}

impl<R, K, M> FirstPass<R, K, M>
where
    M: Metric,
    R: MetricRow<M>,
{
    /// Rank every base metric within `peers`, which must have been built
    /// over `rows` in their current order.
    pub fn run(mut rows: Vec<R>, peers: PeerGroups<K>, metrics: &[M]) -> Self {
        peers.rank_all(&mut rows, metrics);
        Self {
            rows,
            peers,
            ranked: metrics.iter().copied().collect(),
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_ranked(&self, metric: M) -> bool {
        self.ranked.contains(&metric)
    }

    /// Compute the composite on every row, then rank it within the same
    /// peer groups. Any composite input that stage 1 did not rank is ranked
    /// here first, so no row is scored from a missing input percentile.
    pub fn second_pass(mut self, composite: Composite<M>) -> SecondPass<R, K>
    where
        R: CompositeRow<M>,
    {
        for input in composite.inputs {
            if !self.ranked.contains(&input) {
                debug!("ranking composite input {:?} before second pass", input);
                self.peers.rank(&mut self.rows, input);
                self.ranked.insert(input);
            }
            debug_assert!(self.peers.all_ranked(&self.rows, input));
        }

        let [first, second] = composite.inputs;
        for row in &mut self.rows {
            let score = combine_percentiles(
                row.percentiles().get(first),
                row.percentiles().get(second),
            );
            row.set_composite(composite.output, score);
        }

        self.peers.rank(&mut self.rows, composite.output);

        SecondPass {
            rows: self.rows,
            peers: self.peers,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 2
// ---------------------------------------------------------------------------

/// Rows with base and composite percentiles in place.
#[derive(Debug)]
pub struct SecondPass<R, K> {
    rows: Vec<R>,
    peers: PeerGroups<K>,
}

impl<R, K> SecondPass<R, K> {
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn peers(&self) -> &PeerGroups<K> {
        &self.peers
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
