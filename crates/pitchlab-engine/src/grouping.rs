// Cohort grouping by composite identity keys.
//
// Each grouping is an independent pass over the event slice: every event
// lands in exactly one cohort, and cohorts come out in the order their first
// member was seen so downstream ordering is deterministic.

use std::collections::HashMap;
use std::hash::Hash;

use crate::record::PitchEvent;

// ---------------------------------------------------------------------------
// Key structs
// ---------------------------------------------------------------------------

/// Pitch-level cohort: one pitcher's one pitch type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PitchTypeKey {
    pub pitcher: String,
    pub team: Option<String>,
    pub pitch_type: Option<String>,
    pub throws: Option<String>,
}

impl PitchTypeKey {
    pub fn of(event: &PitchEvent) -> Self {
        Self {
            pitcher: event.actor.clone(),
            team: event.team.clone(),
            pitch_type: event.pitch_type.clone(),
            throws: event.handedness.clone(),
        }
    }
}

/// Pitcher-level cohort: all of one pitcher's pitches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PitcherKey {
    pub pitcher: String,
    pub team: Option<String>,
    pub throws: Option<String>,
}

impl PitcherKey {
    pub fn of(event: &PitchEvent) -> Self {
        Self {
            pitcher: event.actor.clone(),
            team: event.team.clone(),
            throws: event.handedness.clone(),
        }
    }
}

/// Hitter-level cohort: all pitches one hitter saw from one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HitterKey {
    pub hitter: String,
    pub team: Option<String>,
    pub stands: Option<String>,
}

impl HitterKey {
    pub fn of(event: &PitchEvent) -> Self {
        Self {
            hitter: event.actor.clone(),
            team: event.team.clone(),
            stands: event.handedness.clone(),
        }
    }
}

/// Actor + team, ignoring handedness and pitch type. Denominator for usage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorTeamKey {
    pub actor: String,
    pub team: Option<String>,
}

impl ActorTeamKey {
    pub fn of(event: &PitchEvent) -> Self {
        Self {
            actor: event.actor.clone(),
            team: event.team.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cohorts
// ---------------------------------------------------------------------------

/// Key -> member events, in first-seen order.
#[derive(Debug, Clone)]
pub struct Cohorts<'a, K> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<&'a PitchEvent>)>,
}

impl<'a, K: Eq + Hash + Clone> Cohorts<'a, K> {
    pub fn get(&self, key: &K) -> Option<&[&'a PitchEvent]> {
        self.index.get(key).map(|&i| self.groups[i].1.as_slice())
    }
}

impl<'a, K> Cohorts<'a, K> {
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[&'a PitchEvent])> {
        self.groups.iter().map(|(k, events)| (k, events.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total events across all cohorts.
    pub fn event_count(&self) -> usize {
        self.groups.iter().map(|(_, events)| events.len()).sum()
    }
}

impl<'a, K> IntoIterator for Cohorts<'a, K> {
    type Item = (K, Vec<&'a PitchEvent>);
    type IntoIter = std::vec::IntoIter<(K, Vec<&'a PitchEvent>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Partition events by `key`.
pub fn group_by<'a, I, K, F>(events: I, mut key: F) -> Cohorts<'a, K>
where
    I: IntoIterator<Item = &'a PitchEvent>,
    K: Eq + Hash + Clone,
    F: FnMut(&PitchEvent) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a PitchEvent>)> = Vec::new();

    for event in events {
        let k = key(event);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(event),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![event]));
            }
        }
    }

    Cohorts { index, groups }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
