//! The maintained-spell cache.
//!
//! Pure storage for the base-spell → synthesized-variant association.
//! Decision logic lives in the [`MaintenanceEngine`](crate::engine::MaintenanceEngine).

use hashbrown::HashMap;

use crate::bimap::BiMap;
use crate::forms::FormId;

/// The two synthesized variants backing one maintained spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaintainedPair {
    /// Toggled constant-effect version of the base spell.
    pub maintained: FormId,
    /// Companion effect draining the upkeep cost.
    pub debuff: FormId,
}

/// Recorded per-entry values the reconciler validates against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntryStats {
    pub upkeep_cost: f32,
    /// Magnitude of the base spell's first effect at conversion time.
    pub base_magnitude: f32,
}

/// Bijective base-spell ↔ variant-pair cache with per-entry stats.
///
/// Entries are added only after successful synthesis and removed only by
/// explicit purge or reconciliation failure.
#[derive(Debug, Clone, Default)]
pub struct SpellCache {
    map: BiMap<FormId, MaintainedPair>,
    stats: HashMap<FormId, EntryStats>,
}

impl SpellCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, base: FormId, pair: MaintainedPair, stats: EntryStats) {
        self.map.insert(base, pair);
        self.stats.insert(base, stats);
    }

    pub fn remove(&mut self, base: FormId) -> Option<(MaintainedPair, EntryStats)> {
        let pair = self.map.remove_key(&base)?;
        let stats = self.stats.remove(&base).unwrap_or_default();
        Some((pair, stats))
    }

    pub fn contains_base(&self, base: FormId) -> bool {
        self.map.contains_key(&base)
    }

    pub fn pair_for(&self, base: FormId) -> Option<MaintainedPair> {
        self.map.value_for(&base).copied()
    }

    pub fn base_for(&self, pair: &MaintainedPair) -> Option<FormId> {
        self.map.key_for(pair).copied()
    }

    /// Reverse lookup by either synthesized identity.
    pub fn base_for_variant(&self, variant: FormId) -> Option<FormId> {
        self.map
            .iter()
            .find(|(_, pair)| pair.maintained == variant || pair.debuff == variant)
            .map(|(base, _)| *base)
    }

    pub fn stats(&self, base: FormId) -> Option<EntryStats> {
        self.stats.get(&base).copied()
    }

    pub fn set_upkeep_cost(&mut self, base: FormId, cost: f32) {
        if let Some(stats) = self.stats.get_mut(&base) {
            stats.upkeep_cost = cost;
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FormId, MaintainedPair, EntryStats)> + '_ {
        self.map.iter().map(|(base, pair)| {
            let stats = self.stats.get(base).copied().unwrap_or_default();
            (*base, *pair, stats)
        })
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.stats.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
