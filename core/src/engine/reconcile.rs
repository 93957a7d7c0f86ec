//! Per-entry reconciliation audit.
//!
//! Decides whether a cached entry still corresponds to a live maintained
//! effect on the subject. The relaxed audit rejects any finite remaining
//! duration; the strict audit additionally checks instance count parity
//! against the maintained variant's sub-effects and only treats durations
//! below the practically-infinite floor as corruption.

use std::fmt;

use upkeep_types::Tuning;

use crate::cache::{EntryStats, MaintainedPair};
use crate::host::ActiveEffectState;
use crate::spell::SpellDefinition;

/// Why an entry is dropped from maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    Inactive,
    MagnitudeDropped,
    FiniteDuration,
    MissingSubEffects,
    ForeignInstances,
    CountMismatch,
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotFound => "maintained effect is no longer present",
            Self::Inactive => "maintained effect is inactive or dispelled",
            Self::MagnitudeDropped => "effect magnitude fell below the recorded value",
            Self::FiniteDuration => "effect duration became finite",
            Self::MissingSubEffects => "fewer active instances than sub-effects",
            Self::ForeignInstances => "conflicting instances from another spell",
            Self::CountMismatch => "an exclusive sub-effect is no longer represented",
        };
        f.write_str(reason)
    }
}

/// Audit one cached entry against the subject's active effects. `None`
/// means the entry is healthy.
pub fn audit_entry(
    pair: MaintainedPair,
    stats: EntryStats,
    maint_def: Option<&SpellDefinition>,
    active: &[ActiveEffectState],
    strict: bool,
    tuning: &Tuning,
) -> Option<Removal> {
    let Some(def) = maint_def else {
        // The variant fell out of the registry entirely.
        return Some(Removal::NotFound);
    };
    audit_with_def(pair, stats, def, active, strict, tuning)
}

fn audit_with_def(
    pair: MaintainedPair,
    stats: EntryStats,
    def: &SpellDefinition,
    active: &[ActiveEffectState],
    strict: bool,
    tuning: &Tuning,
) -> Option<Removal> {
    let owned: Vec<&ActiveEffectState> =
        active.iter().filter(|a| a.spell == pair.maintained).collect();
    if owned.is_empty() {
        return Some(Removal::NotFound);
    }

    for inst in &owned {
        if !inst.is_active() {
            return Some(Removal::Inactive);
        }
        // Negative magnitudes are drains and scale with the recorded cost,
        // not the base magnitude; only positive instances are compared.
        let expected = def
            .effects
            .iter()
            .find(|e| e.base_effect == inst.base_effect)
            .map(|e| e.magnitude)
            .unwrap_or(stats.base_magnitude);
        if inst.magnitude >= 0.0 && (inst.magnitude as i32) < (expected as i32) {
            return Some(Removal::MagnitudeDropped);
        }
    }

    if !strict {
        // Constant effects report a remaining duration of zero; anything
        // else means the instance decayed into a timed effect.
        for inst in &owned {
            if inst.remaining >= 0.0 && inst.remaining as u32 != 0 {
                return Some(Removal::FiniteDuration);
            }
        }
        return None;
    }

    strict_audit(pair, def, active, &owned, tuning)
}

fn strict_audit(
    pair: MaintainedPair,
    def: &SpellDefinition,
    active: &[ActiveEffectState],
    owned: &[&ActiveEffectState],
    tuning: &Tuning,
) -> Option<Removal> {
    let expected = def.effects.len();
    if owned.len() < expected {
        return Some(Removal::MissingSubEffects);
    }

    let candidates: Vec<&ActiveEffectState> = active
        .iter()
        .filter(|a| def.effects.iter().any(|e| e.base_effect == a.base_effect))
        .collect();
    if candidates.len() > expected {
        if candidates.iter().any(|a| a.spell != pair.maintained) {
            return Some(Removal::ForeignInstances);
        }
        // Surplus instances are all ours; tolerated as long as every
        // declared-exclusive sub-effect is still represented.
        for blueprint in def.effects.iter().filter(|e| e.exclusive) {
            if !owned.iter().any(|a| a.base_effect == blueprint.base_effect) {
                return Some(Removal::CountMismatch);
            }
        }
        return None;
    }

    // Exact parity. A remaining duration below the floor means the
    // constant effect was corrupted into a timed one; at or above the
    // floor it is practically infinite and left alone.
    for inst in owned {
        if inst.remaining > 0.0 && inst.remaining < tuning.infinite_duration_floor {
            return Some(Removal::FiniteDuration);
        }
    }
    None
}
