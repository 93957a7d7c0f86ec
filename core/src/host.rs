//! Collaborator interfaces into the host engine.
//!
//! Everything the maintenance engine needs from the host is behind these
//! two traits: the form registry (catalog lookups, synthesized-form
//! registration, well-known forms) and the subject (the player actor's
//! resource pool, spell list and active effects). The host bridge drives
//! the engine through [`MaintenanceEngine::tick`](crate::engine::MaintenanceEngine::tick)
//! and the lifecycle/cast entry points; the engine never reaches into host
//! memory directly.

use crate::forms::{FormId, SpellKey};
use crate::spell::SpellDefinition;

/// Snapshot of one active effect instance on the subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffectState {
    /// Spell this instance was applied from.
    pub spell: FormId,
    /// Shared effect-setting form behind the instance.
    pub base_effect: FormId,
    /// Whether the subject itself cast the instance.
    pub caster_is_subject: bool,
    pub magnitude: f32,
    /// Remaining duration; zero for constant effects. Negative values mean
    /// the host did not report one.
    pub remaining: f32,
    pub inactive: bool,
    pub dispelled: bool,
}

impl ActiveEffectState {
    pub fn is_active(&self) -> bool {
        !self.inactive && !self.dispelled
    }
}

/// Host lifecycle transitions consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    DataLoaded,
    NewGame,
    /// About to load a save; carries the save identifier the mapping is
    /// namespaced under.
    PreLoad { save_id: String },
    /// Save finished loading; active-effect state is now observable.
    PostLoad,
    /// Save written; persist the mapping under this identifier.
    Save { save_id: String },
}

/// Form catalog and well-known forms owned by the host.
pub trait SpellRegistry {
    /// Resolve a spell by its runtime identity.
    fn spell(&self, id: FormId) -> Option<SpellDefinition>;

    /// Resolve a spell by owning source file + local identity.
    fn lookup(&self, key: &SpellKey) -> Option<SpellDefinition>;

    /// Whether any form (spell or otherwise) occupies this identity.
    fn contains(&self, id: FormId) -> bool;

    /// Register a synthesized spell. Replaces any spell already registered
    /// under the same identity.
    fn register(&mut self, spell: SpellDefinition);

    /// Swap a conflicting, unrelated form to a fresh identity. Returns
    /// false if no form occupies `from`.
    fn reassign(&mut self, from: FormId, to: FormId) -> bool;

    /// Flag a synthesized form for deletion.
    fn mark_deleted(&mut self, id: FormId);

    /// Set or restore the FX-persist flag on a shared effect setting.
    fn set_fx_persist(&mut self, base_effect: FormId, on: bool);

    // --- Well-known forms ---

    /// Global toggle gating the whole system.
    fn maintain_mode_enabled(&self) -> bool;

    /// Template whose first effect carries the upkeep drain.
    fn debuff_template(&self) -> Option<SpellDefinition>;

    /// Spell cast on the subject when the resource pool is overdrawn.
    fn penalty_spell(&self) -> Option<FormId>;

    /// Equip slot assigned to synthesized variants.
    fn voice_equip_slot(&self) -> Option<FormId>;

    // --- Maintained-spell toggle list ---

    fn add_to_toggle_list(&mut self, spell: FormId);
    fn clear_toggle_list(&mut self);
}

/// The acting subject (the player actor).
pub trait Subject {
    /// Current resource (magicka) pool. May be negative while overdrawn.
    fn resource(&self) -> f32;

    /// Refund spent resource.
    fn restore_resource(&mut self, amount: f32);

    /// Subject-specific casting cost; skills and perks discount the
    /// neutral `base_cost`.
    fn spell_cost(&self, spell: &SpellDefinition) -> f32;

    fn grant(&mut self, spell: FormId);
    fn revoke(&mut self, spell: FormId);

    /// Dispel all active instances of a spell.
    fn dispel(&mut self, spell: FormId);

    fn active_effects(&self) -> Vec<ActiveEffectState>;

    /// Cast a spell on the subject itself with an explicit magnitude.
    fn cast_on_self(&mut self, spell: FormId, magnitude: f32);

    fn award_experience(&mut self, skill: &str, amount: f32);

    /// User-facing notice. Expected control flow, not an error channel.
    fn notify(&self, message: &str);
}
