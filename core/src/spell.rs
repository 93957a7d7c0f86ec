//! Read-only projection of the host's spell objects.
//!
//! The host owns the real catalog; the engine only ever sees these
//! snapshots, obtained through the [`SpellRegistry`](crate::host::SpellRegistry)
//! collaborator. Synthesized variants are built as new `SpellDefinition`s
//! and handed back to the registry.

use serde::{Deserialize, Serialize};

use crate::forms::{FormId, SpellKey};

/// Marker carried by every synthesized variant; its presence also makes a
/// base spell ineligible (already converted).
pub const KYWD_MAINTAINED: &str = "MaintainedSpell";

/// Explicit opt-out marker set by content authors.
pub const KYWD_EXCLUDE: &str = "ExcludeFromMaintain";

/// Exclusion tag carried by a third-party healer mod's dummy spells.
pub const KYWD_ALLY_LINK: &str = "_m3HealerDummySpell";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellKind {
    Spell,
    Ability,
    Scroll,
    Enchantment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastingType {
    FireAndForget,
    ConstantEffect,
    Concentration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    SelfTarget,
    Touch,
    Aimed,
    TargetActor,
    TargetLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    SummonCreature,
    BoundWeapon,
    ValueModifier,
    Script,
    Light,
    Other,
}

/// One sub-effect of a spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectBlueprint {
    /// Identity of the shared effect-setting form.
    pub base_effect: FormId,
    pub archetype: Archetype,
    pub magnitude: f32,
    pub duration: f32,
    /// Visual persists for the whole active window. Cleared while FX
    /// silencing is on, restored through the engine's queue.
    pub fx_persist: bool,
    /// Declared-exclusive sub-effect: the strict audit requires it to stay
    /// represented among the active instances.
    pub exclusive: bool,
}

impl EffectBlueprint {
    pub fn new(base_effect: FormId, archetype: Archetype, magnitude: f32, duration: f32) -> Self {
        Self {
            base_effect,
            archetype,
            magnitude,
            duration,
            fx_persist: false,
            exclusive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub id: FormId,
    /// Owning source file + local identity; `None` for runtime-synthesized
    /// spells, which exist only for the current session.
    pub key: Option<SpellKey>,
    pub name: String,
    pub kind: SpellKind,
    pub casting: CastingType,
    pub delivery: Delivery,
    /// Neutral (subject-independent) casting cost.
    pub base_cost: f32,
    /// Skill that receives experience for maintaining this spell.
    pub associated_skill: String,
    pub equip_slot: Option<FormId>,
    pub keywords: Vec<String>,
    pub effects: Vec<EffectBlueprint>,
}

impl SpellDefinition {
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn first_effect(&self) -> Option<&EffectBlueprint> {
        self.effects.first()
    }

    /// Owning source file name, or a placeholder for runtime spells.
    pub fn source_label(&self) -> &str {
        self.key.as_ref().map(|k| k.plugin.as_str()).unwrap_or("VIRTUAL")
    }
}
