//! Construction of the synthesized variant pair.
//!
//! Conversion clones the base spell into a toggled constant-effect ability
//! and builds a companion drain from the host's template. Both carry the
//! maintained marker keyword so they can be recognized across sessions.

use crate::forms::FormId;
use crate::spell::{CastingType, Delivery, SpellDefinition, SpellKind, KYWD_MAINTAINED};

/// Toggled constant-effect clone of the base spell.
///
/// Also returns the shared effect settings whose persistent visuals should
/// be muted while the variant is applied, when silencing is on.
pub fn maintained_variant(
    base: &SpellDefinition,
    id: FormId,
    equip_slot: Option<FormId>,
    silence_fx: bool,
) -> (SpellDefinition, Vec<FormId>) {
    let mut variant = base.clone();
    variant.id = id;
    variant.key = None;
    variant.name = format!("Maintained {}", base.name);
    variant.kind = SpellKind::Ability;
    variant.casting = CastingType::ConstantEffect;
    variant.delivery = Delivery::SelfTarget;
    variant.base_cost = 0.0;
    variant.equip_slot = equip_slot;
    variant.keywords.push(KYWD_MAINTAINED.to_string());

    let mut silenced = Vec::new();
    if silence_fx {
        for effect in &mut variant.effects {
            if effect.fx_persist {
                effect.fx_persist = false;
                silenced.push(effect.base_effect);
            }
        }
    }
    (variant, silenced)
}

/// Upkeep drain built from the host's template, magnitude set to the
/// computed cost. `None` when the template carries no effect.
pub fn debuff_variant(
    template: &SpellDefinition,
    base: &SpellDefinition,
    id: FormId,
    cost: f32,
    equip_slot: Option<FormId>,
) -> Option<SpellDefinition> {
    let mut effect = template.first_effect()?.clone();
    effect.magnitude = cost;
    effect.duration = 0.0;

    Some(SpellDefinition {
        id,
        key: None,
        name: format!("{} Upkeep", base.name),
        kind: SpellKind::Ability,
        casting: CastingType::ConstantEffect,
        delivery: Delivery::SelfTarget,
        base_cost: 0.0,
        associated_skill: base.associated_skill.clone(),
        equip_slot,
        keywords: vec![KYWD_MAINTAINED.to_string()],
        effects: vec![effect],
    })
}
