//! The maintainability predicate.
//!
//! An ordered rule chain: the first matching rejection wins and no further
//! rules are evaluated. Rejections are expected control flow, never errors.

use std::fmt;

use upkeep_types::Tuning;

use crate::host::Subject;
use crate::spell::{
    Archetype, CastingType, Delivery, SpellDefinition, SpellKind, KYWD_ALLY_LINK, KYWD_EXCLUDE,
    KYWD_MAINTAINED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Scroll,
    Enchantment,
    NoEffects,
    NotFireAndForget,
    TooShort,
    TooCheap,
    AlreadyMaintained,
    Excluded,
    ExcludedTag,
    NotSelfTargeted,
    BoundWeapon,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Scroll => "spell is scroll-delivered",
            Self::Enchantment => "spell is an enchantment",
            Self::NoEffects => "spell has no effects",
            Self::NotFireAndForget => "spell is not fire-and-forget",
            Self::TooShort => "spell duration is too short",
            Self::TooCheap => "spell cost is too low",
            Self::AlreadyMaintained => "spell is already a maintained variant",
            Self::Excluded => "spell carries the exclusion keyword",
            Self::ExcludedTag => "spell carries the ally-link tag",
            Self::NotSelfTargeted => "spell does not target self and is not a summon",
            Self::BoundWeapon => "spell is a bound weapon",
        };
        f.write_str(reason)
    }
}

fn reject(spell: &SpellDefinition, why: Ineligibility) -> Result<(), Ineligibility> {
    tracing::info!("{}: {}", spell.name, why);
    Err(why)
}

/// Whether `spell` can be converted into a maintained variant for
/// `subject`. Degrades gracefully to a rejection; never raises an error.
pub fn check_maintainable(
    spell: &SpellDefinition,
    subject: &dyn Subject,
    tuning: &Tuning,
) -> Result<(), Ineligibility> {
    if spell.kind == SpellKind::Scroll {
        return reject(spell, Ineligibility::Scroll);
    }
    if spell.kind == SpellKind::Enchantment {
        return reject(spell, Ineligibility::Enchantment);
    }
    let Some(first) = spell.first_effect() else {
        return reject(spell, Ineligibility::NoEffects);
    };
    if spell.casting != CastingType::FireAndForget {
        return reject(spell, Ineligibility::NotFireAndForget);
    }
    if first.duration <= tuning.min_duration {
        return reject(spell, Ineligibility::TooShort);
    }
    if subject.spell_cost(spell) <= tuning.min_cost && spell.base_cost <= tuning.min_cost {
        return reject(spell, Ineligibility::TooCheap);
    }
    if spell.has_keyword(KYWD_MAINTAINED) {
        return reject(spell, Ineligibility::AlreadyMaintained);
    }
    if spell.has_keyword(KYWD_EXCLUDE) {
        return reject(spell, Ineligibility::Excluded);
    }
    if spell.has_keyword(KYWD_ALLY_LINK) {
        return reject(spell, Ineligibility::ExcludedTag);
    }

    if spell.delivery != Delivery::SelfTarget {
        // Summons are allowed even though they don't target self;
        // everything else non-self is rejected.
        if first.archetype == Archetype::SummonCreature {
            return Ok(());
        }
        return reject(spell, Ineligibility::NotSelfTargeted);
    }
    if first.archetype == Archetype::BoundWeapon {
        return reject(spell, Ineligibility::BoundWeapon);
    }
    Ok(())
}
