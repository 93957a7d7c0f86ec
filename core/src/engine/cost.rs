//! The upkeep cost formula.
//!
//! Short effects scale up quadratically toward the neutral reference
//! duration, long effects scale down by square root past it. Rounding is
//! to nearest, ties away from zero.

use upkeep_types::Tuning;

use crate::host::Subject;
use crate::spell::SpellDefinition;

/// Duration-based multiplier. Exactly 1.0 at `duration == neutral`.
pub fn duration_multiplier(duration: f32, neutral: f32) -> f32 {
    let duration = duration.max(1.0);
    if duration < neutral {
        (neutral / duration).powi(2)
    } else {
        (neutral / duration).sqrt()
    }
}

/// Periodic cost debited from the subject while the maintained variant
/// stays active.
pub fn upkeep_cost(spell: &SpellDefinition, subject: &dyn Subject, tuning: &Tuning) -> f32 {
    let base_cost = subject.spell_cost(spell);
    let base_duration = spell.first_effect().map(|e| e.duration).unwrap_or(0.0);
    let mut mult = duration_multiplier(base_duration, tuning.neutral_duration);

    // If an instance of the base effect is already running, its observed
    // remaining duration reflects cast-time skill/magnitude scaling;
    // fold that back in.
    if let Some(first) = spell.first_effect() {
        for aeff in subject.active_effects() {
            if aeff.spell == spell.id && aeff.caster_is_subject && aeff.base_effect == first.base_effect
            {
                if aeff.remaining > 0.0 {
                    let correction = (base_duration / aeff.remaining).sqrt();
                    mult *= correction;
                    tracing::info!(
                        "neutral {} vs base {} vs observed {} => cost mult {}",
                        tuning.neutral_duration,
                        base_duration,
                        aeff.remaining,
                        mult
                    );
                }
                break;
            }
        }
    }

    (base_cost * mult).round()
}
