//! The maintenance engine.
//!
//! Owns the cache, the identity allocator and the periodic timers, and
//! drives every state transition: conversion on cast, reconciliation and
//! upkeep on tick, purge and mapping load/store across the host lifecycle.
//! All host access goes through the [`SpellRegistry`] and [`Subject`]
//! collaborators.

mod cost;
mod eligibility;
mod reconcile;
mod synthesize;


use std::collections::VecDeque;
use std::sync::Mutex;

use upkeep_types::{EngineConfig, Tuning};

use crate::cache::{EntryStats, MaintainedPair, SpellCache};
use crate::forms::{FormAllocator, FormId};
use crate::host::{LifecycleEvent, SpellRegistry, Subject};
use crate::mapping::MappingStore;
use crate::spell::{SpellDefinition, KYWD_MAINTAINED};

pub use cost::{duration_multiplier, upkeep_cost};
pub use eligibility::{check_maintainable, Ineligibility};
pub use reconcile::Removal;

pub struct MaintenanceEngine {
    cache: SpellCache,
    forms: FormAllocator,
    config: EngineConfig,
    tuning: Tuning,
    effect_check_timer: f32,
    experience_timer: f32,
    /// Shared effect settings whose persistent FX were muted around a
    /// grant; restored on the next reconciliation pass. Guarded because
    /// cast events and the tick arrive on different host threads.
    fx_restore_queue: Mutex<VecDeque<FormId>>,
}

impl MaintenanceEngine {
    pub fn new(config: EngineConfig, tuning: Tuning) -> Self {
        Self {
            cache: SpellCache::new(),
            forms: FormAllocator::new(),
            config,
            tuning,
            effect_check_timer: 0.0,
            experience_timer: 0.0,
            fx_restore_queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn cache(&self) -> &SpellCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn allocator(&self) -> &FormAllocator {
        &self.forms
    }

    // --- Cast handling ---

    /// Entry point for the host's cast event. Every cast also resets the
    /// reconciliation timer, successful or not, so effect instances can
    /// settle before the next audit.
    pub fn handle_spell_cast(
        &mut self,
        spell_id: FormId,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) {
        if !registry.maintain_mode_enabled() {
            return;
        }
        let Some(spell) = registry.spell(spell_id) else {
            tracing::error!("cast event for unknown spell {spell_id}");
            return;
        };
        self.maintain(&spell, registry, subject);
        self.effect_check_timer = 0.0;
    }

    /// Convert `spell` into a maintained variant pair. Every rejection
    /// surfaces as a subject notice; only host misconfiguration is logged
    /// as an error.
    pub fn maintain(
        &mut self,
        spell: &SpellDefinition,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) -> bool {
        if check_maintainable(spell, subject, &self.tuning).is_err() {
            subject.notify(&format!("Cannot maintain {}.", spell.name));
            return false;
        }
        let cost = upkeep_cost(spell, subject, &self.tuning);
        let base_cost = subject.spell_cost(spell);
        // The cast that triggered us already debited the base cost, which
        // is refunded below; affordability counts it back in.
        if cost > subject.resource() + base_cost {
            subject.notify(&format!("Need {cost} Magicka to maintain {}.", spell.name));
            return false;
        }
        if self.cache.contains_base(spell.id) {
            subject.notify(&format!("{} is already maintained.", spell.name));
            return false;
        }
        let Some(template) = registry.debuff_template() else {
            tracing::error!("no upkeep drain template registered");
            return false;
        };
        let Some(first) = spell.first_effect() else {
            return false;
        };
        let base_magnitude = first.magnitude;

        let maintained_id = self.forms.next();
        let debuff_id = self.forms.next();
        let voice_slot = registry.voice_equip_slot();
        let (maintained, silenced) = synthesize::maintained_variant(
            spell,
            maintained_id,
            voice_slot,
            self.config.silence_fx,
        );
        let Some(debuff) =
            synthesize::debuff_variant(&template, spell, debuff_id, cost, voice_slot)
        else {
            tracing::error!("upkeep drain template has no effects");
            return false;
        };

        if !silenced.is_empty() {
            let mut queue = match self.fx_restore_queue.lock() {
                Ok(queue) => queue,
                Err(poisoned) => poisoned.into_inner(),
            };
            for fx in silenced {
                registry.set_fx_persist(fx, false);
                queue.push_back(fx);
            }
        }

        registry.register(maintained);
        registry.register(debuff);

        subject.dispel(spell.id);
        subject.restore_resource(base_cost);
        subject.grant(maintained_id);
        subject.grant(debuff_id);

        self.cache.insert(
            spell.id,
            MaintainedPair {
                maintained: maintained_id,
                debuff: debuff_id,
            },
            EntryStats {
                upkeep_cost: cost,
                base_magnitude,
            },
        );
        registry.add_to_toggle_list(spell.id);
        subject.notify(&format!("Maintaining {} for {cost} Magicka.", spell.name));
        true
    }

    // --- Periodic work ---

    /// Advance the engine by `dt` time units.
    pub fn tick(
        &mut self,
        dt: f32,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) {
        self.effect_check_timer += dt;
        self.experience_timer += dt;

        if self.effect_check_timer >= self.tuning.effect_check_interval {
            self.effect_check_timer = 0.0;
            self.reconcile(registry, subject);
            self.check_upkeep(registry, subject);
            self.restore_fx(registry);
        }
        if self.experience_timer >= self.tuning.experience_interval {
            self.experience_timer = 0.0;
            self.award_experience(registry, subject);
        }
    }

    /// Run the periodic audit immediately, outside the timer cadence.
    pub fn force_update(
        &mut self,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) {
        self.effect_check_timer = 0.0;
        self.reconcile(registry, subject);
        self.check_upkeep(registry, subject);
        self.restore_fx(registry);
    }

    /// Audit every cached entry against the subject's active effects and
    /// drop the ones that no longer hold up.
    pub fn reconcile(&mut self, registry: &mut dyn SpellRegistry, subject: &mut dyn Subject) {
        if self.cache.is_empty() {
            return;
        }
        let active = subject.active_effects();
        let mut removals: Vec<(FormId, MaintainedPair, Removal)> = Vec::new();
        for (base, pair, stats) in self.cache.iter() {
            let maint_def = registry.spell(pair.maintained);
            if let Some(why) = reconcile::audit_entry(
                pair,
                stats,
                maint_def.as_ref(),
                &active,
                self.config.strict_audit,
                &self.tuning,
            ) {
                removals.push((base, pair, why));
            }
        }
        if removals.is_empty() {
            return;
        }

        for (base, pair, why) in removals {
            let name = registry
                .spell(base)
                .map(|s| s.name)
                .unwrap_or_else(|| base.to_string());
            tracing::info!("dropping {name}: {why}");
            subject.revoke(pair.maintained);
            subject.revoke(pair.debuff);
            registry.mark_deleted(pair.maintained);
            registry.mark_deleted(pair.debuff);
            self.cache.remove(base);
            subject.notify(&format!("{name} is no longer being maintained."));
        }

        registry.clear_toggle_list();
        for (base, _, _) in self.cache.iter() {
            registry.add_to_toggle_list(base);
        }
    }

    /// Cast the penalty spell when the resource pool is overdrawn, scaled
    /// by the total upkeep currently carried.
    fn check_upkeep(&mut self, registry: &mut dyn SpellRegistry, subject: &mut dyn Subject) {
        if self.cache.is_empty() || subject.resource() >= 0.0 {
            return;
        }
        let Some(penalty) = registry.penalty_spell() else {
            return;
        };
        let total: f32 = self.cache.iter().map(|(_, _, s)| s.upkeep_cost).sum();
        subject.cast_on_self(penalty, total);
    }

    fn restore_fx(&mut self, registry: &mut dyn SpellRegistry) {
        let mut queue = match self.fx_restore_queue.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        while let Some(fx) = queue.pop_front() {
            registry.set_fx_persist(fx, true);
        }
    }

    fn award_experience(&mut self, registry: &mut dyn SpellRegistry, subject: &mut dyn Subject) {
        for (base, _, _) in self.cache.iter() {
            if let Some(spell) = registry.spell(base) {
                subject.award_experience(&spell.associated_skill, spell.base_cost);
            }
        }
    }

    // --- Lifecycle ---

    pub fn handle_lifecycle(
        &mut self,
        event: &LifecycleEvent,
        store: &mut MappingStore,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) {
        match event {
            LifecycleEvent::DataLoaded => {
                tracing::debug!("host data loaded, maintenance engine ready");
            }
            LifecycleEvent::NewGame => self.purge(registry, subject),
            LifecycleEvent::PreLoad { save_id } => {
                self.purge(registry, subject);
                self.forms.load_offset(store.persisted_ids(save_id));
                self.load_mapping(save_id, store, registry);
            }
            LifecycleEvent::PostLoad => self.rebuild_active_state(registry, subject),
            LifecycleEvent::Save { save_id } => {
                store.store_mapping(save_id, &self.cache, registry);
                if let Err(err) = store.save() {
                    tracing::error!("failed to persist mapping: {err}");
                }
            }
        }
    }

    /// Drop every maintained entry and the synthesized forms behind it.
    pub fn purge(&mut self, registry: &mut dyn SpellRegistry, subject: &mut dyn Subject) {
        for (_, pair, _) in self.cache.iter() {
            subject.revoke(pair.maintained);
            subject.revoke(pair.debuff);
            registry.mark_deleted(pair.maintained);
            registry.mark_deleted(pair.debuff);
        }
        registry.clear_toggle_list();
        self.cache.clear();
    }

    /// Rebuild the cache from the persisted mapping for `save_id`.
    ///
    /// Spells are re-synthesized under their persisted identities; the
    /// savegame being loaded already carries the granted variants and their
    /// active instances, so nothing is granted here.
    fn load_mapping(
        &mut self,
        save_id: &str,
        store: &MappingStore,
        registry: &mut dyn SpellRegistry,
    ) {
        for entry in store.entries(save_id, self.config.strict_parse) {
            let Some(base) = registry.lookup(&entry.key) else {
                tracing::warn!("{}: base spell not present, dropping record", entry.key);
                continue;
            };
            let Some(template) = registry.debuff_template() else {
                tracing::error!("no upkeep drain template registered");
                return;
            };

            let maintained_id = self.claim(entry.maintained, registry);
            let debuff_id = self.claim(entry.debuff, registry);
            let cost = entry.cost.unwrap_or(0.0);
            let voice_slot = registry.voice_equip_slot();

            let (maintained, _) =
                synthesize::maintained_variant(&base, maintained_id, voice_slot, false);
            let Some(debuff) =
                synthesize::debuff_variant(&template, &base, debuff_id, cost, voice_slot)
            else {
                tracing::error!("upkeep drain template has no effects");
                return;
            };
            registry.register(maintained);
            registry.register(debuff);

            let base_magnitude = base.first_effect().map(|e| e.magnitude).unwrap_or(0.0);
            tracing::info!("restored {} at {maintained_id}/{debuff_id}", base.name);
            self.cache.insert(
                base.id,
                MaintainedPair {
                    maintained: maintained_id,
                    debuff: debuff_id,
                },
                EntryStats {
                    upkeep_cost: cost,
                    base_magnitude,
                },
            );
        }
    }

    /// Claim a persisted identity for re-registration.
    ///
    /// A leftover variant of ours occupying the identity is stale and gets
    /// reclaimed in place; an unrelated form is moved to a fresh identity
    /// so the savegame's references stay valid.
    fn claim(&mut self, desired: FormId, registry: &mut dyn SpellRegistry) -> FormId {
        if desired.is_null() {
            return self.forms.next();
        }
        if !registry.contains(desired) {
            return desired;
        }
        match registry.spell(desired) {
            Some(existing) if existing.has_keyword(KYWD_MAINTAINED) => {
                registry.mark_deleted(desired);
            }
            _ => {
                let fresh = self.forms.next();
                if registry.reassign(desired, fresh) {
                    tracing::warn!("moved conflicting form {desired} to {fresh}");
                }
            }
        }
        desired
    }

    /// Post-load fixup, once active-effect state is observable again.
    ///
    /// Re-populates the toggle list and trusts the observed drain magnitude
    /// over the recorded cost, since the save may predate a cost change.
    fn rebuild_active_state(
        &mut self,
        registry: &mut dyn SpellRegistry,
        subject: &mut dyn Subject,
    ) {
        registry.clear_toggle_list();
        let active = subject.active_effects();
        let mut updates: Vec<(FormId, f32)> = Vec::new();
        for (base, pair, stats) in self.cache.iter() {
            registry.add_to_toggle_list(base);
            let Some(drain_effect) = registry
                .spell(pair.debuff)
                .and_then(|d| d.first_effect().map(|e| e.base_effect))
            else {
                continue;
            };
            for aeff in &active {
                if aeff.spell == pair.debuff
                    && aeff.caster_is_subject
                    && aeff.base_effect == drain_effect
                    && aeff.magnitude != 0.0
                {
                    let observed = aeff.magnitude.abs();
                    if observed != stats.upkeep_cost {
                        updates.push((base, observed));
                    }
                    break;
                }
            }
        }
        for (base, cost) in updates {
            self.cache.set_upkeep_cost(base, cost);
            let Some(pair) = self.cache.pair_for(base) else {
                continue;
            };
            if let Some(mut debuff) = registry.spell(pair.debuff) {
                if let Some(first) = debuff.effects.first_mut() {
                    first.magnitude = cost;
                }
                registry.register(debuff);
            }
        }
    }
}
