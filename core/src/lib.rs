pub mod bimap;
pub mod cache;
pub mod config;
pub mod engine;
pub mod forms;
pub mod host;
pub mod ini;
pub mod log;
pub mod mapping;
pub mod spell;

// Re-exports for convenience
pub use bimap::BiMap;
pub use cache::{EntryStats, MaintainedPair, SpellCache};
pub use engine::MaintenanceEngine;
pub use forms::{FormAllocator, FormId, SpellKey};
pub use host::{ActiveEffectState, LifecycleEvent, SpellRegistry, Subject};
pub use mapping::MappingStore;
