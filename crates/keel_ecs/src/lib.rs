//! Tag-driven, sparse-set-backed entity-component storage.
//!
//! Component types declare capability tags at compile time; the manager in
//! [`manager`] owns one sparse set of per-entity bags per type and enforces
//! the tags' stacking, uniqueness and cleanup policies.

// Lets the derives refer to this crate by name from within its own tests.
extern crate self as keel_ecs;

pub mod bag;
pub mod bundle;
pub mod component;
pub mod effect;
pub mod entity;
pub mod error;
pub mod manager;
pub mod store;
pub mod tag;


pub mod prelude {
    pub use super::bag::{Bag, BagFlag, Filtered};
    pub use super::bundle::Bundle;
    pub use super::component::{Component, ComponentInfo};
    pub use super::effect::{is_effect_expired, mark_for_cleanup, Effect, EffectState, EffectTimer};
    pub use super::entity::{EntityId, NO_ENTITY, RESERVED_ENTITIES};
    pub use super::manager::EntityComponentManager;
    pub use super::store::ComponentSet;
    pub use super::tag::{Tag, TagSet};
    pub use keel_ecs_macros::{Component, Effect};
}
