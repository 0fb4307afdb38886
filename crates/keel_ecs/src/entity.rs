/// Opaque identity correlating component bags across sets.
pub type EntityId = u32;

/// Sentinel for "no entity". Writes against it are dropped; reads against it
/// yield placeholder bags.
pub const NO_ENTITY: EntityId = 0;

/// Ids below this value are reserved as sentinels and are never handed out by
/// [`EntityComponentManager::create_entity`](crate::manager::EntityComponentManager::create_entity).
pub const RESERVED_ENTITIES: EntityId = 10;
