//! The outward-facing facade owning every component set.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use fxhash::FxBuildHasher;
use log::warn;

use crate::{
    bag::Bag,
    bundle::Bundle,
    component::Component,
    entity::{EntityId, NO_ENTITY, RESERVED_ENTITIES},
    store::{ComponentSet, ErasedSet},
    tag::{self, Tag},
};

/// Sparse capacity for sets created on read-side paths.
pub const MIN_SET_SIZE: usize = 100;
/// Sparse capacity for sets created on write-side paths.
pub const STANDARD_SET_SIZE: usize = 10024;

type StoredTransform<T> = Rc<dyn Fn(EntityId, &T) -> T>;

/// Owns one sparse set of component bags per registered component type,
/// the tag index over those types, and the transformation registry; hands
/// out monotonically increasing entity ids.
///
/// Collaborators hold [`Bag`] and [`ComponentSet`] handles bounded by the
/// manager's lifetime and come back through it for every structural write.
/// The manager is single-threaded and deliberately neither `Clone` nor
/// `Copy`.
pub struct EntityComponentManager {
    sets: HashMap<TypeId, Box<dyn ErasedSet>, FxBuildHasher>,
    tags: HashMap<Tag, HashSet<TypeId, FxBuildHasher>, FxBuildHasher>,
    transformations: HashMap<TypeId, Box<dyn Any>, FxBuildHasher>,
    next_entity: EntityId,
    min_set_size: usize,
    standard_set_size: usize,
}

impl Default for EntityComponentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityComponentManager {
    pub fn new() -> Self {
        Self::with_set_sizes(MIN_SET_SIZE, STANDARD_SET_SIZE)
    }

    pub fn with_set_sizes(min_set_size: usize, standard_set_size: usize) -> Self {
        Self {
            sets: HashMap::default(),
            tags: HashMap::default(),
            transformations: HashMap::default(),
            next_entity: RESERVED_ENTITIES,
            min_set_size,
            standard_set_size,
        }
    }

    /// Returns the next entity id. Ids strictly increase and are never
    /// reused.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.next_entity;
        self.next_entity += 1;
        id
    }

    /// Appends `component` to the entity's bag, creating the set and the bag
    /// as needed. Refused with a warning when a `NoStack` bag is already
    /// occupied or when a `Unique` set already has its owner. Id 0 is a
    /// no-op.
    pub fn add<T: Component>(&mut self, id: EntityId, component: T) {
        if id == NO_ENTITY {
            return;
        }

        if tag::is_unique::<T>() {
            self.add_unique(id, component);
            return;
        }

        self.add_component(id, component);
    }

    /// Replaces the entity's whole bag with a single new instance. Warns and
    /// fails when the entity holds no bag; a `Unique` component may only be
    /// overwritten by its owning entity. Id 0 is a no-op.
    pub fn overwrite<T: Component>(&mut self, id: EntityId, component: T) {
        if id == NO_ENTITY {
            return;
        }

        let set = self.set_of::<T>(self.standard_set_size);
        if tag::is_unique::<T>() {
            let (owner, _) = self.get_unique::<T>();
            assert!(
                id == owner,
                "entity {} is not the owning entity for unique component {}",
                id,
                T::type_name()
            );
        }

        match set.get(id) {
            Some(bag) => bag.replace_with(component),
            None => warn!(
                "entity {} does not contain {}, overwrite failed",
                id,
                T::type_name()
            ),
        }
    }

    /// Returns the entity's bag, materializing an empty placeholder when none
    /// exists, so the returned handle is always usable. A locked set is
    /// briefly unlocked to admit the placeholder.
    pub fn get<T: Component>(&mut self, id: EntityId) -> Bag<T> {
        let set = self.set_of::<T>(self.standard_set_size);
        if set.is_empty() {
            assert!(
                !tag::is_required::<T>(),
                "{} is a required component",
                T::type_name()
            );
        }
        bag_or_dummy(&set, id)
    }

    /// Returns the owning entity and bag of a `Unique` component, or
    /// `(NO_ENTITY, placeholder)` when no owner exists. The walk deliberately
    /// runs to the end of the set, so that its sweep clears out any
    /// placeholder bags left behind by reads.
    pub fn get_unique<T: Component>(&mut self) -> (EntityId, Bag<T>) {
        assert!(
            tag::is_unique::<T>(),
            "{} is not a unique component",
            T::type_name()
        );

        let set = self.set_of::<T>(self.standard_set_size);
        let mut found: Option<(EntityId, Bag<T>)> = None;
        set.each(|id, bag| {
            if found.is_none() {
                found = Some((id, bag.clone()));
            }
        });

        match found {
            Some(owner) => owner,
            None => (NO_ENTITY, self.get::<T>(NO_ENTITY)),
        }
    }

    /// Bags of one component type for several entities at once, each
    /// materialized when missing.
    pub fn get_many<T: Component, const N: usize>(&mut self, ids: [EntityId; N]) -> [Bag<T>; N] {
        let set = self.set_of::<T>(self.standard_set_size);
        ids.map(|id| bag_or_dummy(&set, id))
    }

    /// Bags of several distinct component types for one entity.
    pub fn gather<B: Bundle>(&mut self, id: EntityId) -> B::Bags {
        B::bags(self, id)
    }

    /// Entity ids currently present in the type's set.
    pub fn entity_ids<T: Component>(&mut self) -> Vec<EntityId> {
        self.set_of::<T>(self.min_set_size).ids()
    }

    /// The whole set, for iteration.
    pub fn get_all<T: Component>(&mut self) -> ComponentSet<T> {
        self.set_of::<T>(self.min_set_size)
    }

    /// Whole sets of several component types.
    pub fn gather_all<B: Bundle>(&mut self) -> B::Sets {
        B::sets(self)
    }

    /// Whether a set for the component type currently exists in the store.
    pub fn has_set<T: Component>(&self) -> bool {
        self.sets.contains_key(&T::fingerprint())
    }

    /// Removes the sets of the listed component types entirely.
    pub fn clear<B: Bundle>(&mut self) {
        let mut infos = Vec::new();
        B::infos(&mut infos);
        for info in infos {
            if cfg!(debug_assertions) && info.tags.contains(Tag::Required) {
                warn!("clear performed on required component {}", info.name);
            }
            self.sets.remove(&info.type_id);
        }
    }

    /// Removes every set whose component type carries `tag` and forgets the
    /// tag mapping.
    pub fn clear_by_tag(&mut self, tag: Tag) {
        let Some(fingerprints) = self.tags.remove(&tag) else {
            return;
        };
        for fingerprint in fingerprints {
            self.sets.remove(&fingerprint);
        }
    }

    /// Erases the entity from the sets of the listed component types.
    pub fn clear_by_entity<B: Bundle>(&mut self, id: EntityId) {
        if cfg!(debug_assertions) {
            let mut infos = Vec::new();
            B::infos(&mut infos);
            for info in infos {
                if info.tags.contains(Tag::Required) {
                    warn!("clear by entity performed on required component {}", info.name);
                }
            }
        }
        B::erase(self, id);
    }

    /// Erases the entity from every stored set.
    pub fn clear_entity(&mut self, id: EntityId) {
        for set in self.sets.values() {
            set.erase(id);
        }
    }

    /// Drops empty bags from the listed types' sets; a set left without bags
    /// is removed from the store. Unknown types are skipped.
    pub fn prune<B: Bundle>(&mut self) {
        let mut infos = Vec::new();
        B::infos(&mut infos);
        for info in infos {
            self.prune_set(info.type_id);
        }
    }

    /// [`EntityComponentManager::prune`] across every stored set.
    pub fn prune_all(&mut self) {
        let fingerprints: Vec<TypeId> = self.sets.keys().copied().collect();
        for fingerprint in fingerprints {
            self.prune_set(fingerprint);
        }
    }

    /// [`EntityComponentManager::prune`] across every set whose type carries
    /// `tag`.
    pub fn prune_by_tag(&mut self, tag: Tag) {
        let Some(fingerprints) = self.tags.get(&tag).cloned() else {
            return;
        };
        for fingerprint in fingerprints {
            self.prune_set(fingerprint);
        }
    }

    /// Stores a pure `(entity id, value) -> value` view applied whenever the
    /// type's bags are read. Takes effect for bags added afterwards; the
    /// first registration for a type wins.
    pub fn register_transformation<T: Component>(
        &mut self,
        transformation: impl Fn(EntityId, &T) -> T + 'static,
    ) {
        let stored: StoredTransform<T> = Rc::new(transformation);
        self.transformations
            .entry(T::fingerprint())
            .or_insert_with(|| Box::new(stored));
    }

    fn add_unique<T: Component>(&mut self, id: EntityId, component: T) {
        let set = self.set_of::<T>(self.standard_set_size);
        if set.is_locked() {
            warn!(
                "unique component {} already has an owner, add for entity {} refused",
                T::type_name(),
                id
            );
            return;
        }

        self.add_component(id, component);
        set.lock();
    }

    fn add_component<T: Component>(&mut self, id: EntityId, component: T) {
        let set = self.set_of::<T>(self.standard_set_size);

        let Some(bag) = set.get(id) else {
            match set.insert(id, Bag::occupied_with(component)) {
                Ok(bag) => self.install_transformer(id, &bag),
                Err(error) => warn!(
                    "add of {} for entity {} failed: {}",
                    T::type_name(),
                    id,
                    error
                ),
            }
            return;
        };

        if tag::is_not_stacked::<T>() && bag.len() >= 1 {
            warn!(
                "entity {} already contains a NoStack-tagged {}, add failed",
                id,
                T::type_name()
            );
            return;
        }

        bag.push(component);
        self.install_transformer(id, &bag);
    }

    fn install_transformer<T: Component>(&self, id: EntityId, bag: &Bag<T>) {
        let Some(stored) = self.transformations.get(&T::fingerprint()) else {
            return;
        };
        let Some(transformation) = stored.downcast_ref::<StoredTransform<T>>() else {
            return;
        };
        let transformation = Rc::clone(transformation);
        bag.set_transformer(Box::new(move |component| transformation(id, component)));
    }

    fn set_of<T: Component>(&mut self, max: usize) -> ComponentSet<T> {
        let fingerprint = T::fingerprint();
        if !self.sets.contains_key(&fingerprint) {
            self.create_set::<T>(max);
        }

        self.sets[&fingerprint]
            .as_any()
            .downcast_ref::<ComponentSet<T>>()
            .unwrap_or_else(|| panic!("{} is stored under a foreign set type", T::type_name()))
            .clone()
    }

    fn create_set<T: Component>(&mut self, max: usize) {
        assert!(
            !T::TAGS.conflicting(),
            "{} carries both Stack and NoStack",
            T::type_name()
        );

        let set = ComponentSet::<T>::with_max(max, self.standard_set_size.min(max));
        self.sets.insert(T::fingerprint(), Box::new(set));

        for tag in T::TAGS.iter() {
            self.tags.entry(tag).or_default().insert(T::fingerprint());
        }
    }

    fn prune_set(&mut self, fingerprint: TypeId) {
        let all_vacant = {
            let Some(set) = self.sets.get(&fingerprint) else {
                return;
            };

            let mut vacant = Vec::new();
            set.each_id_with_empty(&mut |id, is_vacant| {
                if is_vacant {
                    vacant.push(id);
                }
            });

            if vacant.len() == set.len() {
                true
            } else {
                for id in vacant {
                    set.erase(id);
                }
                set.len() == 0
            }
        };

        if all_vacant {
            self.sets.remove(&fingerprint);
        }
    }
}

/// Looks the bag up, inserting an empty placeholder when the entity has none
/// so that the returned handle is always valid. A locked set admits the
/// placeholder through an unlock/relock cycle.
fn bag_or_dummy<T: Component>(set: &ComponentSet<T>, id: EntityId) -> Bag<T> {
    if let Some(bag) = set.get(id) {
        return bag;
    }

    let inserted = if set.is_locked() {
        set.unlock();
        let inserted = set.insert(id, Bag::empty());
        set.lock();
        inserted
    } else {
        set.insert(id, Bag::empty())
    };

    inserted.unwrap_or_else(|error| {
        warn!(
            "placeholder {} for entity {} is detached: {}",
            T::type_name(),
            id,
            error
        );
        Bag::empty()
    })
}
