//! Typed component sets and the erased handles the manager stores them as.

pub mod sparse;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{bag::Bag, component::Component, entity::EntityId, error::StoreError};
use sparse::SparseSet;

/// The sparse set of all [`Bag`]s of one component type, keyed by entity id.
///
/// This is a shared handle: clones observe the same storage, which lets a
/// system keep iterating a set while it writes other components through the
/// manager. Iteration visits entries in insertion order modulo swap-removal.
pub struct ComponentSet<T: Component> {
    inner: Rc<RefCell<SparseSet<EntityId, Bag<T>>>>,
}

impl<T: Component> Clone for ComponentSet<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

enum Step<T: Component> {
    Stop,
    Swept,
    Visit(EntityId, Bag<T>),
}

impl<T: Component> ComponentSet<T> {
    pub(crate) fn with_max(max: usize, capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SparseSet::new(max, capacity))),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.borrow().is_locked()
    }

    /// Entity ids currently present, in dense order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.inner.borrow().ids().to_vec()
    }

    pub fn get(&self, id: EntityId) -> Option<Bag<T>> {
        self.inner.borrow().get(id).cloned()
    }

    /// Visits every occupied bag. The dense length is snapshotted at entry:
    /// entries appended during the walk are not visited, a swap-removal makes
    /// the walk revisit the index it filled, and bags that have become empty
    /// are erased in passing rather than visited.
    pub fn each(&self, mut visit: impl FnMut(EntityId, &Bag<T>)) {
        self.iterate(true, &mut visit);
    }

    /// Like [`ComponentSet::each`], but also visits placeholder bags and
    /// sweeps nothing.
    pub fn each_with_empty(&self, mut visit: impl FnMut(EntityId, &Bag<T>)) {
        self.iterate(false, &mut visit);
    }

    fn iterate(&self, sweep: bool, visit: &mut dyn FnMut(EntityId, &Bag<T>)) {
        let mut end = self.inner.borrow().len();
        let mut at = 0;
        loop {
            // The borrow is scoped so that `visit` is free to re-enter the
            // store through the manager.
            let step = {
                let mut set = self.inner.borrow_mut();
                end = end.min(set.len());
                if at >= end {
                    Step::Stop
                } else {
                    let id = set.id_at(at);
                    let bag = set.value_at(at).clone();
                    if sweep && bag.is_vacant() {
                        set.remove(id);
                        Step::Swept
                    } else {
                        Step::Visit(id, bag)
                    }
                }
            };
            match step {
                Step::Stop => break,
                Step::Swept => continue,
                Step::Visit(id, bag) => {
                    visit(id, &bag);
                    let set = self.inner.borrow();
                    end = end.min(set.len());
                    // Advance unless an erasure just pulled a new entry into
                    // this index; that entry still has to be visited.
                    if at < set.len() && set.id_at(at) == id {
                        at += 1;
                    }
                }
            }
        }
    }

    pub(crate) fn insert(&self, id: EntityId, bag: Bag<T>) -> Result<Bag<T>, StoreError> {
        let mut set = self.inner.borrow_mut();
        let stored = set.insert(id, bag)?;
        Ok(stored.clone())
    }

    pub(crate) fn erase(&self, id: EntityId) -> bool {
        self.inner.borrow_mut().remove(id).is_some()
    }

    pub(crate) fn lock(&self) {
        self.inner.borrow_mut().lock();
    }

    pub(crate) fn unlock(&self) {
        self.inner.borrow_mut().unlock();
    }
}

/// The dispatch surface the manager stores per component type, so that
/// whole-store operations can erase ids and sweep bags without knowing the
/// component type.
pub(crate) trait ErasedSet {
    fn as_any(&self) -> &dyn Any;
    fn erase(&self, id: EntityId) -> bool;
    fn len(&self) -> usize;
    /// Yields every entity id in the set along with whether its bag is
    /// currently empty, placeholders included.
    fn each_id_with_empty(&self, visit: &mut dyn FnMut(EntityId, bool));
}

impl<T: Component> ErasedSet for ComponentSet<T> {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn erase(&self, id: EntityId) -> bool {
        ComponentSet::erase(self, id)
    }

    fn len(&self) -> usize {
        ComponentSet::len(self)
    }

    fn each_id_with_empty(&self, visit: &mut dyn FnMut(EntityId, bool)) {
        let entries: Vec<(EntityId, bool)> = {
            let set = self.inner.borrow();
            (0..set.len())
                .map(|at| (set.id_at(at), set.value_at(at).is_vacant()))
                .collect()
        };
        for (id, vacant) in entries {
            visit(id, vacant);
        }
    }
}
