//! The per-entity, ordered collection of one component type.

use std::cell::RefCell;
use std::rc::Rc;

use crate::component::Component;

pub(crate) type Transformer<T> = Box<dyn Fn(&T) -> T>;

/// Marks whether a bag was written by a collaborator or materialized as a
/// read-side placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BagFlag {
    Empty,
    Occupied,
}

struct Inner<T: Component> {
    items: Vec<T>,
    flag: BagFlag,
    transformer: Option<Transformer<T>>,
}

/// All instances of one component type attached to one entity, in insertion
/// order.
///
/// A [`Bag`] is a shared handle: clones observe the same storage, so a bag
/// obtained before a mutation sees the mutation afterwards. Reads through
/// [`Bag::inspect`] and [`Bag::peek`] apply the per-entity transformation if
/// one was installed; the stored values are never changed by it.
pub struct Bag<T: Component>(Rc<RefCell<Inner<T>>>);

impl<T: Component> Clone for Bag<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Component> Bag<T> {
    #[inline]
    pub(crate) fn occupied_with(component: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            items: vec![component],
            flag: BagFlag::Occupied,
            transformer: None,
        })))
    }

    /// A placeholder materialized on a read for which no bag existed yet.
    #[inline]
    pub(crate) fn empty() -> Self {
        Self(Rc::new(RefCell::new(Inner {
            items: Vec::new(),
            flag: BagFlag::Empty,
            transformer: None,
        })))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn flag(&self) -> BagFlag {
        self.0.borrow().flag
    }

    /// A bag counts as present only when it holds at least one instance and
    /// is not a placeholder.
    #[inline]
    pub fn occupied(&self) -> bool {
        let inner = self.0.borrow();
        !inner.items.is_empty() && inner.flag == BagFlag::Occupied
    }

    pub fn push(&self, component: T) {
        let mut inner = self.0.borrow_mut();
        inner.items.push(component);
        inner.flag = BagFlag::Occupied;
    }

    /// Read-only iteration. Yields transformed views when a transformation is
    /// installed, the stored values otherwise.
    pub fn inspect(&self, mut visit: impl FnMut(&T)) {
        let inner = self.0.borrow();
        match &inner.transformer {
            Some(transform) => {
                for item in &inner.items {
                    let viewed = transform(item);
                    visit(&viewed);
                }
            }
            None => {
                for item in &inner.items {
                    visit(item);
                }
            }
        }
    }

    /// Convenience read from the first instance, through the transformation.
    pub fn peek<R>(&self, read: impl FnOnce(&T) -> R) -> Option<R> {
        let inner = self.0.borrow();
        let first = inner.items.first()?;
        Some(match &inner.transformer {
            Some(transform) => read(&transform(first)),
            None => read(first),
        })
    }

    /// Mutable iteration over the stored values. Transformations do not apply
    /// here.
    pub fn mutate(&self, mut visit: impl FnMut(&mut T)) {
        for item in &mut self.0.borrow_mut().items {
            visit(item);
        }
    }

    /// Selects the stored instances matching `pred` without removing any.
    /// The returned view mutates or inspects the originals.
    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Filtered<T> {
        let indices = {
            let inner = self.0.borrow();
            inner
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| pred(item))
                .map(|(index, _)| index)
                .collect()
        };
        Filtered {
            bag: self.clone(),
            indices,
        }
    }

    /// Removes every stored instance matching `pred`.
    pub fn remove(&self, mut pred: impl FnMut(&T) -> bool) {
        self.0.borrow_mut().items.retain(|item| !pred(item));
    }

    #[inline]
    pub(crate) fn set_transformer(&self, transformer: Transformer<T>) {
        self.0.borrow_mut().transformer = Some(transformer);
    }

    /// Drops everything held and stores `component` as the only instance.
    pub(crate) fn replace_with(&self, component: T) {
        let mut inner = self.0.borrow_mut();
        inner.items.clear();
        inner.items.push(component);
        inner.flag = BagFlag::Occupied;
        inner.transformer = None;
    }

    /// Vacant bags are swept by iteration and pruning.
    #[inline]
    pub(crate) fn is_vacant(&self) -> bool {
        self.0.borrow().items.is_empty()
    }
}

/// A non-destructive selection over a [`Bag`], produced by [`Bag::filter`].
pub struct Filtered<T: Component> {
    bag: Bag<T>,
    indices: Vec<usize>,
}

impl<T: Component> Filtered<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn inspect(&self, mut visit: impl FnMut(&T)) {
        let inner = self.bag.0.borrow();
        for &index in &self.indices {
            let Some(item) = inner.items.get(index) else {
                continue;
            };
            match &inner.transformer {
                Some(transform) => {
                    let viewed = transform(item);
                    visit(&viewed);
                }
                None => visit(item),
            }
        }
    }

    pub fn mutate(&self, mut visit: impl FnMut(&mut T)) {
        let mut inner = self.bag.0.borrow_mut();
        for &index in &self.indices {
            if let Some(item) = inner.items.get_mut(index) {
                visit(item);
            }
        }
    }

    /// Narrows the selection further.
    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Filtered<T> {
        let indices = {
            let inner = self.bag.0.borrow();
            self.indices
                .iter()
                .copied()
                .filter(|&index| inner.items.get(index).map_or(false, |item| pred(item)))
                .collect()
        };
        Filtered {
            bag: self.bag.clone(),
            indices,
        }
    }
}
