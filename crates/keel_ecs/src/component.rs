use std::any::{self, TypeId};

use crate::tag::TagSet;

/// A [`Component`] is nothing more but data attached to an entity. Implement
/// via `#[derive(Component)]`, listing capability tags in an optional
/// `#[component(...)]` attribute.
pub trait Component: Sized + 'static {
    const TAGS: TagSet = TagSet::empty();

    /// Process-stable identifier under which this type's set is stored.
    #[inline]
    fn fingerprint() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Debug-friendly name used in warnings and assertion messages.
    #[inline]
    fn type_name() -> &'static str {
        any::type_name::<Self>()
    }

    #[inline]
    fn info() -> ComponentInfo {
        ComponentInfo {
            type_id: Self::fingerprint(),
            tags: Self::TAGS,
            name: Self::type_name(),
        }
    }
}

/// Per-type metadata carried through erased operations.
#[derive(Clone, Copy, Debug)]
pub struct ComponentInfo {
    pub type_id: TypeId,
    pub tags: TagSet,
    pub name: &'static str,
}
