//! Capability tags resolved statically from a component type.

use crate::component::Component;

/// A compile-time capability marker on a component type. Tags parameterize
/// how the storage treats the type; they carry no data of their own.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Consumed-per-frame semantic; collaborators clear after processing.
    Event,
    /// Carries cleanup and expiry plumbing, see [`crate::effect`].
    Effect,
    /// Multiple instances per entity, preserved in insertion order.
    Stack,
    /// At most one instance per entity; later adds are refused with a warning.
    NoStack,
    /// A registered per-entity transformation is applied on read.
    Transform,
    /// Storage must always exist; clearing it is flagged in debug builds.
    Required,
    /// At most one entity in the whole store may carry this component.
    Unique,
}

impl Tag {
    pub const ALL: [Tag; 7] = [
        Tag::Event,
        Tag::Effect,
        Tag::Stack,
        Tag::NoStack,
        Tag::Transform,
        Tag::Required,
        Tag::Unique,
    ];

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A fixed bit-set of [`Tag`]s, buildable in const context so that component
/// types can expose their tags as an associated constant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagSet(u8);

impl TagSet {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn with(self, tag: Tag) -> Self {
        Self(self.0 | tag.bit())
    }

    #[inline]
    pub const fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// `Stack` and `NoStack` must not be present together.
    #[inline]
    pub const fn conflicting(self) -> bool {
        self.contains(Tag::Stack) && self.contains(Tag::NoStack)
    }

    pub fn iter(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }
}

#[inline]
pub fn is_event<T: Component>() -> bool {
    T::TAGS.contains(Tag::Event)
}

#[inline]
pub fn is_effect<T: Component>() -> bool {
    T::TAGS.contains(Tag::Effect)
}

#[inline]
pub fn is_stacked<T: Component>() -> bool {
    T::TAGS.contains(Tag::Stack)
}

#[inline]
pub fn is_not_stacked<T: Component>() -> bool {
    T::TAGS.contains(Tag::NoStack)
}

#[inline]
pub fn is_transform<T: Component>() -> bool {
    T::TAGS.contains(Tag::Transform)
}

#[inline]
pub fn is_required<T: Component>() -> bool {
    T::TAGS.contains(Tag::Required)
}

#[inline]
pub fn is_unique<T: Component>() -> bool {
    T::TAGS.contains(Tag::Unique)
}
