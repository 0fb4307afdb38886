//! Fan-out over one component type or a tuple of distinct ones.

use crate::{
    bag::Bag,
    component::{Component, ComponentInfo},
    entity::EntityId,
    manager::EntityComponentManager,
    store::ComponentSet,
};

/// Implemented for every [`Component`] and for tuples of them, so that
/// gathering, clearing and pruning can be spelled once for any arity.
pub trait Bundle: 'static {
    /// One [`Bag`] per element, for a single entity.
    type Bags;
    /// One [`ComponentSet`] per element.
    type Sets;

    fn infos(out: &mut Vec<ComponentInfo>);
    fn bags(ecm: &mut EntityComponentManager, id: EntityId) -> Self::Bags;
    fn sets(ecm: &mut EntityComponentManager) -> Self::Sets;
    fn erase(ecm: &mut EntityComponentManager, id: EntityId);
}

impl<T: Component> Bundle for T {
    type Bags = Bag<T>;
    type Sets = ComponentSet<T>;

    #[inline]
    fn infos(out: &mut Vec<ComponentInfo>) {
        out.push(T::info());
    }

    #[inline]
    fn bags(ecm: &mut EntityComponentManager, id: EntityId) -> Self::Bags {
        ecm.get::<T>(id)
    }

    #[inline]
    fn sets(ecm: &mut EntityComponentManager) -> Self::Sets {
        ecm.get_all::<T>()
    }

    #[inline]
    fn erase(ecm: &mut EntityComponentManager, id: EntityId) {
        ecm.get_all::<T>().erase(id);
    }
}

macro_rules! bundle_tuple_impl {
    ($($b:ident),+) => {
        impl<$($b: Component),+> Bundle for ($($b,)+) {
            type Bags = ($(Bag<$b>,)+);
            type Sets = ($(ComponentSet<$b>,)+);

            #[inline]
            fn infos(out: &mut Vec<ComponentInfo>) {
                $(out.push($b::info());)+
            }

            #[inline]
            fn bags(ecm: &mut EntityComponentManager, id: EntityId) -> Self::Bags {
                ($(ecm.get::<$b>(id),)+)
            }

            #[inline]
            fn sets(ecm: &mut EntityComponentManager) -> Self::Sets {
                ($(ecm.get_all::<$b>(),)+)
            }

            #[inline]
            fn erase(ecm: &mut EntityComponentManager, id: EntityId) {
                $(<$b as Bundle>::erase(ecm, id);)+
            }
        }
    };
}

bundle_tuple_impl!(B0);
bundle_tuple_impl!(B0, B1);
bundle_tuple_impl!(B0, B1, B2);
bundle_tuple_impl!(B0, B1, B2, B3);
bundle_tuple_impl!(B0, B1, B2, B3, B4);
bundle_tuple_impl!(B0, B1, B2, B3, B4, B5);
bundle_tuple_impl!(B0, B1, B2, B3, B4, B5, B6);
bundle_tuple_impl!(B0, B1, B2, B3, B4, B5, B6, B7);
