// component.rs - Component marker trait and typed component tokens
//
// Components are identified by dense per-store u32 IDs. A `ComponentType<T>`
// token pairs that ID with the Rust type so typed access never needs a lookup.

use std::fmt;
use std::marker::PhantomData;

pub type ComponentTypeId = u32;

/// Trait for data that can be attached to an entity.
///
/// Components may own heap data; the store moves them between archetypes and
/// never copies their bytes.
pub trait Component: 'static + Sized {
    /// Human-readable name for debugging.
    const NAME: &'static str;
}

/// Typed handle for a registered component type.
///
/// Obtained from `Store::component_type`. The token is only meaningful for the
/// store that issued it.
pub struct ComponentType<T> {
    id: ComponentTypeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentType<T> {
    pub(crate) const fn new(id: ComponentTypeId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn id(self) -> ComponentTypeId {
        self.id
    }

    #[inline]
    pub fn name(self) -> &'static str {
        T::NAME
    }
}

impl<T> Clone for ComponentType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentType<T> {}

impl<T> PartialEq for ComponentType<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ComponentType<T> {}

impl<T: Component> fmt::Debug for ComponentType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("id", &self.id)
            .field("name", &T::NAME)
            .finish()
    }
}

/// Helper macro to implement the `Component` trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct Position { x: f32, y: f32 }
///
/// define_component!(Position);
/// define_component!(Velocity, "Velocity2D");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty) => {
        $crate::define_component!($ty, stringify!($ty));
    };
    ($ty:ty, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const NAME: &'static str = $name;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    crate::define_component!(Marker);

    struct Renamed;
    crate::define_component!(Renamed, "Custom");

    #[test]
    fn macro_sets_names() {
        assert_eq!(Marker::NAME, "Marker");
        assert_eq!(Renamed::NAME, "Custom");
    }

    #[test]
    fn tokens_are_copy_and_compare_by_id() {
        let a = ComponentType::<Marker>::new(3);
        let b = a;
        assert_eq!(a, b);
        assert_eq!(b.id(), 3);
        assert_eq!(b.name(), "Marker");
        assert!(format!("{a:?}").contains("Marker"));
    }
}
