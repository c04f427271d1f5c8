//! Traits describing what can be stored in a repository.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record persisted as a graph node.
///
/// The node carries the label [`Entity::LABEL`] and every serialized field as
/// a property. [`Entity::ID_PROPERTY`] names the property used to find the
/// node again.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// impl Entity for User {
///     const LABEL: &'static str = "User";
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const LABEL: &'static str;

    const ID_PROPERTY: &'static str = "id";
}

/// Hook run on an entity right before an update is saved.
///
/// Implementing this trait is all an entity needs: generated `#[update]`
/// methods and the base `update` of a generated repository call
/// [`Updatable::update`] exactly once before saving.
pub trait Updatable: Send {
    fn update(&mut self);
}

/// Values that identify an entity.
pub trait Identifier: Serialize + Send + Sync + 'static {}

impl<T: Serialize + Send + Sync + 'static> Identifier for T {}

/// Compile-time dispatch of the update hook.
///
/// `UpdateHook(&mut x).run_update_hook()` resolves to [`ViaUpdatable`] when
/// the concrete type of `x` implements [`Updatable`]. Otherwise method
/// lookup falls through to the `&mut UpdateHook` receiver of
/// [`WithoutHook`], which does nothing. Both traits must be in scope.
#[doc(hidden)]
pub mod hook {
    use super::Updatable;

    pub struct UpdateHook<'a, T>(pub &'a mut T);

    pub trait ViaUpdatable {
        fn run_update_hook(self);
    }

    impl<T: Updatable> ViaUpdatable for UpdateHook<'_, T> {
        fn run_update_hook(self) {
            self.0.update();
        }
    }

    pub trait WithoutHook {
        fn run_update_hook(self);
    }

    impl<T> WithoutHook for &mut UpdateHook<'_, T> {
        fn run_update_hook(self) {}
    }

}
