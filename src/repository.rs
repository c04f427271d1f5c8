//! The base repository capability and its shared implementation.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::{Entity, Identifier, Updatable};
use crate::error::Result;
use crate::session::Session;

/// Create, update, find and delete for one entity type.
///
/// Every `#[repository]` trait extends this; generated implementations
/// forward these methods to [`NeoRepositoryImpl`].
#[async_trait]
pub trait NeoRepository<T: Entity, ID: Identifier>: Send + Sync {
    /// Saves a new entity and returns it.
    async fn create(&self, data: T) -> Result<T>;

    /// Runs the entity's update hook, saves it and returns it.
    async fn update(&self, data: T) -> Result<T>;

    async fn find_by_id(&self, id: ID) -> Result<Option<T>>;

    /// Deletes the entity with this id. Does nothing when there is none.
    async fn delete_by_id(&self, id: ID) -> Result<()>;

    async fn delete(&self, data: T) -> Result<()>;
}

/// [`NeoRepository`] over a [`Session`], for any entity type.
///
/// `T` is the type token: it picks the label and decoding for every
/// session call. `update` runs the hook given at construction; generated
/// repositories pass one that calls [`Updatable::update`] whenever `T`
/// implements it.
pub struct NeoRepositoryImpl<T, ID, S> {
    session: Arc<S>,
    on_update: fn(&mut T),
    _entity: PhantomData<fn() -> (T, ID)>,
}

impl<T, ID, S> NeoRepositoryImpl<T, ID, S> {
    /// A base repository whose updates save without a hook.
    pub fn new(session: Arc<S>) -> Self {
        Self::with_update_hook(session, |_| {})
    }

    pub fn with_update_hook(session: Arc<S>, on_update: fn(&mut T)) -> Self {
        Self {
            session,
            on_update,
            _entity: PhantomData,
        }
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }
}

impl<T: Updatable, ID, S> NeoRepositoryImpl<T, ID, S> {
    /// A base repository that runs [`Updatable::update`] before every update.
    pub fn updatable(session: Arc<S>) -> Self {
        Self::with_update_hook(session, T::update)
    }
}

impl<T, ID, S> Clone for NeoRepositoryImpl<T, ID, S> {
    fn clone(&self) -> Self {
        Self::with_update_hook(Arc::clone(&self.session), self.on_update)
    }
}

#[async_trait]
impl<T, ID, S> NeoRepository<T, ID> for NeoRepositoryImpl<T, ID, S>
where
    T: Entity,
    ID: Identifier,
    S: Session + 'static,
{
    async fn create(&self, data: T) -> Result<T> {
        self.session.save(&data).await?;
        Ok(data)
    }

    async fn update(&self, mut data: T) -> Result<T> {
        (self.on_update)(&mut data);
        self.session.save(&data).await?;
        Ok(data)
    }

    async fn find_by_id(&self, id: ID) -> Result<Option<T>> {
        self.session.load::<T, ID>(&id).await
    }

    async fn delete_by_id(&self, id: ID) -> Result<()> {
        match self.find_by_id(id).await? {
            Some(data) => self.delete(data).await,
            None => {
                tracing::debug!(label = T::LABEL, "Nothing to delete");
                Ok(())
            }
        }
    }

    async fn delete(&self, data: T) -> Result<()> {
        self.session.delete(&data).await
    }
}
