use crate::model::{
    AssociationQuery, DataModel, ElementType, Entity, EntityAssociation, Id, NewEntityAssociation,
};
use anyhow::Result;

/// A transactional unit of work against the metadata repository.
///
/// Lookups return raw rows, soft-deleted ones included; deciding what counts
/// as "not found" is left to the caller. Dropping a session without calling
/// [`MdrSession::commit`] discards its writes.
#[async_trait::async_trait]
pub trait MdrSession: Send {
    /// Get an entity row by id
    async fn get_entity(&mut self, id: Id) -> Result<Option<Entity>>;
    /// Find the id of an active entity by name inside a data model
    async fn find_entity_id(&mut self, name: &str, data_model_id: Id) -> Result<Option<Id>>;

    /// Get a data model row by id
    async fn get_data_model(&mut self, id: Id) -> Result<Option<DataModel>>;
    /// Find the id of an active data model by name, optionally pinned to a version
    async fn find_data_model_id(&mut self, name: &str, version: Option<&str>) -> Result<Option<Id>>;
    /// Ids of the active inclusion rows of one element type for an extension model
    async fn included_element_ids(
        &mut self,
        ext_data_model_id: Id,
        element_type: ElementType,
    ) -> Result<Vec<Id>>;

    async fn get_association(&mut self, id: Id) -> Result<Option<EntityAssociation>>;
    /// Active associations matching the query, ordered by id
    async fn find_associations(&mut self, query: &AssociationQuery) -> Result<Vec<EntityAssociation>>;
    async fn insert_association(&mut self, association: NewEntityAssociation) -> Result<EntityAssociation>;
    /// Write every mutable column of an existing association
    async fn save_association(&mut self, association: &EntityAssociation) -> Result<()>;
    /// Physically remove an association; false when no row had that id
    async fn delete_association(&mut self, id: Id) -> Result<bool>;

    async fn commit(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens sessions. Shared across request handlers.
#[async_trait::async_trait]
pub trait MdrStore: Send + Sync {
    type Session: MdrSession;

    async fn begin(&self) -> Result<Self::Session>;
}
