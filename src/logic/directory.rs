//! Entity and data model lookups shared by the registry operations.

use crate::error::MdrError;
use crate::model::{DataModel, ElementType, Entity, Id};
use crate::store::traits::MdrSession;

/// Fetch an active entity, failing with `NotFound` when it is absent or soft-deleted.
pub async fn get_entity_by_id<S: MdrSession>(session: &mut S, id: Id) -> Result<Entity, MdrError> {
    match session.get_entity(id).await? {
        Some(entity) if entity.is_active() => Ok(entity),
        Some(_) => Err(MdrError::not_found(format!("Entity with ID {} is deleted", id))),
        None => Err(MdrError::not_found(format!("Entity with ID {} not found", id))),
    }
}

pub async fn check_entity_by_id<S: MdrSession>(session: &mut S, id: Id) -> Result<(), MdrError> {
    get_entity_by_id(session, id).await.map(|_| ())
}

/// Fetch an active data model, failing with `NotFound` when it is absent or soft-deleted.
pub async fn check_datamodel_by_id<S: MdrSession>(
    session: &mut S,
    id: Id,
) -> Result<DataModel, MdrError> {
    match session.get_data_model(id).await? {
        Some(data_model) if !data_model.deleted => Ok(data_model),
        Some(_) => Err(MdrError::not_found(format!("Data model with ID {} is deleted", id))),
        None => Err(MdrError::not_found(format!("Data model with ID {} not found", id))),
    }
}

/// Base entities an extension data model has pulled in.
pub async fn included_entity_ids<S: MdrSession>(
    session: &mut S,
    ext_data_model_id: Id,
) -> Result<Vec<Id>, MdrError> {
    Ok(session
        .included_element_ids(ext_data_model_id, ElementType::Entity)
        .await?)
}

/// Resolve an entity id from its name and the name (and optionally version)
/// of the data model that owns it.
pub async fn resolve_entity_id<S: MdrSession>(
    session: &mut S,
    entity_name: &str,
    data_model_name: &str,
    data_model_version: Option<&str>,
) -> Result<Id, MdrError> {
    let data_model_id = session
        .find_data_model_id(data_model_name, data_model_version)
        .await?
        .ok_or_else(|| MdrError::not_found(format!("Data model '{}' not found", data_model_name)))?;

    session
        .find_entity_id(entity_name, data_model_id)
        .await?
        .ok_or_else(|| {
            MdrError::not_found(format!(
                "Entity '{}' not found in data model '{}'",
                entity_name, data_model_name
            ))
        })
}
