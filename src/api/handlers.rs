use axum::{
    extract::{Path, Query, State},
    response::Json,
    Json as RequestJson,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::error::MdrError;
use crate::logic::{resolve_entity_id, AssociationRegistry};
use crate::model::{
    CreateEntityAssociation, EntityAssociation, EntityAssociationDto, Id, MessageResponse,
    UpdateEntityAssociation,
};
use crate::store::traits::{MdrSession, MdrStore};

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ParentEntityQuery {
    #[serde(default, deserialize_with = "deserialize_optional_scope")]
    pub including_extended_by_data_model_id: Option<Id>,
}

/// An empty or zero scope parameter means "base model only".
fn deserialize_optional_scope<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<Id>() {
            Ok(0) => Ok(None),
            Ok(id) => Ok(Some(id)),
            Err(_) => Err(de::Error::custom(format!(
                "invalid data model id '{}'",
                value
            ))),
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveEntityQuery {
    pub entity_name: String,
    pub data_model_name: String,
    pub data_model_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedEntity {
    pub entity_id: Id,
}

pub async fn create_entity_association<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    RequestJson(data): RequestJson<CreateEntityAssociation>,
) -> Result<Json<EntityAssociationDto>, MdrError> {
    let mut session = store.begin().await?;
    let association = AssociationRegistry::create(&mut session, data).await?;
    session.commit().await?;
    Ok(Json(association))
}

pub async fn get_entity_association<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(association_id): Path<Id>,
) -> Result<Json<EntityAssociation>, MdrError> {
    let mut session = store.begin().await?;
    let association = AssociationRegistry::get_by_id(&mut session, association_id).await?;
    Ok(Json(association))
}

pub async fn update_entity_association<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(association_id): Path<Id>,
    RequestJson(patch): RequestJson<UpdateEntityAssociation>,
) -> Result<Json<EntityAssociationDto>, MdrError> {
    let mut session = store.begin().await?;
    let association = AssociationRegistry::update(&mut session, association_id, patch).await?;
    session.commit().await?;
    Ok(Json(association))
}

pub async fn delete_entity_association<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(association_id): Path<Id>,
) -> Result<Json<MessageResponse>, MdrError> {
    let mut session = store.begin().await?;
    let message = AssociationRegistry::delete(&mut session, association_id).await?;
    session.commit().await?;
    Ok(Json(message))
}

pub async fn soft_delete_entity_association<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(association_id): Path<Id>,
) -> Result<Json<MessageResponse>, MdrError> {
    let mut session = store.begin().await?;
    let message = AssociationRegistry::soft_delete(&mut session, association_id).await?;
    session.commit().await?;
    Ok(Json(message))
}

pub async fn list_data_model_associations<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(data_model_id): Path<Id>,
) -> Result<Json<Vec<EntityAssociationDto>>, MdrError> {
    let mut session = store.begin().await?;
    let associations = AssociationRegistry::list_by_data_model(&mut session, data_model_id).await?;
    Ok(Json(associations))
}

pub async fn list_parent_entity_associations<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Path(parent_entity_id): Path<Id>,
    Query(query): Query<ParentEntityQuery>,
) -> Result<Json<Vec<EntityAssociationDto>>, MdrError> {
    let mut session = store.begin().await?;
    let associations = AssociationRegistry::list_by_parent_entity(
        &mut session,
        parent_entity_id,
        query.including_extended_by_data_model_id,
    )
    .await?;
    Ok(Json(associations))
}

pub async fn resolve_entity<S: MdrStore + 'static>(
    State(store): State<AppState<S>>,
    Query(query): Query<ResolveEntityQuery>,
) -> Result<Json<ResolvedEntity>, MdrError> {
    let mut session = store.begin().await?;
    let entity_id = resolve_entity_id(
        &mut session,
        &query.entity_name,
        &query.data_model_name,
        query.data_model_version.as_deref(),
    )
    .await?;
    Ok(Json(ResolvedEntity { entity_id }))
}
