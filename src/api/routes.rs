use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::MdrStore;

pub fn create_router<S: MdrStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Entity associations
        .route(
            "/entity-associations",
            post(handlers::create_entity_association::<S>),
        )
        .route(
            "/entity-associations/:association_id",
            get(handlers::get_entity_association::<S>)
                .patch(handlers::update_entity_association::<S>)
                .delete(handlers::delete_entity_association::<S>),
        )
        .route(
            "/entity-associations/:association_id/soft-delete",
            post(handlers::soft_delete_entity_association::<S>),
        )
        // Listings
        .route(
            "/data-models/:data_model_id/entity-associations",
            get(handlers::list_data_model_associations::<S>),
        )
        .route(
            "/entities/:entity_id/entity-associations",
            get(handlers::list_parent_entity_associations::<S>),
        )
        // Name lookup
        .route("/entities/resolve", get(handlers::resolve_entity::<S>))
}
