use itertools::Itertools;

use crate::error::MdrError;
use crate::logic::directory::{
    check_datamodel_by_id, check_entity_by_id, get_entity_by_id, included_entity_ids,
};
use crate::model::{
    AssociationQuery, CreateEntityAssociation, EntityAssociation, EntityAssociationDto, Id,
    MessageResponse, ScopeFilter, UpdateEntityAssociation,
};
use crate::store::traits::MdrSession;

/// Create, read, update and delete operations over entity associations.
///
/// Every operation runs inside the session it is handed and never commits;
/// the caller owns the transaction.
pub struct AssociationRegistry;

impl AssociationRegistry {
    /// True when an active association between the pair already exists in the
    /// base model or in an overlapping extension scope.
    pub async fn check_existing_association<S: MdrSession>(
        session: &mut S,
        parent_entity_id: Id,
        child_entity_id: Id,
        extended_by_data_model_id: Option<Id>,
    ) -> Result<bool, MdrError> {
        let query = AssociationQuery::active()
            .parent(parent_entity_id)
            .child(child_entity_id)
            .scope(ScopeFilter::overlapping(extended_by_data_model_id));
        Ok(!session.find_associations(&query).await?.is_empty())
    }

    /// Every active association between the pair overlapping the scope.
    pub async fn retrieve_all_associations<S: MdrSession>(
        session: &mut S,
        parent_entity_id: Id,
        child_entity_id: Id,
        extended_by_data_model_id: Option<Id>,
    ) -> Result<Vec<EntityAssociation>, MdrError> {
        let query = AssociationQuery::active()
            .parent(parent_entity_id)
            .child(child_entity_id)
            .scope(ScopeFilter::overlapping(extended_by_data_model_id));
        let associations = session.find_associations(&query).await?;
        if associations.is_empty() {
            return Err(MdrError::not_found(format!(
                "Child {} association with parent {} not found in data model association",
                child_entity_id, parent_entity_id
            )));
        }
        Ok(associations)
    }

    pub async fn create<S: MdrSession>(
        session: &mut S,
        data: CreateEntityAssociation,
    ) -> Result<EntityAssociationDto, MdrError> {
        let parent = get_entity_by_id(session, data.parent_entity_id).await?;
        let child = get_entity_by_id(session, data.child_entity_id).await?;
        let extension = parent.extension || child.extension;

        if Self::check_existing_association(
            session,
            data.parent_entity_id,
            data.child_entity_id,
            data.extended_by_data_model_id,
        )
        .await?
        {
            log::warn!(
                "Rejected duplicate association {} -> {} (scope {:?})",
                data.parent_entity_id,
                data.child_entity_id,
                data.extended_by_data_model_id
            );
            return Err(MdrError::conflict(format!(
                "Association already exists between the parent ({}) and child ({}) entities with ExtendedByDataModelId {} or Base LIF",
                data.parent_entity_id,
                data.child_entity_id,
                describe_scope(data.extended_by_data_model_id)
            )));
        }

        let association = session.insert_association(data.into_new(extension)).await?;
        log::info!(
            "Created entity association {} ({} -> {}, extension={})",
            association.id,
            association.parent_entity_id,
            association.child_entity_id,
            association.extension
        );

        Ok(association.into())
    }

    /// The raw row of an active association. Unlike the other read paths this
    /// is not mapped to a DTO.
    pub async fn get_by_id<S: MdrSession>(
        session: &mut S,
        association_id: Id,
    ) -> Result<EntityAssociation, MdrError> {
        match session.get_association(association_id).await? {
            Some(association) if association.deleted => Err(MdrError::not_found(format!(
                "EntityAssociation with ID {} is deleted",
                association_id
            ))),
            Some(association) => Ok(association),
            None => Err(MdrError::not_found(format!(
                "EntityAssociation with ID {} not found",
                association_id
            ))),
        }
    }

    /// First active association with the exact (parent, child, relationship)
    /// whose scope overlaps `extended_by_data_model_id`.
    pub async fn find_by_parent_child_relationship<S: MdrSession>(
        session: &mut S,
        parent_entity_id: Id,
        child_entity_id: Id,
        relationship: &str,
        extended_by_data_model_id: Option<Id>,
    ) -> Result<Option<EntityAssociation>, MdrError> {
        let query = AssociationQuery::active()
            .parent(parent_entity_id)
            .child(child_entity_id)
            .relationship(relationship)
            .scope(ScopeFilter::overlapping(extended_by_data_model_id));
        Ok(session.find_associations(&query).await?.into_iter().next())
    }

    pub async fn update<S: MdrSession>(
        session: &mut S,
        association_id: Id,
        patch: UpdateEntityAssociation,
    ) -> Result<EntityAssociationDto, MdrError> {
        let mut association = Self::get_by_id(session, association_id).await?;

        if let Some(parent_entity_id) = patch.parent_entity_id {
            check_entity_by_id(session, parent_entity_id).await?;
        }
        if let Some(child_entity_id) = patch.child_entity_id {
            check_entity_by_id(session, child_entity_id).await?;
        }

        if patch.changes_identity() {
            let (parent_entity_id, child_entity_id, relationship, scope) =
                patch.effective_identity(&association);
            let query = AssociationQuery::active()
                .parent(parent_entity_id)
                .child(child_entity_id)
                .relationship(relationship)
                .scope(ScopeFilter::overlapping(scope))
                .excluding(association_id);

            if let Some(existing) = session.find_associations(&query).await?.into_iter().next() {
                log::warn!(
                    "Rejected update of association {}: duplicates association {}",
                    association_id,
                    existing.id
                );
                return Err(MdrError::conflict(
                    "EntityAssociation with the same ParentEntityId, ChildEntityId and Relationship already exists for base LIF or given data model.",
                ));
            }
        }

        let endpoints_changed = patch.changes_endpoints();
        patch.apply_to(&mut association);

        if endpoints_changed {
            let parent = get_entity_by_id(session, association.parent_entity_id).await?;
            let child = get_entity_by_id(session, association.child_entity_id).await?;
            association.extension = parent.extension || child.extension;
        }

        session.save_association(&association).await?;
        log::info!("Updated entity association {}", association_id);

        Ok(association.into())
    }

    /// Physically remove an association. Irreversible.
    pub async fn delete<S: MdrSession>(
        session: &mut S,
        association_id: Id,
    ) -> Result<MessageResponse, MdrError> {
        let association = Self::get_by_id(session, association_id).await?;
        session.delete_association(association.id).await?;
        log::info!("Deleted entity association {}", association_id);

        Ok(MessageResponse::new(format!(
            "Entity association with ID {} deleted successfully",
            association_id
        )))
    }

    /// Flag an association as deleted; the row stays in storage but drops out
    /// of every read and update path.
    pub async fn soft_delete<S: MdrSession>(
        session: &mut S,
        association_id: Id,
    ) -> Result<MessageResponse, MdrError> {
        let mut association = Self::get_by_id(session, association_id).await?;
        association.deleted = true;
        session.save_association(&association).await?;
        log::info!("Soft-deleted entity association {}", association_id);

        Ok(MessageResponse::new(format!(
            "Entity association with ID {} deleted successfully",
            association_id
        )))
    }

    /// Associations visible in a data model.
    ///
    /// For an extension model: associations between two of its included
    /// entities, in the base model or scoped to this model. For any other
    /// model: base associations with at least one endpoint owned by it.
    pub async fn list_by_data_model<S: MdrSession>(
        session: &mut S,
        data_model_id: Id,
    ) -> Result<Vec<EntityAssociationDto>, MdrError> {
        let data_model = check_datamodel_by_id(session, data_model_id).await?;

        let associations = if data_model.is_extension() {
            let included = included_entity_ids(session, data_model_id).await?;
            let query = AssociationQuery::active()
                .parent_in(included.clone())
                .child_in(included)
                .scope(ScopeFilter::BaseOr(data_model_id));
            session.find_associations(&query).await?
        } else {
            let parent_side = AssociationQuery::active()
                .parent_in_data_model(data_model_id)
                .scope(ScopeFilter::BaseOnly);
            let child_side = AssociationQuery::active()
                .child_in_data_model(data_model_id)
                .scope(ScopeFilter::BaseOnly);

            let by_parent = session.find_associations(&parent_side).await?;
            let by_child = session.find_associations(&child_side).await?;
            merge_by_id(by_parent, by_child)
        };

        log::debug!(
            "Data model {} ({}) lists {} associations",
            data_model_id,
            data_model.model_type,
            associations.len()
        );

        Ok(associations.into_iter().map(Into::into).collect())
    }

    /// Active associations of a parent entity. Without a scope only base
    /// associations are returned; with one, that extension's are added.
    pub async fn list_by_parent_entity<S: MdrSession>(
        session: &mut S,
        parent_entity_id: Id,
        including_extended_by_data_model_id: Option<Id>,
    ) -> Result<Vec<EntityAssociationDto>, MdrError> {
        check_entity_by_id(session, parent_entity_id).await?;

        let query = AssociationQuery::active()
            .parent(parent_entity_id)
            .scope(ScopeFilter::visible_from(including_extended_by_data_model_id));
        let associations = session.find_associations(&query).await?;

        Ok(associations.into_iter().map(Into::into).collect())
    }
}

/// Union of two result sets, one entry per association id, ordered by id.
pub fn merge_by_id(
    left: Vec<EntityAssociation>,
    right: Vec<EntityAssociation>,
) -> Vec<EntityAssociation> {
    left.into_iter()
        .chain(right)
        .unique_by(|association| association.id)
        .sorted_by_key(|association| association.id)
        .collect()
}

fn describe_scope(scope: Option<Id>) -> String {
    match scope {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataModel, DataModelType, ElementType, Entity};
    use crate::store::{MdrStore, MemorySession, MemoryStore};

    const BASE_MODEL: Id = 1;
    const EXT_MODEL: Id = 99;
    const OTHER_EXT_MODEL: Id = 98;

    /// Base model 1 owns entities 10, 11 and 12; extension model 99 owns 20.
    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_data_model(DataModel::new(BASE_MODEL, "LIF", DataModelType::BaseLif));
        store.insert_data_model(DataModel::new(2, "Source", DataModelType::SourceSchema));
        store.insert_data_model(DataModel::new(EXT_MODEL, "Org", DataModelType::OrgLif));
        store.insert_data_model(DataModel::new(OTHER_EXT_MODEL, "Partner", DataModelType::PartnerLif));
        store.insert_entity(Entity::new(10, "Person", BASE_MODEL, false));
        store.insert_entity(Entity::new(11, "Course", BASE_MODEL, false));
        store.insert_entity(Entity::new(12, "Credential", BASE_MODEL, false));
        store.insert_entity(Entity::new(20, "Badge", EXT_MODEL, true));
        store.insert_entity(Entity::new(30, "Record", 2, false));
        store
    }

    async fn session(store: &MemoryStore) -> MemorySession {
        store.begin().await.unwrap()
    }

    async fn create(
        session: &mut MemorySession,
        parent: Id,
        child: Id,
        relationship: &str,
        scope: Option<Id>,
    ) -> Result<EntityAssociationDto, MdrError> {
        let data = CreateEntityAssociation::new(parent, child, relationship);
        let data = match scope {
            Some(data_model_id) => data.extended_by(data_model_id),
            None => data,
        };
        AssociationRegistry::create(session, data).await
    }

    #[tokio::test]
    async fn test_create_requires_existing_entities() {
        let store = store();
        let mut session = session(&store).await;

        let missing_parent = create(&mut session, 404, 11, "contains", None).await;
        assert!(matches!(missing_parent, Err(MdrError::NotFound(_))));

        let missing_child = create(&mut session, 10, 404, "contains", None).await;
        assert!(matches!(missing_child, Err(MdrError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_conflicts_with_same_or_base_scope() {
        let store = store();
        let mut session = session(&store).await;

        create(&mut session, 10, 11, "contains", Some(5)).await.unwrap();

        let same_scope = create(&mut session, 10, 11, "references", Some(5)).await;
        assert!(matches!(same_scope, Err(MdrError::Conflict(_))));

        let base_scope = create(&mut session, 10, 11, "contains", None).await;
        assert!(matches!(base_scope, Err(MdrError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_base_association_blocks_every_extension_scope() {
        let store = store();
        let mut session = session(&store).await;

        create(&mut session, 10, 11, "contains", None).await.unwrap();

        let scoped = create(&mut session, 10, 11, "contains", Some(EXT_MODEL)).await;
        match scoped {
            Err(MdrError::Conflict(msg)) => {
                assert!(msg.contains("parent (10) and child (11)"));
                assert!(msg.contains("ExtendedByDataModelId 99 or Base LIF"));
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_distinct_extension_scopes_do_not_conflict() {
        let store = store();
        let mut session = session(&store).await;

        create(&mut session, 10, 11, "contains", Some(5)).await.unwrap();
        create(&mut session, 10, 11, "references", Some(7)).await.unwrap();

        let all = AssociationRegistry::retrieve_all_associations(&mut session, 10, 11, Some(5))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_reversed_pair_is_a_different_association() {
        let store = store();
        let mut session = session(&store).await;

        create(&mut session, 10, 11, "contains", None).await.unwrap();
        create(&mut session, 11, 10, "contains", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_extension_flag_is_derived_from_endpoints() {
        let store = store();
        let mut session = session(&store).await;

        let mut data = CreateEntityAssociation::new(20, 10, "contains");
        data.extension = Some(false);
        let created = AssociationRegistry::create(&mut session, data).await.unwrap();
        assert!(created.extension);

        let mut data = CreateEntityAssociation::new(10, 11, "contains");
        data.extension = Some(true);
        let created = AssociationRegistry::create(&mut session, data).await.unwrap();
        assert!(!created.extension);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_association() {
        let store = store();
        let mut session = session(&store).await;

        let created = create(&mut session, 10, 11, "contains", None).await.unwrap();
        let message = AssociationRegistry::soft_delete(&mut session, created.id)
            .await
            .unwrap();
        assert_eq!(
            message.message,
            format!("Entity association with ID {} deleted successfully", created.id)
        );
        session.commit().await.unwrap();

        let mut session = store.begin().await.unwrap();
        assert!(matches!(
            AssociationRegistry::get_by_id(&mut session, created.id).await,
            Err(MdrError::NotFound(msg)) if msg.ends_with("is deleted")
        ));
        let listed = AssociationRegistry::list_by_parent_entity(&mut session, 10, None)
            .await
            .unwrap();
        assert!(listed.is_empty());

        // still physically present
        assert!(store.association(created.id).unwrap().deleted);

        // a soft-deleted association no longer blocks a new one
        create(&mut session, 10, 11, "contains", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_hard_delete_removes_row() {
        let store = store();
        let mut session = session(&store).await;

        let created = create(&mut session, 10, 11, "contains", None).await.unwrap();
        AssociationRegistry::delete(&mut session, created.id).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(store.association(created.id), None);
        let mut session = store.begin().await.unwrap();
        assert!(matches!(
            AssociationRegistry::delete(&mut session, created.id).await,
            Err(MdrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update_changes_only_given_fields() {
        let store = store();
        let mut session = session(&store).await;

        let mut data = CreateEntityAssociation::new(10, 11, "contains");
        data.placement = Some("Embedded".to_string());
        data.contributor = Some("alice".to_string());
        let created = AssociationRegistry::create(&mut session, data).await.unwrap();

        let patch = UpdateEntityAssociation {
            notes: Some(Some("x".to_string())),
            ..Default::default()
        };
        let updated = AssociationRegistry::update(&mut session, created.id, patch)
            .await
            .unwrap();

        let mut expected = created.clone();
        expected.notes = Some("x".to_string());
        assert_eq!(updated, expected);
    }

    #[tokio::test]
    async fn test_update_rejects_duplicate_relationship() {
        let store = store();
        let mut session = session(&store).await;

        let first = create(&mut session, 10, 11, "contains", None).await.unwrap();
        // a second relationship on the same pair can only come from an update
        let second = create(&mut session, 10, 12, "references", None).await.unwrap();
        let patch = UpdateEntityAssociation {
            child_entity_id: Some(11),
            ..Default::default()
        };
        AssociationRegistry::update(&mut session, second.id, patch)
            .await
            .unwrap();

        let patch = UpdateEntityAssociation {
            relationship: Some("contains".to_string()),
            ..Default::default()
        };
        let result = AssociationRegistry::update(&mut session, second.id, patch).await;
        assert!(matches!(result, Err(MdrError::Conflict(_))));

        let patch = UpdateEntityAssociation {
            placement: Some(Some("Reference".to_string())),
            ..Default::default()
        };
        let updated = AssociationRegistry::update(&mut session, second.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.placement.as_deref(), Some("Reference"));

        // re-asserting its own identity is not a conflict
        let patch = UpdateEntityAssociation {
            relationship: Some("contains".to_string()),
            ..Default::default()
        };
        AssociationRegistry::update(&mut session, first.id, patch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_moving_to_base_scope_conflicts_with_later_extension_row() {
        let store = store();
        let mut session = session(&store).await;

        let first = create(&mut session, 10, 11, "contains", Some(5)).await.unwrap();
        let second = create(&mut session, 10, 11, "contains", Some(7)).await.unwrap();
        assert!(first.id < second.id);

        let patch = UpdateEntityAssociation {
            extended_by_data_model_id: Some(None),
            ..Default::default()
        };
        let result = AssociationRegistry::update(&mut session, first.id, patch).await;
        assert!(matches!(result, Err(MdrError::Conflict(_))));

        let unchanged = AssociationRegistry::get_by_id(&mut session, first.id).await.unwrap();
        assert_eq!(unchanged.extended_by_data_model_id, Some(5));
    }

    #[tokio::test]
    async fn test_update_endpoint_onto_pair_held_by_later_row_conflicts() {
        let store = store();
        let mut session = session(&store).await;

        let first = create(&mut session, 10, 12, "contains", None).await.unwrap();
        let second = create(&mut session, 10, 11, "contains", None).await.unwrap();
        assert!(first.id < second.id);

        let patch = UpdateEntityAssociation {
            child_entity_id: Some(11),
            ..Default::default()
        };
        let result = AssociationRegistry::update(&mut session, first.id, patch).await;
        assert!(matches!(result, Err(MdrError::Conflict(_))));

        // a different relationship on that pair is still allowed
        let patch = UpdateEntityAssociation {
            child_entity_id: Some(11),
            relationship: Some("references".to_string()),
            ..Default::default()
        };
        let updated = AssociationRegistry::update(&mut session, first.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.child_entity_id, 11);
    }

    #[tokio::test]
    async fn test_update_validates_new_endpoints_and_recomputes_extension() {
        let store = store();
        let mut session = session(&store).await;

        let created = create(&mut session, 10, 11, "contains", None).await.unwrap();
        assert!(!created.extension);

        let patch = UpdateEntityAssociation {
            child_entity_id: Some(404),
            ..Default::default()
        };
        assert!(matches!(
            AssociationRegistry::update(&mut session, created.id, patch).await,
            Err(MdrError::NotFound(_))
        ));

        let patch = UpdateEntityAssociation {
            child_entity_id: Some(20),
            ..Default::default()
        };
        let updated = AssociationRegistry::update(&mut session, created.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.child_entity_id, 20);
        assert!(updated.extension);
    }

    #[tokio::test]
    async fn test_update_of_deleted_association_is_not_found() {
        let store = store();
        let mut session = session(&store).await;

        let created = create(&mut session, 10, 11, "contains", None).await.unwrap();
        AssociationRegistry::soft_delete(&mut session, created.id).await.unwrap();

        let patch = UpdateEntityAssociation {
            notes: Some(None),
            ..Default::default()
        };
        assert!(matches!(
            AssociationRegistry::update(&mut session, created.id, patch).await,
            Err(MdrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_parent_child_relationship() {
        let store = store();
        let mut session = session(&store).await;

        let created = create(&mut session, 10, 11, "contains", Some(EXT_MODEL)).await.unwrap();

        let found = AssociationRegistry::find_by_parent_child_relationship(
            &mut session,
            10,
            11,
            "contains",
            Some(EXT_MODEL),
        )
        .await
        .unwrap();
        assert_eq!(found.map(|a| a.id), Some(created.id));

        let other_scope = AssociationRegistry::find_by_parent_child_relationship(
            &mut session,
            10,
            11,
            "contains",
            Some(OTHER_EXT_MODEL),
        )
        .await
        .unwrap();
        assert_eq!(other_scope, None);

        let other_relationship = AssociationRegistry::find_by_parent_child_relationship(
            &mut session,
            10,
            11,
            "references",
            Some(EXT_MODEL),
        )
        .await
        .unwrap();
        assert_eq!(other_relationship, None);
    }

    #[tokio::test]
    async fn test_retrieve_all_requires_a_match() {
        let store = store();
        let mut session = session(&store).await;

        assert!(matches!(
            AssociationRegistry::retrieve_all_associations(&mut session, 10, 11, None).await,
            Err(MdrError::NotFound(_))
        ));
        assert!(!AssociationRegistry::check_existing_association(&mut session, 10, 11, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_by_base_data_model_merges_both_sides() {
        let store = store();
        let mut session = session(&store).await;

        let inside = create(&mut session, 10, 11, "contains", None).await.unwrap();
        let parent_side = create(&mut session, 12, 30, "references", None).await.unwrap();
        let child_side = create(&mut session, 30, 10, "references", None).await.unwrap();
        create(&mut session, 10, 12, "contains", Some(EXT_MODEL)).await.unwrap();
        create(&mut session, 30, 30, "self", None).await.unwrap();

        let listed = AssociationRegistry::list_by_data_model(&mut session, BASE_MODEL)
            .await
            .unwrap();
        let ids: Vec<Id> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![inside.id, parent_side.id, child_side.id]);
    }

    #[tokio::test]
    async fn test_list_by_extension_data_model_uses_inclusion_set() {
        let store = store();
        let mut session = session(&store).await;

        let base_pair = create(&mut session, 10, 11, "contains", None).await.unwrap();
        let scoped_pair = create(&mut session, 11, 12, "contains", Some(EXT_MODEL)).await.unwrap();
        create(&mut session, 10, 12, "contains", Some(OTHER_EXT_MODEL)).await.unwrap();
        let with_extension_entity = create(&mut session, 10, 20, "contains", None).await.unwrap();
        assert!(with_extension_entity.extension);
        session.commit().await.unwrap();

        store.include_in_extension(EXT_MODEL, ElementType::Entity, 10);
        store.include_in_extension(EXT_MODEL, ElementType::Entity, 11);
        store.include_in_extension(EXT_MODEL, ElementType::Entity, 12);
        store.include_in_extension(EXT_MODEL, ElementType::Attribute, 20);

        let mut session = store.begin().await.unwrap();
        let listed = AssociationRegistry::list_by_data_model(&mut session, EXT_MODEL)
            .await
            .unwrap();
        let ids: Vec<Id> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![base_pair.id, scoped_pair.id]);

        // absent from the extension listing but still retrievable
        let fetched = AssociationRegistry::get_by_id(&mut session, with_extension_entity.id)
            .await
            .unwrap();
        assert_eq!(fetched.child_entity_id, 20);
    }

    #[tokio::test]
    async fn test_list_by_missing_data_model() {
        let store = store();
        let mut session = session(&store).await;

        assert!(matches!(
            AssociationRegistry::list_by_data_model(&mut session, 404).await,
            Err(MdrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_parent_entity_scoping() {
        let store = store();
        let mut session = session(&store).await;

        let base = create(&mut session, 10, 11, "contains", None).await.unwrap();
        let scoped = create(&mut session, 10, 12, "contains", Some(EXT_MODEL)).await.unwrap();
        create(&mut session, 10, 20, "contains", Some(OTHER_EXT_MODEL)).await.unwrap();
        create(&mut session, 11, 12, "contains", None).await.unwrap();

        let base_only = AssociationRegistry::list_by_parent_entity(&mut session, 10, None)
            .await
            .unwrap();
        assert_eq!(base_only.iter().map(|a| a.id).collect::<Vec<_>>(), vec![base.id]);

        let with_scope = AssociationRegistry::list_by_parent_entity(&mut session, 10, Some(EXT_MODEL))
            .await
            .unwrap();
        assert_eq!(
            with_scope.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![base.id, scoped.id]
        );

        assert!(matches!(
            AssociationRegistry::list_by_parent_entity(&mut session, 404, None).await,
            Err(MdrError::NotFound(_))
        ));
    }

    #[test]
    fn test_merge_by_id_deduplicates() {
        let row = |id: Id| {
            CreateEntityAssociation::new(1, 2, "contains")
                .into_new(false)
                .into_association(id)
        };
        let merged = merge_by_id(vec![row(3), row(1)], vec![row(1), row(2)]);
        assert_eq!(merged.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
