use crate::model::{Entity, EntityAssociation, Id};

/// Which `ExtendedByDataModelId` values an association query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Every scope, base and extension alike.
    Any,
    /// Base-model associations only (`ExtendedByDataModelId IS NULL`).
    BaseOnly,
    /// Base-model associations plus those scoped to the given extension model.
    BaseOr(Id),
}

impl ScopeFilter {
    /// Scopes that collide with `scope` when checking for duplicates.
    ///
    /// An extension scope collides with itself and with the base model; the
    /// base model collides with every scope.
    pub fn overlapping(scope: Option<Id>) -> Self {
        match scope {
            Some(data_model_id) => ScopeFilter::BaseOr(data_model_id),
            None => ScopeFilter::Any,
        }
    }

    /// Scopes visible from a read path: the base model plus, when given, one
    /// extension model.
    pub fn visible_from(scope: Option<Id>) -> Self {
        match scope {
            Some(data_model_id) => ScopeFilter::BaseOr(data_model_id),
            None => ScopeFilter::BaseOnly,
        }
    }

    pub fn accepts(&self, extended_by_data_model_id: Option<Id>) -> bool {
        match (self, extended_by_data_model_id) {
            (ScopeFilter::Any, _) => true,
            (ScopeFilter::BaseOnly, scope) => scope.is_none(),
            (ScopeFilter::BaseOr(_), None) => true,
            (ScopeFilter::BaseOr(wanted), Some(scope)) => *wanted == scope,
        }
    }
}

/// Filter over active (non-deleted) associations. Every populated field must
/// match; soft-deleted rows never match.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationQuery {
    pub parent_entity_id: Option<Id>,
    pub child_entity_id: Option<Id>,
    pub relationship: Option<String>,
    pub parent_entity_ids: Option<Vec<Id>>,
    pub child_entity_ids: Option<Vec<Id>>,
    pub parent_data_model_id: Option<Id>,
    pub child_data_model_id: Option<Id>,
    /// Row left out of the result, typically the one being updated.
    pub excluded_id: Option<Id>,
    pub scope: ScopeFilter,
}

impl AssociationQuery {
    pub fn active() -> Self {
        Self {
            parent_entity_id: None,
            child_entity_id: None,
            relationship: None,
            parent_entity_ids: None,
            child_entity_ids: None,
            parent_data_model_id: None,
            child_data_model_id: None,
            excluded_id: None,
            scope: ScopeFilter::Any,
        }
    }

    pub fn parent(mut self, parent_entity_id: Id) -> Self {
        self.parent_entity_id = Some(parent_entity_id);
        self
    }

    pub fn child(mut self, child_entity_id: Id) -> Self {
        self.child_entity_id = Some(child_entity_id);
        self
    }

    pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn parent_in(mut self, ids: Vec<Id>) -> Self {
        self.parent_entity_ids = Some(ids);
        self
    }

    pub fn child_in(mut self, ids: Vec<Id>) -> Self {
        self.child_entity_ids = Some(ids);
        self
    }

    pub fn parent_in_data_model(mut self, data_model_id: Id) -> Self {
        self.parent_data_model_id = Some(data_model_id);
        self
    }

    pub fn child_in_data_model(mut self, data_model_id: Id) -> Self {
        self.child_data_model_id = Some(data_model_id);
        self
    }

    pub fn excluding(mut self, association_id: Id) -> Self {
        self.excluded_id = Some(association_id);
        self
    }

    pub fn scope(mut self, scope: ScopeFilter) -> Self {
        self.scope = scope;
        self
    }

    /// Evaluates the filter against a row. `lookup_entity` resolves endpoint
    /// entities for the data-model conditions; a missing entity fails them.
    pub fn matches<F>(&self, association: &EntityAssociation, lookup_entity: F) -> bool
    where
        F: Fn(Id) -> Option<Entity>,
    {
        if association.deleted || self.excluded_id == Some(association.id) {
            return false;
        }
        if self
            .parent_entity_id
            .is_some_and(|id| id != association.parent_entity_id)
        {
            return false;
        }
        if self
            .child_entity_id
            .is_some_and(|id| id != association.child_entity_id)
        {
            return false;
        }
        if let Some(relationship) = &self.relationship {
            if relationship != &association.relationship {
                return false;
            }
        }
        if let Some(ids) = &self.parent_entity_ids {
            if !ids.contains(&association.parent_entity_id) {
                return false;
            }
        }
        if let Some(ids) = &self.child_entity_ids {
            if !ids.contains(&association.child_entity_id) {
                return false;
            }
        }
        if let Some(data_model_id) = self.parent_data_model_id {
            match lookup_entity(association.parent_entity_id) {
                Some(entity) if entity.data_model_id == data_model_id => {}
                _ => return false,
            }
        }
        if let Some(data_model_id) = self.child_data_model_id {
            match lookup_entity(association.child_entity_id) {
                Some(entity) if entity.data_model_id == data_model_id => {}
                _ => return false,
            }
        }
        self.scope.accepts(association.extended_by_data_model_id)
    }
}
