use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{deserialize_some, Id};

/// A directed association from a parent entity to a child entity.
///
/// `extended_by_data_model_id == None` places the association in the base
/// model; otherwise it is only visible inside that extension model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityAssociation {
    pub id: Id,
    pub parent_entity_id: Id,
    pub child_entity_id: Id,
    pub relationship: String,
    pub placement: Option<String>,
    pub notes: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub activation_date: Option<DateTime<Utc>>,
    pub deprecation_date: Option<DateTime<Utc>>,
    pub contributor: Option<String>,
    pub contributor_organization: Option<String>,
    pub extension: bool,
    pub extended_by_data_model_id: Option<Id>,
    pub deleted: bool,
}

/// Row content for an insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntityAssociation {
    pub parent_entity_id: Id,
    pub child_entity_id: Id,
    pub relationship: String,
    pub placement: Option<String>,
    pub notes: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub activation_date: Option<DateTime<Utc>>,
    pub deprecation_date: Option<DateTime<Utc>>,
    pub contributor: Option<String>,
    pub contributor_organization: Option<String>,
    pub extension: bool,
    pub extended_by_data_model_id: Option<Id>,
}

impl NewEntityAssociation {
    pub fn into_association(self, id: Id) -> EntityAssociation {
        EntityAssociation {
            id,
            parent_entity_id: self.parent_entity_id,
            child_entity_id: self.child_entity_id,
            relationship: self.relationship,
            placement: self.placement,
            notes: self.notes,
            creation_date: self.creation_date,
            activation_date: self.activation_date,
            deprecation_date: self.deprecation_date,
            contributor: self.contributor,
            contributor_organization: self.contributor_organization,
            extension: self.extension,
            extended_by_data_model_id: self.extended_by_data_model_id,
            deleted: false,
        }
    }
}

/// Request body for creating an association.
///
/// A caller-supplied `Extension` is accepted for wire compatibility but is
/// always recomputed from the endpoint entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEntityAssociation {
    pub parent_entity_id: Id,
    pub child_entity_id: Id,
    pub relationship: String,
    #[serde(default)]
    pub placement: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deprecation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contributor: Option<String>,
    #[serde(default)]
    pub contributor_organization: Option<String>,
    #[serde(default)]
    pub extension: Option<bool>,
    #[serde(default)]
    pub extended_by_data_model_id: Option<Id>,
}

impl CreateEntityAssociation {
    pub fn new(parent_entity_id: Id, child_entity_id: Id, relationship: impl Into<String>) -> Self {
        Self {
            parent_entity_id,
            child_entity_id,
            relationship: relationship.into(),
            placement: None,
            notes: None,
            creation_date: None,
            activation_date: None,
            deprecation_date: None,
            contributor: None,
            contributor_organization: None,
            extension: None,
            extended_by_data_model_id: None,
        }
    }

    pub fn extended_by(mut self, data_model_id: Id) -> Self {
        self.extended_by_data_model_id = Some(data_model_id);
        self
    }

    pub fn into_new(self, extension: bool) -> NewEntityAssociation {
        NewEntityAssociation {
            parent_entity_id: self.parent_entity_id,
            child_entity_id: self.child_entity_id,
            relationship: self.relationship,
            placement: self.placement,
            notes: self.notes,
            creation_date: self.creation_date,
            activation_date: self.activation_date,
            deprecation_date: self.deprecation_date,
            contributor: self.contributor,
            contributor_organization: self.contributor_organization,
            extension,
            extended_by_data_model_id: self.extended_by_data_model_id,
        }
    }
}

/// PATCH body for an association. Only fields present in the request are
/// applied; nullable columns use `Option<Option<T>>` so an explicit `null`
/// clears the column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateEntityAssociation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_entity_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_entity_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub placement: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub deprecation_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub contributor: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub contributor_organization: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub extended_by_data_model_id: Option<Option<Id>>,
}

impl UpdateEntityAssociation {
    /// True when the patch touches a field that takes part in duplicate detection.
    pub fn changes_identity(&self) -> bool {
        self.parent_entity_id.is_some()
            || self.child_entity_id.is_some()
            || self.relationship.is_some()
            || self.extended_by_data_model_id.is_some()
    }

    pub fn changes_endpoints(&self) -> bool {
        self.parent_entity_id.is_some() || self.child_entity_id.is_some()
    }

    /// The (parent, child, relationship, scope) tuple the association will have
    /// once this patch is applied to `existing`.
    pub fn effective_identity(&self, existing: &EntityAssociation) -> (Id, Id, String, Option<Id>) {
        (
            self.parent_entity_id.unwrap_or(existing.parent_entity_id),
            self.child_entity_id.unwrap_or(existing.child_entity_id),
            self.relationship
                .clone()
                .unwrap_or_else(|| existing.relationship.clone()),
            self.extended_by_data_model_id
                .unwrap_or(existing.extended_by_data_model_id),
        )
    }

    /// Applies every present field onto `existing`, leaving the rest untouched.
    pub fn apply_to(self, existing: &mut EntityAssociation) {
        if let Some(parent_entity_id) = self.parent_entity_id {
            existing.parent_entity_id = parent_entity_id;
        }
        if let Some(child_entity_id) = self.child_entity_id {
            existing.child_entity_id = child_entity_id;
        }
        if let Some(relationship) = self.relationship {
            existing.relationship = relationship;
        }
        if let Some(placement) = self.placement {
            existing.placement = placement;
        }
        if let Some(notes) = self.notes {
            existing.notes = notes;
        }
        if let Some(creation_date) = self.creation_date {
            existing.creation_date = creation_date;
        }
        if let Some(activation_date) = self.activation_date {
            existing.activation_date = activation_date;
        }
        if let Some(deprecation_date) = self.deprecation_date {
            existing.deprecation_date = deprecation_date;
        }
        if let Some(contributor) = self.contributor {
            existing.contributor = contributor;
        }
        if let Some(contributor_organization) = self.contributor_organization {
            existing.contributor_organization = contributor_organization;
        }
        if let Some(extended_by_data_model_id) = self.extended_by_data_model_id {
            existing.extended_by_data_model_id = extended_by_data_model_id;
        }
    }
}

/// Response shape for association reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityAssociationDto {
    pub id: Id,
    pub parent_entity_id: Id,
    pub child_entity_id: Id,
    pub relationship: String,
    pub placement: Option<String>,
    pub notes: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub activation_date: Option<DateTime<Utc>>,
    pub deprecation_date: Option<DateTime<Utc>>,
    pub contributor: Option<String>,
    pub contributor_organization: Option<String>,
    pub extension: bool,
    pub extended_by_data_model_id: Option<Id>,
}

impl From<EntityAssociation> for EntityAssociationDto {
    fn from(association: EntityAssociation) -> Self {
        Self {
            id: association.id,
            parent_entity_id: association.parent_entity_id,
            child_entity_id: association.child_entity_id,
            relationship: association.relationship,
            placement: association.placement,
            notes: association.notes,
            creation_date: association.creation_date,
            activation_date: association.activation_date,
            deprecation_date: association.deprecation_date,
            contributor: association.contributor,
            contributor_organization: association.contributor_organization,
            extension: association.extension,
            extended_by_data_model_id: association.extended_by_data_model_id,
        }
    }
}
