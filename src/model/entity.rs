use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// An entity row of the metadata repository.
///
/// `extension` is true when the owning data model is an extension model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entity {
    pub id: Id,
    pub name: String,
    pub unique_name: Option<String>,
    pub description: Option<String>,
    pub data_model_id: Id,
    pub extension: bool,
    pub creation_date: Option<DateTime<Utc>>,
    pub deleted: bool,
}

impl Entity {
    pub fn new(id: Id, name: impl Into<String>, data_model_id: Id, extension: bool) -> Self {
        Self {
            id,
            name: name.into(),
            unique_name: None,
            description: None,
            data_model_id,
            extension,
            creation_date: None,
            deleted: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}
