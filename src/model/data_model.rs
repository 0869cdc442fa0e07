use serde::{Deserialize, Serialize};

use crate::model::{ElementType, Id};

/// Kind of a data model. `OrgLIF` and `PartnerLIF` extend the base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataModelType {
    #[serde(rename = "BaseLIF")]
    BaseLif,
    SourceSchema,
    #[serde(rename = "OrgLIF")]
    OrgLif,
    #[serde(rename = "PartnerLIF")]
    PartnerLif,
}

impl DataModelType {
    pub fn is_extension(&self) -> bool {
        matches!(self, DataModelType::OrgLif | DataModelType::PartnerLif)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataModelType::BaseLif => "BaseLIF",
            DataModelType::SourceSchema => "SourceSchema",
            DataModelType::OrgLif => "OrgLIF",
            DataModelType::PartnerLif => "PartnerLIF",
        }
    }
}

impl std::fmt::Display for DataModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BaseLIF" => Ok(DataModelType::BaseLif),
            "SourceSchema" => Ok(DataModelType::SourceSchema),
            "OrgLIF" => Ok(DataModelType::OrgLif),
            "PartnerLIF" => Ok(DataModelType::PartnerLif),
            _ => Err(format!("Unknown data model type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataModel {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub data_model_version: Option<String>,
    pub base_data_model_id: Option<Id>,
    #[serde(rename = "Type")]
    pub model_type: DataModelType,
    pub deleted: bool,
}

impl DataModel {
    pub fn new(id: Id, name: impl Into<String>, model_type: DataModelType) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            data_model_version: None,
            base_data_model_id: None,
            model_type,
            deleted: false,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.data_model_version = Some(version.into());
        self
    }

    pub fn is_extension(&self) -> bool {
        self.model_type.is_extension()
    }
}

/// One row of `ExtInclusionsFromBaseDM`: an element of the base model that an
/// extension model incorporates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtInclusion {
    pub id: Id,
    pub ext_data_model_id: Id,
    pub element_type: ElementType,
    pub included_element_id: Id,
    pub deleted: bool,
}
