use serde::{Deserialize, Deserializer, Serialize};

/// Primary key type shared by every MDR table.
pub type Id = i64;

/// Element kinds an extension data model can pull in from its base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Entity,
    Attribute,
    ValueSet,
    ValueSetValue,
    TransformationGroup,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Entity => "Entity",
            ElementType::Attribute => "Attribute",
            ElementType::ValueSet => "ValueSet",
            ElementType::ValueSetValue => "ValueSetValue",
            ElementType::TransformationGroup => "TransformationGroup",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserializes a present field as `Some(value)`, including an explicit `null`.
///
/// Paired with `#[serde(default)]` on an `Option<Option<T>>` field this keeps
/// "field absent" (`None`) apart from "field set to null" (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Plain acknowledgement body returned by delete operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
