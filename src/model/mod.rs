pub mod association;
pub mod common;
pub mod data_model;
pub mod entity;
pub mod query;

pub use association::*;
pub use common::*;
pub use data_model::*;
pub use entity::*;
pub use query::*;
