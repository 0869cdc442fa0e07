pub mod association;
pub mod directory;

pub use association::*;
pub use directory::*;
