//! Domain layer: organization forest and its editing rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod editor;
pub mod entities;
pub mod error;
pub mod ids;
pub mod search;

pub use arena::{Forest, OrgEntry};
pub use builder::TreeBuilder;
pub use editor::{EditorOptions, OrgTreeEditor};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use ids::generate_next_id;
pub use search::{filter_by_query, flatten, picklist, Searchable};
