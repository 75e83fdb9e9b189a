//! Symbol and field-path resolution against the upstream symbol table.

pub mod field_path;
pub mod symbol;

pub use field_path::{UnionArm, resolve_union_arm};
pub use symbol::{alias_chain, resolve_concrete};
