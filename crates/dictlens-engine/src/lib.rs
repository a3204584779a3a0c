//! dictlens engine - dictionary comparison logic
//!
//! This crate implements the comparator that sits between the dictionary
//! store and a renderer:
//! - Field-level diffs between two dictionary versions
//! - Relation graph to tree construction
//! - Free-text field filtering
//! - Whole-dictionary comparison reports
//!
//! Everything here is pure computation over loaded documents.

pub mod field_diff;
pub mod relation_tree;
pub mod filter;
pub mod dictionary_diff;

pub use field_diff::{compare_field, find_field};
pub use relation_tree::{
    build_relation_tree, relation_text, DroppedKind, DroppedRelation, LinkKind, NodeId,
    RelationTree, TreeLink, TreeNode,
};
pub use filter::{filter_by_text, match_counts, search_text, TextFilter};
pub use dictionary_diff::compare_dictionaries;
