pub mod conflict;
pub mod copy_engine;
pub mod item;
pub mod path_resolver;
pub mod session;
pub mod subtree_guard;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use conflict::{
    unique_name, ConflictChoice, ConflictDecision, ConflictPolicy, ConflictPrompt, ConflictResolver,
};
pub use copy_engine::{CopyEngine, Flow};
pub use item::{ClipboardItem, ItemKind};
pub use path_resolver::{common_prefix, join_path, relative_path, resolve_target};
pub use session::{PasteSession, SessionOutcome, SessionReport};
pub use subtree_guard::{check_subtree, find_subtree_conflicts, SubtreeConflict};
pub use validation::{validate_destination, validate_items};
