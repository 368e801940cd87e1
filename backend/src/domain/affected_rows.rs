//! Mutation outcome reported by update and delete operations.

use serde::{Deserialize, Serialize};

/// Number of stored rows a mutation touched.
///
/// # Examples
/// ```
/// use recipe_backend::domain::AffectedRows;
///
/// let outcome = AffectedRows::new(1);
/// assert_eq!(serde_json::to_value(outcome).expect("serialise"), serde_json::json!({ "affected": 1 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedRows {
    /// Rows changed or removed.
    pub affected: u64,
}

impl AffectedRows {
    /// Wrap a raw row count.
    pub const fn new(affected: u64) -> Self {
        Self { affected }
    }

    /// True when nothing matched.
    pub const fn is_none(self) -> bool {
        self.affected == 0
    }
}
