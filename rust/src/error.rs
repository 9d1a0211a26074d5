//! Error handling and result types for BPlusTree operations.
//!
//! Node-level precondition violations, invalid configuration and detected
//! corruption are all reported through [`BPlusTreeError`]. A value that is
//! simply absent is never an error.

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BPlusTreeError {
    /// Fan-out too small to support split and merge.
    InvalidFanout(String),
    /// Insertion into a node that is already at capacity.
    NodeFull(String),
    /// Removal that would take a non-root node below minimum occupancy.
    NodeUnderflow(String),
    /// Internal data structure integrity violation.
    DataIntegrityError(String),
    /// Arena operation failed.
    ArenaError(String),
    /// Tree corruption detected.
    CorruptedTree(String),
    /// Invalid tree state.
    InvalidState(String),
}

impl BPlusTreeError {
    /// Create an InvalidFanout error with context
    pub fn invalid_fanout(node_kind: &str, fanout: usize, min_required: usize) -> Self {
        Self::InvalidFanout(format!(
            "{} fan-out {} is invalid (minimum required: {})",
            node_kind, fanout, min_required
        ))
    }

    /// Create a NodeFull error with context
    pub fn node_full(node_kind: &str, capacity: usize) -> Self {
        Self::NodeFull(format!(
            "{} node already holds {} elements, split before inserting",
            node_kind, capacity
        ))
    }

    /// Create a NodeUnderflow error with context
    pub fn node_underflow(node_kind: &str, len: usize, min: usize) -> Self {
        Self::NodeUnderflow(format!(
            "{} node with {} elements cannot drop below {}, merge first",
            node_kind, len, min
        ))
    }

    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// Create an ArenaError with context
    pub fn arena_error(operation: &str, details: &str) -> Self {
        Self::ArenaError(format!("{} failed: {}", operation, details))
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Create an InvalidState error with context
    pub fn invalid_state(operation: &str, state: &str) -> Self {
        Self::InvalidState(format!("Cannot {} in state: {}", operation, state))
    }

    /// Check if this error is a fan-out error
    pub fn is_fanout_error(&self) -> bool {
        matches!(self, Self::InvalidFanout(_))
    }

    /// Check if this error reports misuse of a node-level operation.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::NodeFull(_) | Self::NodeUnderflow(_) | Self::InvalidState(_)
        )
    }
}

impl std::fmt::Display for BPlusTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BPlusTreeError::InvalidFanout(msg) => write!(f, "Invalid fan-out: {}", msg),
            BPlusTreeError::NodeFull(msg) => write!(f, "Node full: {}", msg),
            BPlusTreeError::NodeUnderflow(msg) => write!(f, "Node underflow: {}", msg),
            BPlusTreeError::DataIntegrityError(msg) => write!(f, "Data integrity error: {}", msg),
            BPlusTreeError::ArenaError(msg) => write!(f, "Arena error: {}", msg),
            BPlusTreeError::CorruptedTree(msg) => write!(f, "Corrupted tree: {}", msg),
            BPlusTreeError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for BPlusTreeError {}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction and validation
pub type InitResult<T> = Result<T, BPlusTreeError>;

/// Result extension trait for improved error handling
pub trait BTreeResultExt<T> {
    /// Convert to a BTreeResult with additional context
    fn with_context(self, context: &str) -> BTreeResult<T>;

    /// Convert to a BTreeResult with operation context
    fn with_operation(self, operation: &str) -> BTreeResult<T>;

    /// Log error and continue with default value
    fn or_default_with_log(self) -> T
    where
        T: Default;
}

impl<T> BTreeResultExt<T> for Result<T, BPlusTreeError> {
    fn with_context(self, context: &str) -> BTreeResult<T> {
        self.map_err(|e| match e {
            BPlusTreeError::InvalidFanout(msg) => {
                BPlusTreeError::InvalidFanout(format!("{}: {}", context, msg))
            }
            BPlusTreeError::NodeFull(msg) => {
                BPlusTreeError::NodeFull(format!("{}: {}", context, msg))
            }
            BPlusTreeError::NodeUnderflow(msg) => {
                BPlusTreeError::NodeUnderflow(format!("{}: {}", context, msg))
            }
            BPlusTreeError::DataIntegrityError(msg) => {
                BPlusTreeError::data_integrity(context, &msg)
            }
            BPlusTreeError::ArenaError(msg) => BPlusTreeError::arena_error(context, &msg),
            BPlusTreeError::CorruptedTree(msg) => BPlusTreeError::corrupted_tree(context, &msg),
            BPlusTreeError::InvalidState(msg) => {
                BPlusTreeError::InvalidState(format!("{}: {}", context, msg))
            }
        })
    }

    fn with_operation(self, operation: &str) -> BTreeResult<T> {
        self.with_context(&format!("Operation '{}'", operation))
    }

    fn or_default_with_log(self) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                log::warn!("B+ tree operation failed, using default: {}", e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(BPlusTreeError::node_full("Leaf", 3).is_precondition_violation());
        assert!(BPlusTreeError::node_underflow("Branch", 1, 1).is_precondition_violation());
        assert!(!BPlusTreeError::corrupted_tree("Leaf chain", "cycle").is_precondition_violation());
        assert!(BPlusTreeError::invalid_fanout("Leaf", 2, 3).is_fanout_error());
    }

    #[test]
    fn test_with_operation_keeps_variant() {
        let result: BTreeResult<()> = Err(BPlusTreeError::node_full("Leaf", 3));
        match result.with_operation("insert") {
            Err(BPlusTreeError::NodeFull(msg)) => {
                assert!(msg.starts_with("Operation 'insert'"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_or_default_with_log() {
        let failed: BTreeResult<bool> = Err(BPlusTreeError::invalid_state("search", "empty"));
        assert!(!failed.or_default_with_log());
        let ok: BTreeResult<usize> = Ok(7);
        assert_eq!(ok.or_default_with_log(), 7);
    }

    #[test]
    fn test_display() {
        let err = BPlusTreeError::node_underflow("Leaf", 1, 1);
        assert_eq!(
            err.to_string(),
            "Node underflow: Leaf node with 1 elements cannot drop below 1, merge first"
        );
    }
}
