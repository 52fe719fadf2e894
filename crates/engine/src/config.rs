//! Configuration for the ledger.

/// Limits applied to every transaction.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum nesting depth of dispatches below a top-level call.
    ///
    /// A dispatch deeper than this fails with `CallDepthExceeded`, which
    /// bounds reentrancy loops.
    pub max_call_depth: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { max_call_depth: 64 }
    }
}

impl LedgerConfig {
    /// Set the maximum call depth.
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
