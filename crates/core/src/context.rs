//! Call context handed to contracts.

use multisig_types::{AccountId, Amount};

/// Identity and value of one call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account whose code is executing.
    pub address: AccountId,
    /// Immediate caller: the external sender for a top-level call, the
    /// dispatching contract for a nested one.
    pub caller: AccountId,
    /// Sender of the enclosing top-level transaction.
    pub origin: AccountId,
    /// Value transferred with this call.
    pub value: Amount,
    /// Nesting depth; 0 for a top-level call.
    pub depth: usize,
}

impl CallContext {
    /// Context for a top-level call from `sender`.
    pub fn top_level(sender: AccountId, address: AccountId, value: Amount) -> Self {
        Self {
            address,
            caller: sender,
            origin: sender,
            value,
            depth: 0,
        }
    }

    /// Context for a call this frame dispatches to `target`.
    pub fn nested(&self, target: AccountId, value: Amount) -> Self {
        Self {
            address: target,
            caller: self.address,
            origin: self.origin,
            value,
            depth: self.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_types::test_utils::test_account;

    #[test]
    fn test_nested_context_uses_contract_as_caller() {
        let sender = test_account(0);
        let relay = test_account(1);
        let registry = test_account(2);

        let top = CallContext::top_level(sender, relay, 10);
        let inner = top.nested(registry, 0);

        assert_eq!(inner.caller, relay);
        assert_eq!(inner.origin, sender);
        assert_eq!(inner.address, registry);
        assert_eq!(inner.depth, 1);
    }
}
