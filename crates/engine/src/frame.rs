//! A single call frame: the view a running contract has of the ledger.

use crate::Ledger;
use multisig_core::{
    CallContext, ContractState, DispatchError, Dispatcher, EmittedEvent, Event, Host,
};
use multisig_types::{AccountId, Amount};
use tracing::debug;

/// Borrow of the ledger for the duration of one contract call.
pub(crate) struct CallFrame<'a> {
    ledger: &'a mut Ledger,
    ctx: CallContext,
}

impl<'a> CallFrame<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger, ctx: CallContext) -> Self {
        Self { ledger, ctx }
    }
}

impl Dispatcher for CallFrame<'_> {
    fn invoke(
        &mut self,
        target: AccountId,
        value: Amount,
        payload: &[u8],
    ) -> Result<(), DispatchError> {
        self.ledger.dispatch(self.ctx.nested(target, value), payload)
    }
}

impl Host for CallFrame<'_> {
    fn context(&self) -> &CallContext {
        &self.ctx
    }

    fn state(&self) -> Option<ContractState> {
        self.ledger.world.storage.get(&self.ctx.address).cloned()
    }

    fn set_state(&mut self, state: ContractState) {
        self.ledger.world.storage.insert(self.ctx.address, state);
    }

    fn emit(&mut self, event: Event) {
        let sequence = self.ledger.sequence;
        debug!(
            emitter = %self.ctx.address,
            event = event.type_name(),
            sequence,
            "Event emitted"
        );
        self.ledger.world.events.push_back(EmittedEvent {
            emitter: self.ctx.address,
            sequence,
            event,
        });
    }

    fn query(&self, target: AccountId, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        self.ledger.query(target, request)
    }

    fn balance(&self) -> Amount {
        self.ledger.balance(self.ctx.address)
    }
}
