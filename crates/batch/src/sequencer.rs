//! In-order dispatch of batch steps.

use multisig_core::{BatchError, Dispatcher};
use multisig_types::{AccountId, Amount};
use tracing::debug;

/// Dispatch `(targets[i], values[i], payloads[i])` for `i` in `0..n`.
///
/// Stops at the first failing step. Undoing the steps that already ran is
/// the substrate's job: on the ledger the whole relay call reverts.
pub fn run_batch<D>(
    dispatcher: &mut D,
    targets: &[AccountId],
    payloads: &[Vec<u8>],
    values: &[Amount],
) -> Result<(), BatchError>
where
    D: Dispatcher + ?Sized,
{
    if targets.len() != payloads.len() || targets.len() != values.len() {
        return Err(BatchError::LengthMismatch {
            targets: targets.len(),
            payloads: payloads.len(),
            values: values.len(),
        });
    }

    let steps = targets.iter().zip(payloads).zip(values);
    for (index, ((target, payload), value)) in steps.enumerate() {
        debug!(step = index, target = %target, value = *value, "Relaying batch step");
        dispatcher
            .invoke(*target, *value, payload)
            .map_err(|source| BatchError::BatchStepFailed {
                index,
                source: Box::new(source),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_core::DispatchError;
    use multisig_types::test_utils::test_accounts;
    use tracing_test::traced_test;

    /// Records dispatches; fails the call whose position is `fail_at`.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(AccountId, Amount, Vec<u8>)>,
        fail_at: Option<usize>,
    }

    impl Dispatcher for Recorder {
        fn invoke(
            &mut self,
            target: AccountId,
            value: Amount,
            payload: &[u8],
        ) -> Result<(), DispatchError> {
            if self.fail_at == Some(self.calls.len()) {
                return Err(DispatchError::Reverted("step rejected".into()));
            }
            self.calls.push((target, value, payload.to_vec()));
            Ok(())
        }
    }

    #[traced_test]
    #[test]
    fn test_steps_run_in_order() {
        let targets = test_accounts(3);
        let payloads = vec![vec![0], vec![1], vec![2]];
        let values = vec![10, 0, 5];
        let mut recorder = Recorder::default();

        run_batch(&mut recorder, &targets, &payloads, &values).unwrap();

        assert_eq!(
            recorder.calls,
            vec![
                (targets[0], 10, vec![0]),
                (targets[1], 0, vec![1]),
                (targets[2], 5, vec![2]),
            ]
        );
    }

    #[test]
    fn test_length_mismatch_dispatches_nothing() {
        let targets = test_accounts(2);
        let mut recorder = Recorder::default();

        let err = run_batch(&mut recorder, &targets, &[vec![]], &[0, 0]).unwrap_err();

        assert_eq!(
            err,
            BatchError::LengthMismatch {
                targets: 2,
                payloads: 1,
                values: 2
            }
        );
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_first_failure_stops_the_batch() {
        let targets = test_accounts(4);
        let payloads = vec![vec![]; 4];
        let values = vec![0; 4];
        let mut recorder = Recorder {
            fail_at: Some(1),
            ..Default::default()
        };

        let err = run_batch(&mut recorder, &targets, &payloads, &values).unwrap_err();

        assert_eq!(
            err,
            BatchError::BatchStepFailed {
                index: 1,
                source: Box::new(DispatchError::Reverted("step rejected".into())),
            }
        );
        assert_eq!(recorder.calls.len(), 1);
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let mut recorder = Recorder::default();
        run_batch(&mut recorder, &[], &[], &[]).unwrap();
        assert!(recorder.calls.is_empty());
    }
}
