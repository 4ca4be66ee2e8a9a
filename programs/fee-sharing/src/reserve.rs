use crate::error::{FeeSharingError, LedgerResult};

/// Balance check for an admin sweep of the wrapped reserve.
/// Returns whether a transfer is needed; zero is a successful no-op.
pub fn check_sweep(balance: u64, amount: u64) -> LedgerResult<bool> {
    if amount > balance {
        return Err(FeeSharingError::InsufficientBalance);
    }
    Ok(amount > 0)
}
