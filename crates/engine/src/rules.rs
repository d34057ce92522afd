//! Pure aggregation rules.
//!
//! Every mutation in the engine is expressed as signed deltas computed here,
//! applied to the stored aggregates inside one unit of work. Reversal is
//! always negation of the original delta, so create/update/delete stay exact
//! inverses of each other.

use crate::{MoneyCents, TransactionKind};

/// Signed effect of a transaction on its wallet balance.
///
/// Income adds the amount, expense subtracts it.
#[must_use]
pub fn wallet_delta(kind: TransactionKind, amount_minor: i64) -> MoneyCents {
    MoneyCents::new(kind.sign() * amount_minor)
}

/// Effect of a wallet-balance change on the owning budget's overall balance.
///
/// Only wallets flagged as part of the general balance propagate their
/// deltas; all others leave the budget aggregate untouched. Transfers bypass
/// this rule entirely and never reach the overall balance.
#[must_use]
pub fn budget_delta(wallet_delta: MoneyCents, part_of_general_balance: bool) -> MoneyCents {
    if part_of_general_balance {
        wallet_delta
    } else {
        MoneyCents::ZERO
    }
}

/// Signed legs of a transfer, as `(source, target)` deltas.
///
/// The two legs always sum to zero, and neither touches a budget overall
/// balance.
#[must_use]
pub fn transfer_deltas(amount_minor: i64) -> (MoneyCents, MoneyCents) {
    (
        MoneyCents::new(-amount_minor),
        MoneyCents::new(amount_minor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_increases_wallet_expense_decreases() {
        assert_eq!(
            wallet_delta(TransactionKind::Income, 5_000),
            MoneyCents::new(5_000)
        );
        assert_eq!(
            wallet_delta(TransactionKind::Expense, 5_000),
            MoneyCents::new(-5_000)
        );
    }

    #[test]
    fn budget_only_tracks_flagged_wallets() {
        let delta = MoneyCents::new(-2_500);
        assert_eq!(budget_delta(delta, true), delta);
        assert_eq!(budget_delta(delta, false), MoneyCents::ZERO);
    }

    #[test]
    fn reversal_is_negation() {
        let delta = wallet_delta(TransactionKind::Expense, 5_000);
        assert_eq!(delta + (-delta), MoneyCents::ZERO);
    }

    #[test]
    fn transfer_legs_sum_to_zero() {
        let (source, target) = transfer_deltas(7_500);
        assert_eq!(source + target, MoneyCents::ZERO);
        assert!(source.is_negative());
        assert!(target.is_positive());
    }
}
