//! Command structs for engine operations.
//!
//! These types group parameters for write operations (transactions,
//! transfers, wallets, goals), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Currency, TransactionKind, WalletKind};

/// Create a wallet inside a budget.
#[derive(Clone, Debug)]
pub struct NewWalletCmd {
    pub budget_id: Uuid,
    pub name: String,
    pub part_of_general_balance: bool,
    pub kind: WalletKind,
    pub currency: Option<Currency>,
    pub opening_balance_minor: i64,
}

impl NewWalletCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            budget_id,
            name: name.into(),
            part_of_general_balance: true,
            kind: WalletKind::default(),
            currency: None,
            opening_balance_minor: 0,
        }
    }

    #[must_use]
    pub fn part_of_general_balance(mut self, flag: bool) -> Self {
        self.part_of_general_balance = flag;
        self
    }

    /// Explicit currency; must match the owning budget. Defaults to the
    /// budget currency.
    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: WalletKind) -> Self {
        self.kind = kind;
        self
    }

    /// Seed the wallet with a starting balance, recorded as a synthetic
    /// correction transaction so the aggregates stay explainable.
    #[must_use]
    pub fn opening_balance_minor(mut self, amount_minor: i64) -> Self {
        self.opening_balance_minor = amount_minor;
        self
    }
}

/// Create a regular income or expense transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub wallet_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        wallet_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_id,
            kind,
            amount_minor,
            category_id: None,
            description: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update an existing transaction.
///
/// Unset fields keep their stored value. The transaction kind is immutable;
/// passing a different kind is rejected. The category patch distinguishes
/// "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub wallet_id: Option<Uuid>,
    pub category: Option<Option<Uuid>>,
    pub description: Option<Option<String>>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            kind: None,
            amount_minor: None,
            wallet_id: None,
            category: None,
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category = Some(Some(category_id));
        self
    }

    #[must_use]
    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Move money between two wallets of the same budget.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub source_wallet_id: Uuid,
    pub target_wallet_id: Uuid,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        source_wallet_id: Uuid,
        target_wallet_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_wallet_id,
            target_wallet_id,
            amount_minor,
            description: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update an existing transfer.
///
/// Unset fields keep their stored value. Retargeting a leg reverses the old
/// leg and applies the new one; the same-budget rule is re-checked.
#[derive(Clone, Debug)]
pub struct UpdateTransferCmd {
    pub transfer_id: Uuid,
    pub source_wallet_id: Option<Uuid>,
    pub target_wallet_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub description: Option<Option<String>>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransferCmd {
    #[must_use]
    pub fn new(transfer_id: Uuid) -> Self {
        Self {
            transfer_id,
            source_wallet_id: None,
            target_wallet_id: None,
            amount_minor: None,
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn source_wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.source_wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn target_wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.target_wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Create a goal tracking a category set over a date window.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub name: String,
    pub kind: TransactionKind,
    pub planned_amount_minor: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category_ids: Vec<Uuid>,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: TransactionKind,
        planned_amount_minor: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            planned_amount_minor,
            start_date,
            end_date,
            category_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn category_ids(mut self, category_ids: Vec<Uuid>) -> Self {
        self.category_ids = category_ids;
        self
    }
}

/// Update an existing goal.
///
/// Unset fields keep their stored value; `category_ids` replaces the whole
/// category set when present. Any accepted update recomputes the goal's
/// actual amount from scratch.
#[derive(Clone, Debug)]
pub struct UpdateGoalCmd {
    pub goal_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<TransactionKind>,
    pub planned_amount_minor: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_ids: Option<Vec<Uuid>>,
}

impl UpdateGoalCmd {
    #[must_use]
    pub fn new(goal_id: Uuid) -> Self {
        Self {
            goal_id,
            name: None,
            kind: None,
            planned_amount_minor: None,
            start_date: None,
            end_date: None,
            category_ids: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn planned_amount_minor(mut self, amount_minor: i64) -> Self {
        self.planned_amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn category_ids(mut self, category_ids: Vec<Uuid>) -> Self {
        self.category_ids = Some(category_ids);
        self
    }
}
