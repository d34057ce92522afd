//! Balance and goal aggregation consistency engine.
//!
//! The engine keeps three derived aggregates consistent with the transaction
//! history, inside one database unit of work per mutation:
//!
//! - each wallet's balance,
//! - each budget's overall balance (fed only by wallets flagged as part of
//!   the general balance, and never by transfers),
//! - each goal's actual amount (fed by transactions matching the goal's
//!   kind, category set and date window).
//!
//! Mutations load what they need, compute signed deltas in memory (see
//! [`rules`]) and persist the updated rows atomically. Nothing is ever
//! recomputed lazily on read, except a goal's actual amount when the goal
//! itself is created or redefined.

pub use budgets::Budget;
pub use categories::{BALANCE_CORRECTION_NAME, Category, CategoryKind};
pub use commands::{
    NewGoalCmd, NewTransactionCmd, NewWalletCmd, TransferCmd, UpdateGoalCmd, UpdateTransactionCmd,
    UpdateTransferCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use goals::Goal;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use status::EntityStatus;
pub use transactions::{Transaction, TransactionKind};
pub use transfers::Transfer;
pub use wallets::{Wallet, WalletKind};

mod budgets;
mod categories;
mod commands;
mod currency;
mod error;
mod goal_categories;
mod goals;
mod money;
mod ops;
pub mod rules;
mod status;
mod transactions;
mod transfers;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
