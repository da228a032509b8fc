pub use budget_transactions::{BudgetTransaction, BudgetTransactionDraft, BudgetTransactionKind};
pub use budgets::{Budget, BudgetDraft, BudgetPatch, month_start};
pub use error::EngineError;
pub use goals::{GoalDraft, GoalPatch, SavingsGoal};
pub use live::{Change, ChangeHub, Collection, Query, Snapshot, Subscription};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use transactions::{GoalTransaction, GoalTransactionDraft, GoalTransactionKind};
pub use users::User;

pub mod aggregate;
pub mod categories;
pub mod live;

mod budget_transactions;
mod budgets;
mod error;
mod goals;
mod money;
mod ops;
mod sessions;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
