//! Live queries over a user's collections.
//!
//! Every committed write publishes exactly one [`Change`] on the engine's
//! [`ChangeHub`], naming all the collections it touched. A [`Subscription`]
//! listens on the hub and, for each change that concerns its user and query,
//! re-runs the query and yields a fresh [`Snapshot`].
//! Snapshots are always complete lists: no deltas are ever delivered.

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::{
    Budget, BudgetTransaction, Engine, GoalTransaction, ResultEngine, SavingsGoal,
    aggregate::Records,
};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Goals,
    Transactions,
    Budgets,
    BudgetTransactions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub user_id: String,
    pub collections: &'static [Collection],
}

/// Fan-out of committed changes to every live subscription.
#[derive(Clone, Debug)]
pub struct ChangeHub {
    sender: broadcast::Sender<Change>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, user_id: &str, collections: &'static [Collection]) {
        tracing::debug!(user_id, ?collections, "publishing change");
        // No receivers is fine: nobody is watching.
        let _ = self.sender.send(Change {
            user_id: user_id.to_string(),
            collections,
        });
    }

    pub fn receiver(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// What a subscription watches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    Goals,
    Transactions { goal_id: Option<Uuid> },
    Budgets,
    BudgetTransactions { budget_id: Option<Uuid> },
    /// All four collections in one snapshot.
    All,
}

impl Query {
    pub fn watches(&self, collection: Collection) -> bool {
        match self {
            Self::Goals => collection == Collection::Goals,
            Self::Transactions { .. } => collection == Collection::Transactions,
            Self::Budgets => collection == Collection::Budgets,
            Self::BudgetTransactions { .. } => collection == Collection::BudgetTransactions,
            Self::All => true,
        }
    }

    /// Whether `change` should wake a subscription running this query.
    pub fn is_woken_by(&self, change: &Change) -> bool {
        change.collections.iter().any(|c| self.watches(*c))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "collection", content = "records")]
pub enum Snapshot {
    Goals(Vec<SavingsGoal>),
    Transactions(Vec<GoalTransaction>),
    Budgets(Vec<Budget>),
    BudgetTransactions(Vec<BudgetTransaction>),
    All(Records),
}

impl Engine {
    /// Opens a live query for `user_id`.
    ///
    /// The first call to [`Subscription::next`] yields the current state.
    pub fn subscribe(&self, user_id: &str, query: Query) -> Subscription {
        tracing::debug!(user_id, ?query, "subscription opened");
        Subscription {
            engine: self.clone(),
            user_id: user_id.to_string(),
            query,
            receiver: self.hub.receiver(),
            primed: false,
        }
    }

    /// Runs `query` once for `user_id`.
    pub async fn snapshot(&self, user_id: &str, query: &Query) -> ResultEngine<Snapshot> {
        Ok(match query {
            Query::Goals => Snapshot::Goals(self.goals(user_id).await?),
            Query::Transactions { goal_id } => {
                Snapshot::Transactions(self.transactions(user_id, *goal_id).await?)
            }
            Query::Budgets => Snapshot::Budgets(self.budgets(user_id).await?),
            Query::BudgetTransactions { budget_id } => {
                Snapshot::BudgetTransactions(self.budget_transactions(user_id, *budget_id).await?)
            }
            Query::All => Snapshot::All(self.records(user_id).await?),
        })
    }

    /// All four collections of `user_id`.
    pub async fn records(&self, user_id: &str) -> ResultEngine<Records> {
        Ok(Records {
            goals: self.goals(user_id).await?,
            transactions: self.transactions(user_id, None).await?,
            budgets: self.budgets(user_id).await?,
            budget_transactions: self.budget_transactions(user_id, None).await?,
        })
    }
}

pub struct Subscription {
    engine: Engine,
    user_id: String,
    query: Query,
    receiver: broadcast::Receiver<Change>,
    primed: bool,
}

impl Subscription {
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Waits for the next snapshot.
    ///
    /// A subscription keeps its engine alive, so in practice it only ends
    /// when dropped.
    pub async fn next(&mut self) -> Option<ResultEngine<Snapshot>> {
        if !self.primed {
            self.primed = true;
            return Some(self.engine.snapshot(&self.user_id, &self.query).await);
        }

        loop {
            match self.receiver.recv().await {
                Ok(change)
                    if change.user_id == self.user_id && self.query.is_woken_by(&change) =>
                {
                    break;
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    // Missed changes are covered by re-querying.
                    tracing::warn!(user_id = %self.user_id, skipped, "subscription lagged");
                    break;
                }
                Err(RecvError::Closed) => return None,
            }
        }

        Some(self.engine.snapshot(&self.user_id, &self.query).await)
    }

    /// Stops listening. Dropping the subscription has the same effect.
    pub fn unsubscribe(self) {
        tracing::debug!(user_id = %self.user_id, query = ?self.query, "subscription closed");
    }

    pub fn into_stream(self) -> impl Stream<Item = ResultEngine<Snapshot>> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            let item = sub.next().await?;
            Some((item, sub))
        })
    }
}
