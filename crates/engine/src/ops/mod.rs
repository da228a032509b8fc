use sea_orm::DatabaseConnection;

use crate::{ResultEngine, live::{ChangeHub, Collection}};

mod budget_transactions;
mod budgets;
mod goals;
mod transactions;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// `?` inside the block returns from the enclosing function; the transaction
/// is dropped, and thus rolled back, on the way out.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The record store: per-user collections on top of a sea-orm connection.
///
/// Cloning is cheap; clones share the connection pool and the change hub.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
    pub(crate) hub: ChangeHub,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Notifies live subscriptions. Call only after the write committed.
    fn publish(&self, user_id: &str, collections: &'static [Collection]) {
        self.hub.publish(user_id, collections);
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    hub: Option<ChangeHub>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Share an existing change hub instead of creating a fresh one.
    pub fn hub(mut self, hub: ChangeHub) -> EngineBuilder {
        self.hub = Some(hub);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            hub: self.hub.unwrap_or_default(),
        })
    }
}
