//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, IsolationLevel, Row};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters of a SQL statement.
pub type Params<'a> = &'a [&'a (dyn ToSql + Sync)];

/// Transactional Postgres database [`Connection`].
///
/// Runs on [`IsolationLevel::ReadCommitted`], so a `SELECT ... FOR UPDATE`
/// waits for the concurrent holder of the row lock and then reads the row as
/// it was committed by that holder.
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] [`Connection`] the transaction was started on.
    non_tx: NonTx,

    /// Transaction started on the [`Connection`], until committed.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("committed", &self.with_tx(|tx| tx.is_none()))
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Starts a new [`Tx`] on the provided [`NonTx`] [`Connection`].
    ///
    /// # Errors
    ///
    /// If the database refuses to start a transaction.
    pub async fn from_non_tx(
        client: NonTx,
    ) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(client, |c| {
            c.build_transaction()
                .isolation_level(IsolationLevel::ReadCommitted)
                .start()
                .map_ok(Some)
                .boxed()
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
    }

    /// Commits this [`Tx`].
    ///
    /// Committing an already committed [`Tx`] does nothing.
    ///
    /// # Errors
    ///
    /// If the database fails to commit the transaction.
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let Some(tx) = self.with_tx_mut(|tx| tx.take()) else {
            return Ok(());
        };
        tx.commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the underlying [`Transaction`] of this [`Tx`], unless it has
    /// been committed.
    ///
    /// [`Transaction`]: deadpool_postgres::Transaction
    fn tx(&self) -> Option<&deadpool_postgres::Transaction<'_>> {
        self.with_tx(|tx| tx.as_ref())
    }

    /// Returns the error of using this [`Tx`] after it has been committed.
    fn released() -> Traced<database::Error> {
        tracerr::new!(database::Error::from(postgres::Error::Released))
    }
}

/// Generic database connection.
pub trait Connection {
    /// Queries the provided SQL statement with the given parameters and
    /// returns the resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>;

    /// Queries the provided SQL statement with the given parameters and
    /// returns the resulting row, if any.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returns more than one row.
    fn query_opt(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>;

    /// Executes the provided SQL statement with the given parameters and
    /// returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>;
}

impl Connection for NonTx {
    async fn query(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        raw::query(self, stmt, params).await
    }

    async fn query_opt(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        raw::query_opt(self, stmt, params).await
    }

    async fn exec(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        raw::exec(self, stmt, params).await
    }
}

impl Connection for Tx {
    async fn query(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        match self.tx() {
            Some(tx) => raw::query(tx, stmt, params).await,
            None => Err(Self::released()),
        }
    }

    async fn query_opt(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        match self.tx() {
            Some(tx) => raw::query_opt(tx, stmt, params).await,
            None => Err(Self::released()),
        }
    }

    async fn exec(
        &self,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        match self.tx() {
            Some(tx) => raw::exec(tx, stmt, params).await,
            None => Err(Self::released()),
        }
    }
}

/// Statements over any [`GenericClient`], traced at the `TRACE` level.
mod raw {
    use deadpool_postgres::GenericClient;
    use tokio_postgres::Row;
    use tracerr::Traced;

    use crate::infra::database::{self, postgres};

    use super::Params;

    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(db.statement = stmt),
    )]
    pub(super) async fn query<C: GenericClient>(
        client: &C,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        client
            .query(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(db.statement = stmt),
    )]
    pub(super) async fn query_opt<C: GenericClient>(
        client: &C,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        client
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(
            db.rows_affected = tracing::field::Empty,
            db.statement = stmt,
        ),
    )]
    pub(super) async fn exec<C: GenericClient>(
        client: &C,
        stmt: &str,
        params: Params<'_>,
    ) -> Result<u64, Traced<database::Error>> {
        let rows = client
            .execute(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        _ = tracing::Span::current().record("db.rows_affected", rows);
        Ok(rows)
    }
}
