//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection},
};
#[cfg(doc)]
use crate::infra::database::postgres::Connection;

use super::NonTx;

/// Transactional Postgres database client.
///
/// Serves the writes of commands. All its clones share the same
/// transaction, started on its own pooled [`Connection`] on the first
/// statement and finished by [`Tx::commit()`]. Dropping all the clones
/// without committing rolls the transaction back, releasing its row locks.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to acquire a [`Connection`] from.
    pool: connection::Pool,

    /// Started transaction, if any.
    tx: Arc<RwLock<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client sharing the [`connection::Pool`] of the
    /// provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the transaction of this [`Tx`] client, starting it if there is
    /// none yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        {
            let guard = self.tx.read().await;
            if let Ok(tx) = RwLockReadGuard::try_map(guard, Option::as_ref) {
                return Ok(tx);
            }
        }

        let mut slot = self.tx.write().await;
        if slot.is_none() {
            let conn = self
                .pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            *slot = Some(
                connection::Tx::from_non_tx(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        RwLockReadGuard::try_map(slot.downgrade(), Option::as_ref)
            .map_err(|_| {
                tracerr::new!(database::Error::from(postgres::Error::Released))
            })
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// Does nothing if no statement has been run yet. The next statement
    /// starts a new transaction.
    ///
    /// # Errors
    ///
    /// If the database fails to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

super::delegate_connection!(Tx);
