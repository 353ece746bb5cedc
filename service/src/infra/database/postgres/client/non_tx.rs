//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection},
};
#[cfg(doc)]
use crate::infra::database::postgres::Connection;

/// Non-transactional Postgres database client.
///
/// Serves the reads of queries. Cloning shares the same [`Connection`].
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire [`Connection`]s from.
    pub(crate) pool: connection::Pool,

    /// Acquired [`Connection`], if any.
    connection: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client on top of the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the [`Connection`] of this [`NonTx`] client, acquiring it from
    /// the [`connection::Pool`] if there is none yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        {
            let guard = self.connection.read().await;
            if let Ok(conn) =
                RwLockReadGuard::try_map(guard, Option::as_ref)
            {
                return Ok(conn);
            }
        }

        let mut slot = self.connection.write().await;
        if slot.is_none() {
            let conn = self
                .pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            *slot = Some(conn);
        }
        RwLockReadGuard::try_map(slot.downgrade(), Option::as_ref)
            .map_err(|_| {
                tracerr::new!(database::Error::from(postgres::Error::Released))
            })
    }
}

super::delegate_connection!(NonTx);
