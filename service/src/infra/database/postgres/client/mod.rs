//! Postgres database client definitions.
//!
//! Clients acquire their [`Connection`] from the [`connection::Pool`] lazily,
//! on the first statement, and keep it for all the following ones.
//!
//! [`connection::Pool`]: super::connection::Pool

pub mod non_tx;
pub mod tx;

#[cfg(doc)]
use super::Connection;

pub use self::{non_tx::NonTx, tx::Tx};

/// Implements [`Connection`] for a client by running every statement on the
/// [`Connection`] returned by its `connection()` method.
macro_rules! delegate_connection {
    ($client:ty) => {
        impl $crate::infra::database::postgres::Connection for $client {
            async fn query(
                &self,
                stmt: &str,
                params: $crate::infra::database::postgres::connection::Params<
                    '_,
                >,
            ) -> Result<
                Vec<tokio_postgres::Row>,
                tracerr::Traced<$crate::infra::database::Error>,
            > {
                use $crate::infra::database::postgres::Connection as _;

                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt(
                &self,
                stmt: &str,
                params: $crate::infra::database::postgres::connection::Params<
                    '_,
                >,
            ) -> Result<
                Option<tokio_postgres::Row>,
                tracerr::Traced<$crate::infra::database::Error>,
            > {
                use $crate::infra::database::postgres::Connection as _;

                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec(
                &self,
                stmt: &str,
                params: $crate::infra::database::postgres::connection::Params<
                    '_,
                >,
            ) -> Result<u64, tracerr::Traced<$crate::infra::database::Error>>
            {
                use $crate::infra::database::postgres::Connection as _;

                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}
use delegate_connection;
