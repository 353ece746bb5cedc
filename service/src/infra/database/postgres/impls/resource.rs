//! [`Resource`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{resource, Resource},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, K> Database<Select<By<Option<Resource<K>>, resource::Id<K>>>>
    for Postgres<C>
where
    C: Connection,
    K: resource::Kind + Sync,
{
    type Ok = Option<Resource<K>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Resource<K>>, resource::Id<K>>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: resource::Id<K> = by.into_inner();

        let sql = format!(
            "SELECT id, company_id, name \
             FROM {table} \
             WHERE id = $1::UUID \
             LIMIT 1",
            table = K::TABLE,
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Resource {
                id: row.get("id"),
                company_id: row.get("company_id"),
                name: row.get("name"),
            }))
    }
}
