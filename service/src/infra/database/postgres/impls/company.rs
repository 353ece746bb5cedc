//! [`Company`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{company::ManifestDispatch, Company},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::company::WithOperationsEmail,
};

impl<C> Database<Select<By<Vec<Company>, WithOperationsEmail>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Company>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Company>, WithOperationsEmail>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, operations_email \
            FROM companies \
            WHERE operations_email IS NOT NULL \
            ORDER BY id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Company {
                id: row.get("id"),
                name: row.get("name"),
                operations_email: row.get("operations_email"),
            })
            .collect())
    }
}

impl<C> Database<Insert<ManifestDispatch>> for Postgres<C>
where
    C: Connection,
{
    /// Indicates whether the [`ManifestDispatch`] was inserted, or it exists
    /// already.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(dispatch): Insert<ManifestDispatch>,
    ) -> Result<Self::Ok, Self::Err> {
        let ManifestDispatch {
            company_id,
            activity_date,
            dispatched_at,
        } = dispatch;

        const SQL: &str = "\
            INSERT INTO manifest_dispatches (\
                company_id, activity_date, dispatched_at\
            ) VALUES (\
                $1::UUID, $2::DATE, $3::TIMESTAMPTZ\
            )";
        match self
            .exec(SQL, &[&company_id, &activity_date, &dispatched_at])
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match e.as_ref() {
                database::Error::Postgres(pg)
                    if pg.is_unique_violation(Some(
                        "manifest_dispatches_pkey",
                    )) =>
                {
                    Ok(false)
                }
                database::Error::Postgres(_) => Err(tracerr::new!(e)),
            },
        }
    }
}
