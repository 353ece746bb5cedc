//! [`PricingOverride`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{agent::PricingOverride, company},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::pricing::{ForAgentProgram, Overrides},
};

impl<C> Database<Select<By<Overrides, company::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Overrides;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Overrides, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let company_id: company::Id = by.into_inner();

        const SQL: &str = "\
            SELECT o.agent_id, o.program_id, \
                   o.agent_price, o.adult_agent_price, o.child_agent_price \
            FROM agent_pricing_overrides AS o \
            INNER JOIN agents AS a \
                    ON a.id = o.agent_id \
            WHERE a.company_id = $1::UUID";
        Ok(self
            .query(SQL, &[&company_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(pricing_override)
            .collect())
    }
}

impl<C> Database<Select<By<Option<PricingOverride>, ForAgentProgram>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<PricingOverride>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PricingOverride>, ForAgentProgram>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForAgentProgram {
            agent_id,
            program_id,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT agent_id, program_id, \
                   agent_price, adult_agent_price, child_agent_price \
            FROM agent_pricing_overrides \
            WHERE agent_id = $1::UUID \
              AND program_id = $2::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&agent_id, &program_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(pricing_override))
    }
}

/// Extracts a [`PricingOverride`] out of the provided [`Row`].
fn pricing_override(row: &Row) -> PricingOverride {
    PricingOverride {
        agent_id: row.get("agent_id"),
        program_id: row.get("program_id"),
        agent_price: row.get("agent_price"),
        adult_agent_price: row.get("adult_agent_price"),
        child_agent_price: row.get("child_agent_price"),
    }
}
