//! [`AgentStatement`] [`Query`] definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use futures::future;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Company};
use crate::{
    domain::{agent, company, Agent},
    infra::{database, Database},
    read::{
        self,
        booking::list::{Period, Selector},
        finance::Statement,
        pricing::Overrides,
        settlement::Billed,
    },
    Service,
};

use super::Query;

/// [`Query`] compiling the [`Statement`] of an [`Agent`] within a [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct AgentStatement {
    /// ID of the [`Company`] the [`Agent`] works with.
    pub company_id: company::Id,

    /// ID of the [`Agent`] to compile the [`Statement`] of.
    pub agent_id: agent::Id,

    /// [`Period`] of the [`Booking`]s activity dates.
    pub period: Period,
}

impl<Db> Query<AgentStatement> for Service<Db>
where
    Db: Database<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<read::booking::Resolved>, Selector>>,
            Ok = Vec<read::booking::Resolved>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Overrides, company::Id>>,
            Ok = Overrides,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Billed, company::Id>>,
            Ok = Billed,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Statement;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        AgentStatement {
            company_id,
            agent_id,
            period,
        }: AgentStatement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        _ = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(agent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|a| a.company_id == company_id)
            .ok_or(E::AgentNotExists(agent_id))
            .map_err(tracerr::wrap!())?;

        let db = self.database();
        let (bookings, overrides, billed) = future::try_join3(
            db.execute(Select(By::<Vec<read::booking::Resolved>, _>::new(
                Selector::billable(company_id, period).of_agent(agent_id),
            ))),
            db.execute(Select(By::<Overrides, _>::new(company_id))),
            db.execute(Select(By::<Billed, _>::new(company_id))),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Statement::compile(agent_id, period, bookings, &overrides, &billed))
    }
}

/// Error of [`AgentStatement`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist in the [`Company`].
    #[display("`Agent(id: {_0})` does not exist")]
    #[from(ignore)]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date};
    use rust_decimal_macros::dec;

    use crate::{
        command::AttachBookingsToInvoice,
        domain::{agent, booking::ActivityDate, program::PricingType},
        infra::database::{memory::State, Memory},
        read::booking::list::Period,
        Command as _, Query as _, Service,
    };

    use super::{AgentStatement, ExecutionError};

    fn date(s: &str) -> ActivityDate {
        Date::parse(s).unwrap().coerce()
    }

    #[tokio::test]
    async fn splits_billed_and_unbilled() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Bond", PricingType::PerHead);
        let placed = |b: &mut crate::domain::Booking| b.agent_id = Some(agent);
        let first = state.booking(program, "A", date("2024-11-01"), placed);
        let second = state.booking(program, "B", date("2024-11-05"), placed);
        _ = state.booking(program, "C", date("2024-12-01"), placed);
        let invoice = state.invoice(company, agent, "INV-1");
        let svc = Service::test(Memory::new(state));
        _ = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![first],
            })
            .await
            .unwrap();

        let statement = svc
            .execute(AgentStatement {
                company_id: company,
                agent_id: agent,
                period: Period::new(date("2024-11-01"), date("2024-11-30"))
                    .unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.lines[0].booking.booking.id, first);
        assert!(statement.lines[0].billed);
        assert_eq!(statement.lines[1].booking.booking.id, second);
        assert!(!statement.lines[1].billed);

        let totals = statement.totals();
        assert_eq!(
            totals.billed.get(Currency::Thb).map(|m| m.amount),
            Some(dec!(1000)),
        );
        assert_eq!(
            totals.unbilled.get(Currency::Thb).map(|m| m.amount),
            Some(dec!(1000)),
        );
    }

    #[tokio::test]
    async fn rejects_unknown_agent() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let other = state.company("Krabi Tours");
        let foreign = state.agent(other, "Krabi Travel");
        let svc = Service::test(Memory::new(state));

        for agent_id in [foreign, agent::Id::new()] {
            let err = svc
                .execute(AgentStatement {
                    company_id: company,
                    agent_id,
                    period: Period::day(date("2024-11-01")),
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_ref(),
                ExecutionError::AgentNotExists(id) if *id == agent_id,
            ));
        }
    }
}
