//! [`Revenue`] [`Query`] definition.

use common::operations::{By, Select};
use futures::future;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Company, Program};
use crate::{
    domain::company,
    infra::{database, Database},
    read::{
        self,
        booking::list::{Period, Selector},
        pricing::Overrides,
    },
    Service,
};

use super::Query;

/// [`Query`] summing up the revenue of a [`Company`] per [`Program`] within
/// a [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct Revenue {
    /// ID of the [`Company`] to sum up the revenue of.
    pub company_id: company::Id,

    /// [`Period`] of the [`Booking`]s activity dates.
    pub period: Period,
}

impl<Db> Query<Revenue> for Service<Db>
where
    Db: Database<
            Select<By<Vec<read::booking::Resolved>, Selector>>,
            Ok = Vec<read::booking::Resolved>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Overrides, company::Id>>,
            Ok = Overrides,
            Err = Traced<database::Error>,
        >,
{
    type Ok = read::finance::Revenue;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Revenue { company_id, period }: Revenue,
    ) -> Result<Self::Ok, Self::Err> {
        let db = self.database();
        let (bookings, overrides) = future::try_join(
            db.execute(Select(By::<Vec<read::booking::Resolved>, _>::new(
                Selector::billable(company_id, period),
            ))),
            db.execute(Select(By::<Overrides, _>::new(company_id))),
        )
        .await
        .map_err(tracerr::wrap!())?;

        Ok(read::finance::Revenue::compile(period, bookings, &overrides))
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date};
    use rust_decimal_macros::dec;

    use crate::{
        domain::{agent::PricingOverride, program::PricingType},
        infra::database::{memory::State, Memory},
        read::booking::list::Period,
        Query as _, Service,
    };

    use super::Revenue;

    #[tokio::test]
    async fn applies_agent_overrides() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let other = state.company("Krabi Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let foreign = state.program(other, "Hong", PricingType::Flat);
        let day = Date::parse("2024-11-02").unwrap().coerce();
        _ = state.booking(program, "Direct", day, |_| {});
        _ = state.booking(program, "Placed", day, |b| {
            b.agent_id = Some(agent);
        });
        _ = state.booking(foreign, "Foreign", day, |_| {});
        state.overrides.push(PricingOverride {
            agent_id: agent,
            program_id: program,
            agent_price: Some(dec!(2000)),
            adult_agent_price: None,
            child_agent_price: None,
        });
        let svc = Service::test(Memory::new(state));

        let revenue = svc
            .execute(Revenue {
                company_id: company,
                period: Period::day(day),
            })
            .await
            .unwrap();

        assert_eq!(revenue.programs.len(), 1);
        assert_eq!(revenue.programs[0].program.id, program);
        assert_eq!(revenue.programs[0].bookings, 2);
        assert_eq!(
            revenue.total().get(Currency::Thb).map(|m| m.amount),
            Some(dec!(5000)),
        );
    }
}
