//! [`BookingPrice`] [`Query`] definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Company};
use crate::{
    domain::{
        agent::PricingOverride,
        booking, company,
        pricing::{self, Breakdown, MissingPricingData},
    },
    infra::{database, Database},
    read::{self, pricing::ForAgentProgram},
    Service,
};

use super::Query;

/// [`Query`] resolving the price of a single [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct BookingPrice {
    /// ID of the [`Company`] the [`Booking`] belongs to.
    pub company_id: company::Id,

    /// ID of the [`Booking`] to resolve the price of.
    pub booking_id: booking::Id,
}

impl<Db> Query<BookingPrice> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::booking::Resolved>, booking::Id>>,
            Ok = Option<read::booking::Resolved>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PricingOverride>, ForAgentProgram>>,
            Ok = Option<PricingOverride>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Breakdown;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        BookingPrice {
            company_id,
            booking_id,
        }: BookingPrice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let resolved = self
            .database()
            .execute(Select(By::<Option<read::booking::Resolved>, _>::new(
                booking_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|r| r.booking.company_id == company_id)
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let agent_override = match resolved.booking.agent_id {
            Some(agent_id) => self
                .database()
                .execute(Select(By::<Option<PricingOverride>, _>::new(
                    ForAgentProgram {
                        agent_id,
                        program_id: resolved.booking.program_id,
                    },
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            None => None,
        };

        pricing::resolve(
            &resolved.booking,
            &resolved.program,
            agent_override.as_ref(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`BookingPrice`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist in the [`Company`].
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// Price of the [`Booking`] cannot be resolved.
    #[display("Cannot resolve `Booking` price: {_0}")]
    MissingPricingData(MissingPricingData),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
