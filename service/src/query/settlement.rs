//! [`Query`] collection related to the settlement of [`Booking`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Company, Invoice};
use crate::{
    domain::{booking, company, invoice},
    infra::{database, Database},
    read::settlement::Billed,
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries IDs of all the [`Booking`]s billed by active [`Invoice`]s of a
/// [`Company`].
pub type BilledBookings = DatabaseQuery<By<Billed, company::Id>>;

/// Queries the items of an [`Invoice`].
pub type InvoiceItems = DatabaseQuery<By<Vec<invoice::Item>, invoice::Id>>;

/// [`Query`] checking whether a [`Booking`] is not billed by any active
/// [`Invoice`] of a [`Company`].
#[derive(Clone, Copy, Debug)]
pub struct IsBookingUnbilled {
    /// ID of the [`Company`] the [`Booking`] belongs to.
    pub company_id: company::Id,

    /// ID of the [`Booking`] to check.
    pub booking_id: booking::Id,
}

impl<Db> Query<IsBookingUnbilled> for Service<Db>
where
    Db: Database<
        Select<By<Billed, company::Id>>,
        Ok = Billed,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        IsBookingUnbilled {
            company_id,
            booking_id,
        }: IsBookingUnbilled,
    ) -> Result<Self::Ok, Self::Err> {
        let billed = self
            .execute(BilledBookings::by(company_id))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(billed.is_unbilled(booking_id))
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{
        command::{AttachBookingsToInvoice, VoidInvoice},
        domain::program::PricingType,
        infra::database::{memory::State, Memory},
        Command as _, Query as _, Service,
    };

    use super::{BilledBookings, IsBookingUnbilled};

    #[tokio::test]
    async fn unbills_bookings_of_voided_invoices() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let date = Date::parse("2024-11-02").unwrap().coerce();
        let booking = state.booking(program, "Smith", date, |b| {
            b.agent_id = Some(agent);
        });
        let invoice = state.invoice(company, agent, "INV-1");
        let svc = Service::test(Memory::new(state));

        let unbilled = IsBookingUnbilled {
            company_id: company,
            booking_id: booking,
        };
        assert!(svc.execute(unbilled).await.unwrap());

        _ = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![booking],
            })
            .await
            .unwrap();
        assert!(!svc.execute(unbilled).await.unwrap());
        let billed =
            svc.execute(BilledBookings::by(company)).await.unwrap();
        assert_eq!(billed.iter().collect::<Vec<_>>(), [booking]);

        _ = svc
            .execute(VoidInvoice {
                company_id: company,
                invoice_id: invoice,
            })
            .await
            .unwrap();
        assert!(svc.execute(unbilled).await.unwrap());
        assert!(svc
            .execute(BilledBookings::by(company))
            .await
            .unwrap()
            .is_empty());
    }
}
