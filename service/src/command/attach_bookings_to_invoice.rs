//! [`Command`] for attaching [`Booking`]s to an [`Invoice`].

use std::collections::BTreeSet;

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent::PricingOverride,
        booking, company,
        invoice::{self, Item},
        pricing::{self, MissingPricingData},
        Booking, Invoice,
    },
    infra::{database, Database},
    read::{self, pricing::ForAgentProgram, settlement::BilledBy},
    Service,
};
#[cfg(doc)]
use crate::domain::{Agent, Company};

use super::Command;

/// [`Command`] for attaching [`Booking`]s to an [`Invoice`].
///
/// A [`Booking`] is billed at most once: attaching it fails while it is
/// attached to another active [`Invoice`]. [`Booking`]s attached to the same
/// [`Invoice`] already are skipped.
#[derive(Clone, Debug)]
pub struct AttachBookingsToInvoice {
    /// ID of the [`Company`] owning the [`Invoice`].
    pub company_id: company::Id,

    /// ID of the [`Invoice`] to attach the [`Booking`]s to.
    pub invoice_id: invoice::Id,

    /// IDs of the [`Booking`]s to attach.
    pub booking_ids: Vec<booking::Id>,
}

impl<Db> Command<AttachBookingsToInvoice> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Invoice, invoice::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<read::booking::Resolved>, booking::Id>>,
            Ok = Option<read::booking::Resolved>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PricingOverride>, ForAgentProgram>>,
            Ok = Option<PricingOverride>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<BilledBy, Vec<booking::Id>>>,
            Ok = BilledBy,
            Err = Traced<database::Error>,
        > + Database<Insert<Item>, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Item>, invoice::Id>>,
            Ok = Vec<Item>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vec<Item>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AttachBookingsToInvoice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AttachBookingsToInvoice {
            company_id,
            invoice_id,
            booking_ids,
        } = cmd;

        // Deduplicated and sorted to lock in a deterministic order.
        let booking_ids = booking_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        if booking_ids.is_empty() {
            return Err(tracerr::new!(E::NoBookings));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent voiding of the `Invoice`.
        tx.execute(Lock(By::<Invoice, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let invoice = tx
            .execute(Select(By::<Option<Invoice>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|i| i.company_id == company_id)
            .ok_or(E::InvoiceNotExists(invoice_id))
            .map_err(tracerr::wrap!())?;
        if !invoice.is_active() {
            return Err(tracerr::new!(E::InvoiceVoided(invoice_id)));
        }

        // Avoid concurrent billing or editing of the same `Booking`s. Every
        // check below reads the locked rows.
        for &id in &booking_ids {
            tx.execute(Lock(By::<Booking, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        let mut prices = Vec::with_capacity(booking_ids.len());
        for &id in &booking_ids {
            let resolved = tx
                .execute(Select(
                    By::<Option<read::booking::Resolved>, _>::new(id),
                ))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|r| r.booking.company_id == company_id)
                .ok_or(E::BookingNotExists(id))
                .map_err(tracerr::wrap!())?;
            let booking = &resolved.booking;
            if !booking.is_billable() {
                return Err(tracerr::new!(E::BookingNotBillable(id)));
            }
            if booking.agent_id != Some(invoice.agent_id) {
                return Err(tracerr::new!(E::BookingOfAnotherAgent(id)));
            }

            let agent_override = tx
                .execute(Select(By::<Option<PricingOverride>, _>::new(
                    ForAgentProgram {
                        agent_id: invoice.agent_id,
                        program_id: booking.program_id,
                    },
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            let price = pricing::resolve(
                booking,
                &resolved.program,
                agent_override.as_ref(),
            )
            .map_err(tracerr::from_and_wrap!(=> E))?;
            prices.push((id, price.total));
        }

        let billed = tx
            .execute(Select(By::<BilledBy, _>::new(booking_ids)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created_at = DateTime::now().coerce();
        for (booking_id, amount) in prices {
            match billed.get(booking_id) {
                Some(id) if id == invoice_id => continue,
                Some(id) => {
                    return Err(tracerr::new!(E::AlreadyBilled {
                        booking_id,
                        invoice_id: id,
                    }));
                }
                None => {}
            }

            tx.execute(Insert(Item {
                invoice_id,
                booking_id,
                amount,
                created_at,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        }

        let items = tx
            .execute(Select(By::<Vec<Item>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(items)
    }
}

/// Error of [`AttachBookingsToInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is attached to another active [`Invoice`] already.
    #[display(
        "`Booking(id: {booking_id})` is billed by `Invoice(id: {invoice_id})`"
    )]
    AlreadyBilled {
        /// ID of the billed [`Booking`].
        #[error(not(source))]
        booking_id: booking::Id,

        /// ID of the [`Invoice`] billing the [`Booking`].
        #[error(not(source))]
        invoice_id: invoice::Id,
    },

    /// [`Booking`] is not billable.
    #[display("`Booking(id: {_0})` is not billable")]
    BookingNotBillable(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist in the [`Company`].
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] is not placed by the [`Agent`] of the [`Invoice`].
    #[display("`Booking(id: {_0})` belongs to another `Agent`")]
    BookingOfAnotherAgent(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Invoice`] with the provided ID does not exist in the [`Company`].
    #[display("`Invoice(id: {_0})` does not exist")]
    InvoiceNotExists(#[error(not(source))] invoice::Id),

    /// [`Invoice`] is voided.
    #[display("`Invoice(id: {_0})` is voided")]
    InvoiceVoided(#[error(not(source))] invoice::Id),

    /// Price of a [`Booking`] cannot be resolved.
    #[display("Cannot resolve price: {_0}")]
    #[from]
    MissingPricingData(MissingPricingData),

    /// No [`Booking`]s are provided.
    #[display("No `Booking`s to attach")]
    NoBookings,
}

#[cfg(test)]
mod spec {
    use common::{
        money::Currency,
        operations::{Transact, Transacted},
        Date, DateTime, Money,
    };
    use rust_decimal_macros::dec;
    use tracerr::Traced;

    use crate::{
        domain::{
            booking::{self, Status},
            invoice::Item,
            program::PricingType,
        },
        infra::{
            database::{self, memory::State, Memory},
            Database,
        },
        Command as _, Service,
    };

    use super::{AttachBookingsToInvoice, ExecutionError};

    fn date() -> booking::ActivityDate {
        Date::parse("2024-11-02").unwrap().coerce()
    }

    /// [`Memory`] committing a concurrent change right before every
    /// transaction starts.
    struct Interleaved<F>(Memory, F);

    impl<F: Fn(&mut State)> Database<Transact> for Interleaved<F> {
        type Ok = Transacted<Memory>;
        type Err = Traced<database::Error>;

        async fn execute(&self, op: Transact) -> Result<Self::Ok, Self::Err> {
            self.0.update(&self.1).await;
            self.0.execute(op).await
        }
    }

    #[tokio::test]
    async fn rechecks_bookings_changed_concurrently() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let other_agent = state.agent(company, "Krabi Holidays");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let invoice = state.invoice(company, agent, "INV-0001");
        let memory = Memory::new(state);
        let attach = AttachBookingsToInvoice {
            company_id: company,
            invoice_id: invoice,
            booking_ids: vec![x],
        };

        let cancel = |s: &mut State| {
            s.bookings[0].status = Status::Cancelled;
        };
        let svc = Service::test(Interleaved(memory.clone(), cancel));
        let err = svc.execute(attach.clone()).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotBillable(_)));

        let reassign = |s: &mut State| {
            s.bookings[0].status = Status::Confirmed;
            s.bookings[0].agent_id = Some(other_agent);
        };
        let svc = Service::test(Interleaved(memory.clone(), reassign));
        let err = svc.execute(attach.clone()).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingOfAnotherAgent(_),
        ));

        let delete = |s: &mut State| {
            s.bookings[0].agent_id = Some(agent);
            s.bookings[0].deleted_at = Some(DateTime::now().coerce());
        };
        let svc = Service::test(Interleaved(memory.clone(), delete));
        let err = svc.execute(attach).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotExists(_)));

        assert!(memory.state().await.items.is_empty());
    }

    #[tokio::test]
    async fn attaches_priced_bookings_once() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::PerHead);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
            b.passengers.children = 1;
        });
        let invoice = state.invoice(company, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));

        let items = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![x, x],
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].booking_id, x);
        assert_eq!(items[0].amount.amount, dec!(1250));

        let again = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![x],
            })
            .await
            .unwrap();
        assert_eq!(again.len(), 1);
    }

    #[tokio::test]
    async fn fails_when_billed_by_another_invoice() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let y = state.booking(program, "Jane Doe", date(), |b| {
            b.agent_id = Some(agent);
        });
        let a = state.invoice(company, agent, "INV-A");
        let b = state.invoice(company, agent, "INV-B");
        let svc = Service::test(Memory::new(state));

        _ = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: a,
                booking_ids: vec![x],
            })
            .await
            .unwrap();
        let err = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: b,
                booking_ids: vec![y, x],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyBilled { booking_id, invoice_id }
                if *booking_id == x && *invoice_id == a,
        ));
        let items = svc.database().state().await.items;
        assert_eq!(items.len(), 1, "whole batch is rejected");
        assert_eq!((items[0].invoice_id, items[0].booking_id), (a, x));
    }

    #[tokio::test]
    async fn concurrent_attaches_bill_once() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let a = state.invoice(company, agent, "INV-A");
        let b = state.invoice(company, agent, "INV-B");
        let svc = Service::test(Memory::new(state));

        let (to_a, to_b) = tokio::join!(
            svc.execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: a,
                booking_ids: vec![x],
            }),
            svc.execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: b,
                booking_ids: vec![x],
            }),
        );

        assert!(to_a.is_ok() != to_b.is_ok(), "exactly one succeeds");
        for res in [to_a, to_b] {
            if let Err(e) = res {
                assert!(matches!(
                    e.as_ref(),
                    ExecutionError::AlreadyBilled { .. },
                ));
            }
        }
        assert_eq!(svc.database().state().await.items.len(), 1);
    }

    #[tokio::test]
    async fn rebills_bookings_of_voided_invoice() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let a = state.invoice(company, agent, "INV-A");
        let b = state.invoice(company, agent, "INV-B");
        state.items.push(Item {
            invoice_id: a,
            booking_id: x,
            amount: Money {
                amount: dec!(3000),
                currency: Currency::Thb,
            },
            created_at: DateTime::now().coerce(),
        });
        state.invoices[0].voided_at = Some(DateTime::now().coerce());
        let svc = Service::test(Memory::new(state));

        let items = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: b,
                booking_ids: vec![x],
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn rejects_unbillable_bookings() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let other_agent = state.agent(company, "Krabi Holidays");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let pending = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
            b.status = Status::Pending;
        });
        let foreign = state.booking(program, "Jane Doe", date(), |b| {
            b.agent_id = Some(other_agent);
        });
        let deleted = state.booking(program, "Mary Major", date(), |b| {
            b.agent_id = Some(agent);
            b.deleted_at = Some(DateTime::now().coerce());
        });
        let invoice = state.invoice(company, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));
        let attach = |id| AttachBookingsToInvoice {
            company_id: company,
            invoice_id: invoice,
            booking_ids: vec![id],
        };

        let err = svc.execute(attach(pending)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotBillable(_)));

        let err = svc.execute(attach(foreign)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingOfAnotherAgent(_),
        ));

        let err = svc.execute(attach(deleted)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotExists(_)));

        assert!(svc.database().state().await.items.is_empty());
    }

    #[tokio::test]
    async fn aborts_batch_without_pricing_data() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let priced = state.program(company, "Phi Phi", PricingType::Flat);
        let unpriced = state.program(company, "Bond", PricingType::PerHead);
        state.programs[1].adult_selling_price = None;
        state.programs[1].child_selling_price = None;
        let x = state.booking(priced, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let y = state.booking(unpriced, "Jane Doe", date(), |b| {
            b.agent_id = Some(agent);
        });
        let invoice = state.invoice(company, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));

        let err = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![x, y],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MissingPricingData(e) if e.program_id == unpriced,
        ));
        assert!(svc.database().state().await.items.is_empty());
    }

    #[tokio::test]
    async fn rejects_voided_invoice() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let x = state.booking(program, "John Smith", date(), |b| {
            b.agent_id = Some(agent);
        });
        let invoice = state.invoice(company, agent, "INV-0001");
        state.invoices[0].voided_at = Some(DateTime::now().coerce());
        let svc = Service::test(Memory::new(state));

        let err = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![x],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvoiceVoided(_)));
    }
}
