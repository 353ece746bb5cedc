//! [`Command`] for voiding an [`Invoice`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{company, invoice, Invoice},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::{Booking, Company};

use super::Command;

/// [`Command`] for voiding an [`Invoice`].
///
/// [`Booking`]s of a voided [`Invoice`] become unbilled again. Voiding an
/// already voided [`Invoice`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct VoidInvoice {
    /// ID of the [`Company`] owning the [`Invoice`].
    pub company_id: company::Id,

    /// ID of the [`Invoice`] to be voided.
    pub invoice_id: invoice::Id,
}

impl<Db> Command<VoidInvoice> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Invoice, invoice::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<Update<Invoice>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VoidInvoice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VoidInvoice {
            company_id,
            invoice_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent attaching to the `Invoice`.
        tx.execute(Lock(By::<Invoice, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut invoice = tx
            .execute(Select(By::<Option<Invoice>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|i| i.company_id == company_id)
            .ok_or(E::InvoiceNotExists(invoice_id))
            .map_err(tracerr::wrap!())?;
        if !invoice.is_active() {
            return Ok(invoice);
        }

        invoice.voided_at = Some(DateTime::now().coerce());
        tx.execute(Update(invoice.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(invoice)
    }
}

/// Error of [`VoidInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Invoice`] with the provided ID does not exist in the [`Company`].
    #[display("`Invoice(id: {_0})` does not exist")]
    InvoiceNotExists(#[error(not(source))] invoice::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        infra::database::{memory::State, Memory},
        Command as _, Service,
    };

    use super::{ExecutionError, VoidInvoice};

    #[tokio::test]
    async fn voids_once() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let invoice = state.invoice(company, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));
        let cmd = VoidInvoice {
            company_id: company,
            invoice_id: invoice,
        };

        let voided = svc.execute(cmd).await.unwrap();
        assert!(!voided.is_active());

        let again = svc.execute(cmd).await.unwrap();
        assert_eq!(again.voided_at, voided.voided_at);
        assert!(!svc.database().state().await.invoices[0].is_active());
    }

    #[tokio::test]
    async fn hides_invoices_of_another_company() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let other = state.company("Krabi Divers");
        let agent = state.agent(other, "Ao Nang Travel");
        let invoice = state.invoice(other, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));

        let err = svc
            .execute(VoidInvoice {
                company_id: company,
                invoice_id: invoice,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvoiceNotExists(_)));
        assert!(svc.database().state().await.invoices[0].is_active());
    }
}
