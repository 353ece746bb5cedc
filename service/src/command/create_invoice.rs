//! [`Command`] for creating a new [`Invoice`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, company, invoice, Agent, Invoice},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Company;

use super::Command;

/// [`Command`] for creating a new empty [`Invoice`] of an [`Agent`].
#[derive(Clone, Debug)]
pub struct CreateInvoice {
    /// ID of the [`Company`] issuing the [`Invoice`].
    pub company_id: company::Id,

    /// ID of the billed [`Agent`].
    pub agent_id: agent::Id,

    /// [`invoice::Number`] of the new [`Invoice`], unique within the
    /// [`Company`].
    pub number: invoice::Number,
}

impl<Db> Command<CreateInvoice> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Invoice, (company::Id, invoice::Number)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, (company::Id, invoice::Number)>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<Insert<Invoice>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateInvoice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateInvoice {
            company_id,
            agent_id,
            number,
        } = cmd;

        let agent = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(agent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|a| a.company_id == company_id)
            .ok_or(E::AgentNotExists(agent_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent creation of the same `invoice::Number`.
        tx.execute(Lock(By::<Invoice, _>::new((company_id, number.clone()))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Invoice>, _>::new((
                company_id,
                number.clone(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::NumberUsed(number)));
        }

        let invoice = Invoice {
            id: invoice::Id::new(),
            company_id,
            agent_id: agent.id,
            number,
            created_at: DateTime::now().coerce(),
            voided_at: None,
        };
        tx.execute(Insert(invoice.clone()))
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

/// Error of [`CreateInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist in the [`Company`].
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`invoice::Number`] is used by another [`Invoice`] of the
    /// [`Company`].
    #[display("`Invoice(number: {_0})` exists already")]
    NumberUsed(#[error(not(source))] invoice::Number),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::invoice,
        infra::database::{memory::State, Memory},
        Command as _, Service,
    };

    use super::{CreateInvoice, ExecutionError};

    #[tokio::test]
    async fn creates_empty_invoice() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let svc = Service::test(Memory::new(state));

        let invoice = svc
            .execute(CreateInvoice {
                company_id: company,
                agent_id: agent,
                number: invoice::Number::new("INV-0001").unwrap(),
            })
            .await
            .unwrap();

        assert!(invoice.is_active());
        assert_eq!(invoice.agent_id, agent);
        let state = svc.database().state().await;
        assert_eq!(state.invoices.len(), 1);
        assert!(state.items.is_empty());
    }

    #[tokio::test]
    async fn rejects_used_number() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        _ = state.invoice(company, agent, "INV-0001");
        let svc = Service::test(Memory::new(state));

        let err = svc
            .execute(CreateInvoice {
                company_id: company,
                agent_id: agent,
                number: invoice::Number::new("INV-0001").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NumberUsed(_)));
        assert_eq!(svc.database().state().await.invoices.len(), 1);
    }

    #[tokio::test]
    async fn allows_same_number_in_another_company() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let other = state.company("Krabi Divers");
        let agent = state.agent(company, "Phuket Travel");
        let other_agent = state.agent(other, "Ao Nang Travel");
        _ = state.invoice(other, other_agent, "INV-0001");
        let svc = Service::test(Memory::new(state));

        let created = svc
            .execute(CreateInvoice {
                company_id: company,
                agent_id: agent,
                number: invoice::Number::new("INV-0001").unwrap(),
            })
            .await;

        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn rejects_agent_of_another_company() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let other = state.company("Krabi Divers");
        let agent = state.agent(other, "Ao Nang Travel");
        let svc = Service::test(Memory::new(state));

        let err = svc
            .execute(CreateInvoice {
                company_id: company,
                agent_id: agent,
                number: invoice::Number::new("INV-0001").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AgentNotExists(id) if *id == agent,
        ));
    }
}
