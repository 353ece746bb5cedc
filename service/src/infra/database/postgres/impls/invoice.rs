//! [`Invoice`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        agent, booking, company,
        invoice::{self, Item},
        Invoice,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::settlement::{Billed, BilledBy},
};

impl<C> Database<Select<By<Option<Invoice>, invoice::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Invoice>, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: invoice::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, company_id, agent_id, number, created_at, voided_at \
            FROM invoices \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(invoice))
    }
}

impl<C> Database<Select<By<Option<Invoice>, (company::Id, invoice::Number)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Invoice>, (company::Id, invoice::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (company_id, number) = by.into_inner();

        const SQL: &str = "\
            SELECT id, company_id, agent_id, number, created_at, voided_at \
            FROM invoices \
            WHERE company_id = $1::UUID \
              AND number = $2::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&company_id, &number])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(invoice))
    }
}

impl<C> Database<Insert<Invoice>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        let Invoice {
            id,
            company_id,
            agent_id,
            number,
            created_at,
            voided_at,
        } = invoice;

        const SQL: &str = "\
            INSERT INTO invoices (\
                id, company_id, agent_id, number, created_at, voided_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &company_id,
                &agent_id,
                &number,
                &created_at,
                &voided_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Invoice>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(invoice): Update<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        let Invoice { id, voided_at, .. } = invoice;

        // Only voiding is allowed for an existing `Invoice`.
        const SQL: &str = "\
            UPDATE invoices \
            SET voided_at = $2::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &voided_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Invoice, invoice::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Invoice, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: invoice::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM invoices \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Invoice, (company::Id, invoice::Number)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Invoice, (company::Id, invoice::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (company_id, number) = by.into_inner();

        // Conflicting row stays locked until the end of the transaction.
        const SQL: &str = "\
            INSERT INTO invoice_numbers_lock (company_id, number) \
            VALUES ($1::UUID, $2::VARCHAR) \
            ON CONFLICT (company_id, number) DO UPDATE \
            SET number = EXCLUDED.number";
        self.exec(SQL, &[&company_id, &number])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Item>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        let Item {
            invoice_id,
            booking_id,
            amount: Money { amount, currency },
            created_at,
        } = item;

        const SQL: &str = "\
            INSERT INTO invoice_items (\
                invoice_id, booking_id, amount, currency, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::NUMERIC, $4::INT2, $5::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&invoice_id, &booking_id, &amount, &currency, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Item>, invoice::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Item>, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let invoice_id: invoice::Id = by.into_inner();

        const SQL: &str = "\
            SELECT invoice_id, booking_id, amount, currency, created_at \
            FROM invoice_items \
            WHERE invoice_id = $1::UUID \
            ORDER BY created_at, booking_id";
        Ok(self
            .query(SQL, &[&invoice_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Item {
                invoice_id: row.get("invoice_id"),
                booking_id: row.get("booking_id"),
                amount: Money {
                    amount: row.get("amount"),
                    currency: row.get("currency"),
                },
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Billed, company::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Billed;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Billed, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let company_id: company::Id = by.into_inner();

        const SQL: &str = "\
            SELECT DISTINCT i.booking_id \
            FROM invoice_items AS i \
            INNER JOIN invoices AS v \
                    ON v.id = i.invoice_id \
            WHERE v.company_id = $1::UUID \
              AND v.voided_at IS NULL";
        Ok(self
            .query(SQL, &[&company_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get::<_, booking::Id>("booking_id"))
            .collect())
    }
}

impl<C> Database<Select<By<BilledBy, Vec<booking::Id>>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = BilledBy;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<BilledBy, Vec<booking::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        if ids.is_empty() {
            return Ok(BilledBy::default());
        }

        const SQL: &str = "\
            SELECT i.booking_id, i.invoice_id \
            FROM invoice_items AS i \
            INNER JOIN invoices AS v \
                    ON v.id = i.invoice_id \
            WHERE i.booking_id = ANY($1::UUID[]) \
              AND v.voided_at IS NULL";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                (
                    row.get::<_, booking::Id>("booking_id"),
                    row.get::<_, invoice::Id>("invoice_id"),
                )
            })
            .collect())
    }
}

/// Extracts an [`Invoice`] out of the provided [`Row`].
fn invoice(row: &Row) -> Invoice {
    Invoice {
        id: row.get("id"),
        company_id: row.get("company_id"),
        agent_id: row.get::<_, agent::Id>("agent_id"),
        number: row.get("number"),
        created_at: row.get("created_at"),
        voided_at: row.get("voided_at"),
    }
}
