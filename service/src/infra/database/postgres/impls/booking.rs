//! [`Booking`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Lock, Select},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        booking::{self, Passengers},
        Agent, Booking, Program,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::booking::{list::Selector, Resolved},
};

use super::assignment::resource;

/// Columns and joins resolving a [`Booking`] along with its references.
const SELECT_RESOLVED: &str = "\
    SELECT b.id, b.company_id, b.program_id, \
           b.agent_id, b.agent_staff_id, \
           b.hotel_id, b.driver_id, b.boat_id, b.guide_id, b.restaurant_id, \
           b.customer_name, b.room_number, b.remarks, \
           b.adults, b.children, b.infants, \
           b.activity_date, b.pickup_time, \
           b.collect_money_amount, b.collect_money_currency, \
           b.status, b.payment_type, b.created_at, b.deleted_at, \
           p.name AS program_name, p.pricing_type, p.currency, \
           p.base_price, p.adult_selling_price, p.child_selling_price, \
           a.name AS agent_name, \
           s.name AS agent_staff_name, \
           h.name AS hotel_name, \
           d.name AS driver_name, \
           bo.name AS boat_name, \
           g.name AS guide_name, \
           r.name AS restaurant_name \
    FROM bookings AS b \
    INNER JOIN programs AS p \
            ON p.id = b.program_id \
    LEFT JOIN agents AS a \
           ON a.id = b.agent_id AND a.company_id = b.company_id \
    LEFT JOIN agent_staff AS s \
           ON s.id = b.agent_staff_id AND s.agent_id = b.agent_id \
    LEFT JOIN hotels AS h \
           ON h.id = b.hotel_id AND h.company_id = b.company_id \
    LEFT JOIN drivers AS d \
           ON d.id = b.driver_id AND d.company_id = b.company_id \
    LEFT JOIN boats AS bo \
           ON bo.id = b.boat_id AND bo.company_id = b.company_id \
    LEFT JOIN guides AS g \
           ON g.id = b.guide_id AND g.company_id = b.company_id \
    LEFT JOIN restaurants AS r \
           ON r.id = b.restaurant_id AND r.company_id = b.company_id";

impl<C> Database<Select<By<Option<Resolved>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Resolved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Resolved>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        let sql = format!(
            "{SELECT_RESOLVED} \
             WHERE b.id = $1::UUID \
               AND b.deleted_at IS NULL \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| resolved(&row)))
    }
}

impl<C> Database<Select<By<Vec<Resolved>, Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Resolved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Resolved>, Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Selector {
            company_id,
            period,
            statuses,
            boat_ids,
            agent_id,
        } = by.into_inner();
        if statuses.is_empty() {
            return Ok(vec![]);
        }

        let (from, to) = (period.from(), period.to());
        let mut ps: Vec<&(dyn ToSql + Sync)> =
            vec![&company_id, &from, &to, &statuses];

        let boats_idx = boat_ids.as_ref().map(|ids| {
            ps.push(ids);
            ps.len()
        });
        let agent_idx = agent_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let sql = format!(
            "{SELECT_RESOLVED} \
             WHERE b.company_id = $1::UUID \
               AND b.activity_date BETWEEN $2::DATE AND $3::DATE \
               AND b.status = ANY($4::INT2[]) \
               AND b.deleted_at IS NULL \
               {boats_filtering} \
               {agent_filtering} \
             ORDER BY b.activity_date, b.id",
            boats_filtering = boats_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND b.boat_id = ANY(${idx}::UUID[])"))
            }),
            agent_filtering = agent_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND b.agent_id = ${idx}::UUID"))
            }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(resolved)
            .collect())
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Extracts a [`Resolved`] [`Booking`] out of the provided [`Row`] selected
/// with the [`SELECT_RESOLVED`] statement.
fn resolved(row: &Row) -> Resolved {
    let company_id = row.get("company_id");
    let count = |column: &str| {
        u16::try_from(row.get::<_, i16>(column))
            .unwrap_or_else(|_| panic!("`{column}` is negative"))
    };
    let collect_money = row
        .get::<_, Option<_>>("collect_money_amount")
        .zip(row.get::<_, Option<Currency>>("collect_money_currency"))
        .map(|(amount, currency)| Money { amount, currency });

    let booking = Booking {
        id: row.get("id"),
        company_id,
        program_id: row.get("program_id"),
        agent_id: row.get("agent_id"),
        agent_staff_id: row.get("agent_staff_id"),
        hotel_id: row.get("hotel_id"),
        driver_id: row.get("driver_id"),
        boat_id: row.get("boat_id"),
        guide_id: row.get("guide_id"),
        restaurant_id: row.get("restaurant_id"),
        customer_name: row.get("customer_name"),
        room_number: row.get("room_number"),
        remarks: row.get("remarks"),
        passengers: Passengers {
            adults: count("adults"),
            children: count("children"),
            infants: count("infants"),
        },
        activity_date: row.get("activity_date"),
        pickup_time: row.get("pickup_time"),
        collect_money,
        status: row.get("status"),
        payment_type: row.get("payment_type"),
        created_at: row.get("created_at"),
        deleted_at: row.get("deleted_at"),
    };

    let program = Program {
        id: booking.program_id,
        company_id,
        name: row.get("program_name"),
        pricing_type: row.get("pricing_type"),
        currency: row.get("currency"),
        base_price: row.get("base_price"),
        adult_selling_price: row.get("adult_selling_price"),
        child_selling_price: row.get("child_selling_price"),
    };
    let agent = booking
        .agent_id
        .zip(row.get::<_, Option<agent::Name>>("agent_name"))
        .map(|(id, name)| Agent {
            id,
            company_id,
            name,
        });
    let agent_staff = booking
        .agent_staff_id
        .zip(booking.agent_id)
        .zip(row.get::<_, Option<agent::Name>>("agent_staff_name"))
        .map(|((id, agent_id), name)| agent::Staff { id, agent_id, name });

    Resolved {
        program,
        agent,
        agent_staff,
        hotel: resource(row, company_id, "hotel"),
        driver: resource(row, company_id, "driver"),
        boat: resource(row, company_id, "boat"),
        guide: resource(row, company_id, "guide"),
        restaurant: resource(row, company_id, "restaurant"),
        booking,
    }
}
