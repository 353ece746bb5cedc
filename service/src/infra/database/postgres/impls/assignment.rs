//! [`Assignment`]-related [`Database`] implementations.

use common::operations::{By, Select, Upsert};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        company,
        resource::{self, Restaurant},
        Assignment, Resource,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::assignment::{Day, Duty, ForDate, ForGuide, Resolved},
};

impl<C> Database<Upsert<Assignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Assignment;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Upsert(assignment): Upsert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Assignment {
            company_id,
            activity_date,
            boat_id,
            guide_id,
            restaurant_id,
            version,
            updated_at,
        } = &assignment;

        const SQL: &str = "\
            INSERT INTO resource_assignments (\
                company_id, activity_date, boat_id, \
                guide_id, restaurant_id, \
                version, updated_at \
            ) VALUES (\
                $1::UUID, $2::DATE, $3::UUID, \
                $4::UUID, $5::UUID, \
                $6::INT4, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (company_id, activity_date, boat_id) DO UPDATE \
            SET guide_id = EXCLUDED.guide_id, \
                restaurant_id = EXCLUDED.restaurant_id, \
                version = resource_assignments.version + 1, \
                updated_at = EXCLUDED.updated_at \
            RETURNING version";
        let row = self
            .query_opt(
                SQL,
                &[
                    company_id,
                    activity_date,
                    boat_id,
                    guide_id,
                    restaurant_id,
                    version,
                    updated_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Assignment {
            version: row.map_or(*version, |r| r.get("version")),
            ..assignment
        })
    }
}

impl<C> Database<Select<By<Day, ForDate>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Day;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Day, ForDate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForDate { company_id, date } = by.into_inner();

        const SQL: &str = "\
            SELECT a.boat_id, a.guide_id, a.restaurant_id, \
                   a.version, a.updated_at, \
                   bo.name AS boat_name, \
                   g.name AS guide_name, \
                   r.name AS restaurant_name \
            FROM resource_assignments AS a \
            INNER JOIN boats AS bo \
                    ON bo.id = a.boat_id \
            LEFT JOIN guides AS g \
                   ON g.id = a.guide_id \
            LEFT JOIN restaurants AS r \
                  ON r.id = a.restaurant_id \
            WHERE a.company_id = $1::UUID \
              AND a.activity_date = $2::DATE";
        Ok(self
            .query(SQL, &[&company_id, &date])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Resolved {
                assignment: Assignment {
                    company_id,
                    activity_date: date,
                    boat_id: row.get("boat_id"),
                    guide_id: row.get("guide_id"),
                    restaurant_id: row.get("restaurant_id"),
                    version: row.get("version"),
                    updated_at: row.get("updated_at"),
                },
                boat: Resource {
                    id: row.get("boat_id"),
                    company_id,
                    name: row.get("boat_name"),
                },
                guide: resource(&row, company_id, "guide"),
                restaurant: resource(&row, company_id, "restaurant"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Duty>, ForGuide>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Duty>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Duty>, ForGuide>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForGuide {
            company_id,
            guide_id,
            date,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT a.boat_id, a.restaurant_id, \
                   bo.name AS boat_name, \
                   r.name AS restaurant_name \
            FROM resource_assignments AS a \
            INNER JOIN boats AS bo \
                    ON bo.id = a.boat_id \
            LEFT JOIN restaurants AS r \
                   ON r.id = a.restaurant_id \
            WHERE a.company_id = $1::UUID \
              AND a.guide_id = $2::UUID \
              AND a.activity_date = $3::DATE \
            ORDER BY bo.name, a.boat_id";
        Ok(self
            .query(SQL, &[&company_id, &guide_id, &date])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Duty {
                boat: Resource {
                    id: row.get("boat_id"),
                    company_id,
                    name: row.get("boat_name"),
                },
                restaurant: resource::<Restaurant>(
                    &row,
                    company_id,
                    "restaurant",
                ),
            })
            .collect())
    }
}

/// Extracts an optional [`Resource`] joined with the provided column
/// `prefix` out of the provided [`Row`].
pub(super) fn resource<K>(
    row: &Row,
    company_id: company::Id,
    prefix: &str,
) -> Option<Resource<K>> {
    let id: Option<resource::Id<K>> = row.get(&*format!("{prefix}_id"));
    let name: Option<resource::Name> = row.get(&*format!("{prefix}_name"));
    Some(Resource {
        id: id?,
        company_id,
        name: name?,
    })
}
