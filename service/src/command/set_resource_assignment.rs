//! [`Command`] for setting a boat [`Assignment`] of a day.

use common::{
    operations::{By, Select, Upsert},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        assignment::Version,
        booking::ActivityDate,
        company,
        resource::{self, Boat, Guide, Restaurant},
        Assignment, Resource,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Company;

use super::Command;

/// [`Command`] for setting a boat [`Assignment`] of a day.
///
/// Replaces the guide and restaurant previously assigned to the same boat on
/// the same day.
#[derive(Clone, Copy, Debug)]
pub struct SetResourceAssignment {
    /// ID of the [`Company`] operating the boat.
    pub company_id: company::Id,

    /// Date of the [`Assignment`].
    pub date: ActivityDate,

    /// ID of the assigned [`Boat`].
    pub boat_id: Option<resource::Id<Boat>>,

    /// ID of the [`Guide`] assigned to the [`Boat`].
    pub guide_id: Option<resource::Id<Guide>>,

    /// ID of the [`Restaurant`] assigned to the [`Boat`].
    pub restaurant_id: Option<resource::Id<Restaurant>>,
}

impl<Db> Command<SetResourceAssignment> for Service<Db>
where
    Db: Database<
            Select<By<Option<Resource<Boat>>, resource::Id<Boat>>>,
            Ok = Option<Resource<Boat>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Resource<Guide>>, resource::Id<Guide>>>,
            Ok = Option<Resource<Guide>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Resource<Restaurant>>, resource::Id<Restaurant>>>,
            Ok = Option<Resource<Restaurant>>,
            Err = Traced<database::Error>,
        > + Database<
            Upsert<Assignment>,
            Ok = Assignment,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Assignment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetResourceAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetResourceAssignment {
            company_id,
            date,
            boat_id,
            guide_id,
            restaurant_id,
        } = cmd;

        let boat_id = boat_id.ok_or_else(|| tracerr::new!(E::NoBoat))?;
        if !belongs(self.database(), company_id, boat_id).await? {
            return Err(tracerr::new!(E::UnknownBoat(boat_id)));
        }
        if let Some(id) = guide_id {
            if !belongs(self.database(), company_id, id).await? {
                return Err(tracerr::new!(E::UnknownGuide(id)));
            }
        }
        if let Some(id) = restaurant_id {
            if !belongs(self.database(), company_id, id).await? {
                return Err(tracerr::new!(E::UnknownRestaurant(id)));
            }
        }

        self.database()
            .execute(Upsert(Assignment {
                company_id,
                activity_date: date,
                boat_id,
                guide_id,
                restaurant_id,
                version: Version::INITIAL,
                updated_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Checks whether the [`Resource`] with the provided ID exists and belongs to
/// the provided [`Company`].
async fn belongs<Db, K>(
    db: &Db,
    company_id: company::Id,
    id: resource::Id<K>,
) -> Result<bool, Traced<ExecutionError>>
where
    Db: Database<
        Select<By<Option<Resource<K>>, resource::Id<K>>>,
        Ok = Option<Resource<K>>,
        Err = Traced<database::Error>,
    >,
{
    Ok(db
        .execute(Select(By::new(id)))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?
        .is_some_and(|r| r.company_id == company_id))
}

/// Error of [`SetResourceAssignment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No [`Boat`] is provided.
    #[display("`Boat` is required")]
    NoBoat,

    /// [`Boat`] does not exist in the [`Company`].
    #[display("`Boat(id: {_0})` does not exist")]
    UnknownBoat(#[error(not(source))] resource::Id<Boat>),

    /// [`Guide`] does not exist in the [`Company`].
    #[display("`Guide(id: {_0})` does not exist")]
    UnknownGuide(#[error(not(source))] resource::Id<Guide>),

    /// [`Restaurant`] does not exist in the [`Company`].
    #[display("`Restaurant(id: {_0})` does not exist")]
    UnknownRestaurant(#[error(not(source))] resource::Id<Restaurant>),
}
