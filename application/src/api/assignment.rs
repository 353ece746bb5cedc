//! [`ResourceAssignment`]-related definitions.

use common::{Date, DateTime};
use derive_more::{From, Into};
use juniper::graphql_object;
use service::read;

use crate::{api, Context};

/// Pairing of a `Boat` with a `Guide` and a `Restaurant` for a single day.
#[derive(Clone, Debug, From, Into)]
pub struct ResourceAssignment(read::assignment::Resolved);

/// Pairing of a `Boat` with a `Guide` and a `Restaurant` for a single day.
///
/// Takes precedence over the `Guide` and the `Restaurant` set on the
/// `Booking`s carried by the `Boat`.
#[graphql_object(context = Context)]
impl ResourceAssignment {
    /// `Date` this `ResourceAssignment` is made for.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0.assignment.activity_date.coerce()
    }

    /// Assigned `Boat`.
    #[must_use]
    pub fn boat(&self) -> api::Boat {
        self.0.boat.clone().into()
    }

    /// `Guide` the `Boat` is paired with, if any.
    #[must_use]
    pub fn guide(&self) -> Option<api::Guide> {
        self.0.guide.clone().map(Into::into)
    }

    /// `Restaurant` the `Boat` is paired with, if any.
    #[must_use]
    pub fn restaurant(&self) -> Option<api::Restaurant> {
        self.0.restaurant.clone().map(Into::into)
    }

    /// Number of times this `ResourceAssignment` was set.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.0.assignment.version.into()
    }

    /// `DateTime` when this `ResourceAssignment` was set the last time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.assignment.updated_at.coerce()
    }
}

/// Work of a `Guide` on a single `Boat` during a day.
#[derive(Clone, Debug, From, Into)]
pub struct GuideDuty(read::assignment::Duty);

/// Work of a `Guide` on a single `Boat` during a day.
#[graphql_object(context = Context)]
impl GuideDuty {
    /// `Boat` the `Guide` is assigned to.
    #[must_use]
    pub fn boat(&self) -> api::Boat {
        self.0.boat.clone().into()
    }

    /// `Restaurant` the `Boat` is paired with, if any.
    #[must_use]
    pub fn restaurant(&self) -> Option<api::Restaurant> {
        self.0.restaurant.clone().map(Into::into)
    }
}
