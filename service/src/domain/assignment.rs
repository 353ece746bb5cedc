//! [`Assignment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::{
    booking::ActivityDate,
    company,
    resource::{self, Boat, Guide, Restaurant},
};
#[cfg(doc)]
use crate::domain::{Booking, Company};

/// Exclusive pairing of a [`Boat`] with a [`Guide`] and a [`Restaurant`] for
/// one [`Company`] on one [`ActivityDate`].
///
/// At most one [`Assignment`] exists per [`Company`], [`ActivityDate`] and
/// [`Boat`]. It takes precedence over the [`Guide`] and the [`Restaurant`]
/// set directly on any [`Booking`] carried by the [`Boat`].
#[derive(Clone, Debug)]
pub struct Assignment {
    /// ID of the [`Company`] this [`Assignment`] belongs to.
    pub company_id: company::Id,

    /// [`ActivityDate`] this [`Assignment`] is made for.
    pub activity_date: ActivityDate,

    /// ID of the assigned [`Boat`].
    pub boat_id: resource::Id<Boat>,

    /// ID of the [`Guide`] the [`Boat`] is paired with, if any.
    pub guide_id: Option<resource::Id<Guide>>,

    /// ID of the [`Restaurant`] the [`Boat`] is paired with, if any.
    pub restaurant_id: Option<resource::Id<Restaurant>>,

    /// [`Version`] of this [`Assignment`].
    pub version: Version,

    /// [`DateTime`] when this [`Assignment`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

/// Counter of re-assignments of the same [`Assignment`].
///
/// Grows by one on every re-assignment and is informational only.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Version(i32);

impl Version {
    /// [`Version`] of a freshly created [`Assignment`].
    pub const INITIAL: Self = Self(1);

    /// Returns the [`Version`] following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// [`DateTime`] when an [`Assignment`] was modified.
pub type ModificationDateTime = DateTimeOf<(Assignment, unit::Modification)>;
