//! [`DailyManifest`]-related definitions.

use std::sync::Arc;

use common::{Date, Money};
use derive_more::{From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject};
use service::read::manifest::{self, export::Column, EffectiveAssignment};

use crate::{api, Context, Error};

/// Operations report of a single day.
#[derive(Clone, Debug, From, Into)]
pub struct DailyManifest(Arc<service::read::Manifest>);

impl From<service::read::Manifest> for DailyManifest {
    fn from(manifest: service::read::Manifest) -> Self {
        Self(Arc::new(manifest))
    }
}

/// Operations report of a single day.
///
/// Lists the operational bookings of the day with their effective `Guide`
/// and `Restaurant`, prices and billed state.
#[graphql_object(context = Context)]
impl DailyManifest {
    /// `Date` this `DailyManifest` is compiled for.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0.date.coerce()
    }

    /// Rows of this `DailyManifest` ordered by pickup time and customer name.
    ///
    /// Rows without a pickup time go last.
    #[must_use]
    pub fn rows(&self) -> Vec<ManifestRow> {
        self.0.rows().iter().cloned().map(Into::into).collect()
    }

    /// Rows grouped by their `Boat`, ordered by its name.
    ///
    /// Rows without a `Boat` go last in a group without a name.
    #[must_use]
    pub fn by_boat(&self) -> Vec<ManifestGroup> {
        self.0
            .by_boat()
            .into_iter()
            .map(|g| {
                ManifestGroup::new(g.key.map(|b| b.name.to_string()), &g)
            })
            .collect()
    }

    /// Rows grouped by their pickup time.
    ///
    /// Rows without a pickup time go last in a group without a name.
    #[must_use]
    pub fn by_pickup(&self) -> Vec<ManifestGroup> {
        self.0
            .by_pickup()
            .into_iter()
            .map(|g| ManifestGroup::new(g.key.map(|t| t.to_string()), &g))
            .collect()
    }

    /// Billable rows grouped by their `Agent`, ordered by its name.
    ///
    /// Direct bookings go last in a group without a name.
    #[must_use]
    pub fn by_agent(&self) -> Vec<ManifestGroup> {
        self.0
            .by_agent()
            .into_iter()
            .map(|g| {
                ManifestGroup::new(g.key.map(|a| a.name.to_string()), &g)
            })
            .collect()
    }

    /// Billable rows grouped by their `Program`, ordered by its name.
    #[must_use]
    pub fn by_program(&self) -> Vec<ManifestGroup> {
        self.0
            .by_program()
            .into_iter()
            .map(|g| ManifestGroup::new(Some(g.key.name.to_string()), &g))
            .collect()
    }

    /// Sums of all the rows of this `DailyManifest`.
    #[must_use]
    pub fn totals(&self) -> ManifestTotals {
        self.0.totals().into()
    }

    /// This `DailyManifest` exported as CSV with all the columns.
    #[must_use]
    pub fn csv(&self) -> String {
        self.0.to_csv(Column::ALL)
    }

    /// This `DailyManifest` split into text sections, one per `Boat`, with
    /// every cell truncated to the provided `width`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - the provided `width` is not positive.
    pub fn sections(
        &self,
        width: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<ManifestSection>, Error> {
        let width = match width {
            Some(w) => usize::try_from(w)
                .ok()
                .filter(|&w| w > 0)
                .ok_or_else(|| api::InputError::InvalidWidth.into())
                .map_err(ctx.error())?,
            None => ctx.service().config().column_width,
        };

        Ok(self
            .0
            .sections(Column::SECTION, width)
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

/// Single booking line of a `DailyManifest`.
#[derive(Clone, Debug, From, Into)]
pub struct ManifestRow(manifest::Row);

/// Single booking line of a `DailyManifest`.
#[graphql_object(context = Context)]
impl ManifestRow {
    /// `Booking` of this `ManifestRow`.
    #[must_use]
    pub fn booking(&self) -> api::Booking {
        self.0.booking.clone().into()
    }

    /// `Guide` effectively serving the `Booking`, if any.
    #[must_use]
    pub fn guide(&self) -> Option<api::Guide> {
        self.0.assignment.guide().cloned().map(Into::into)
    }

    /// `Restaurant` effectively serving the `Booking`, if any.
    #[must_use]
    pub fn restaurant(&self) -> Option<api::Restaurant> {
        self.0.assignment.restaurant().cloned().map(Into::into)
    }

    /// Way the effective `Guide` and `Restaurant` were resolved.
    #[must_use]
    pub fn assignment(&self) -> AssignmentSource {
        (&self.0.assignment).into()
    }

    /// Resolved price of the `Booking`.
    ///
    /// `null` if the `Program` lacks the pricing data.
    #[must_use]
    pub fn price(&self) -> Option<api::PriceBreakdown> {
        self.0.price.ok().map(Into::into)
    }

    /// Indicator whether the `Booking` is billed by an active `Invoice`.
    #[must_use]
    pub fn billed(&self) -> bool {
        self.0.billed
    }
}

/// Way the effective `Guide` and `Restaurant` of a `ManifestRow` were
/// resolved.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum AssignmentSource {
    /// `ResourceAssignment` of the `Boat` carrying the `Booking`.
    Locked,

    /// `Guide` and `Restaurant` set on the `Booking` directly.
    DirectOverride,

    /// Neither a `ResourceAssignment` nor direct values exist.
    Unassigned,
}

impl From<&EffectiveAssignment> for AssignmentSource {
    fn from(value: &EffectiveAssignment) -> Self {
        use EffectiveAssignment as A;

        match value {
            A::Locked { .. } => Self::Locked,
            A::DirectOverride { .. } => Self::DirectOverride,
            A::Unassigned => Self::Unassigned,
        }
    }
}

/// `ManifestRow`s sharing the same key.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct ManifestGroup {
    /// Name of the key shared by the `rows`, if any.
    pub name: Option<String>,

    /// `ManifestRow`s of this `ManifestGroup` in the `DailyManifest` order.
    pub rows: Vec<ManifestRow>,

    /// Sums of the `rows`.
    pub totals: ManifestTotals,
}

impl ManifestGroup {
    /// Creates a new [`ManifestGroup`] out of the provided
    /// [`manifest::Group`].
    fn new<K>(name: Option<String>, group: &manifest::Group<'_, K>) -> Self {
        Self {
            name,
            rows: group.rows.iter().map(|&r| r.clone().into()).collect(),
            totals: group.totals().into(),
        }
    }
}

/// Sums of `ManifestRow`s.
#[derive(Clone, Debug, From, Into)]
pub struct ManifestTotals(manifest::Totals);

/// Sums of `ManifestRow`s.
///
/// Money amounts are summed up per currency.
#[graphql_object(context = Context)]
impl ManifestTotals {
    /// Number of `Booking`s.
    pub fn bookings(&self) -> Result<i32, Error> {
        api::count(self.0.bookings)
    }

    /// Number of adults.
    #[must_use]
    pub fn adults(&self) -> i32 {
        self.0.passengers.adults.into()
    }

    /// Number of children.
    #[must_use]
    pub fn children(&self) -> i32 {
        self.0.passengers.children.into()
    }

    /// Number of infants.
    #[must_use]
    pub fn infants(&self) -> i32 {
        self.0.passengers.infants.into()
    }

    /// Cash to be collected on pickup.
    #[must_use]
    pub fn collect_money(&self) -> Vec<Money> {
        self.0.collect_money.iter().collect()
    }

    /// Resolved prices of the billable `Booking`s.
    #[must_use]
    pub fn revenue(&self) -> Vec<Money> {
        self.0.revenue.iter().collect()
    }

    /// Number of billable `Booking`s without a resolvable price.
    pub fn unpriced(&self) -> Result<i32, Error> {
        api::count(self.0.unpriced)
    }

    /// Number of billable `Booking`s billed by an active `Invoice`.
    pub fn billed(&self) -> Result<i32, Error> {
        api::count(self.0.billed)
    }

    /// Number of billable `Booking`s not billed yet.
    pub fn unbilled(&self) -> Result<i32, Error> {
        api::count(self.0.unbilled)
    }
}

/// Text section of a `DailyManifest` listing the rows of a single `Boat`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct ManifestSection {
    /// Heading naming the `Boat` with its `Guide` and `Restaurant`.
    pub heading: String,

    /// Truncated column headers.
    pub header: Vec<String>,

    /// Truncated cells, one list per row.
    pub lines: Vec<Vec<String>>,

    /// Whole section as a plain text table.
    pub text: String,
}

impl From<manifest::export::Section> for ManifestSection {
    fn from(section: manifest::export::Section) -> Self {
        Self {
            heading: section.heading(),
            text: section.to_string(),
            header: section.header,
            lines: section.lines,
        }
    }
}
