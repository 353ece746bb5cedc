//! Daily [`Manifest`] definitions.

pub mod export;

use std::collections::BTreeMap;

use common::money;

use crate::{
    domain::{
        booking::{self, ActivityDate, Passengers, PickupTime, PickupWindow},
        company,
        pricing::{self, Breakdown, MissingPricingData},
        resource::{Boat, Guide, Restaurant},
        Agent, Program, Resource,
    },
    read::{self, assignment, pricing::Overrides, settlement::Billed},
};
#[cfg(doc)]
use crate::domain::{Assignment, Booking, Company};

/// Operations report of a [`Company`] for a single day.
#[derive(Clone, Debug)]
pub struct Manifest {
    /// ID of the [`Company`] this [`Manifest`] is compiled for.
    pub company_id: company::Id,

    /// [`ActivityDate`] this [`Manifest`] is compiled for.
    pub date: ActivityDate,

    /// [`Row`]s of this [`Manifest`] ordered by their pickup time, customer
    /// name and ID.
    rows: Vec<Row>,
}

impl Manifest {
    /// Compiles a new [`Manifest`] merging the provided [`Booking`]s with the
    /// [`Assignment`]s of the day, their prices and billed state.
    ///
    /// [`Booking`]s not taking part in the operations of the day are skipped.
    #[must_use]
    pub fn compile(
        company_id: company::Id,
        date: ActivityDate,
        bookings: Vec<read::booking::Resolved>,
        day: &assignment::Day,
        overrides: &Overrides,
        billed: &Billed,
    ) -> Self {
        let mut rows = bookings
            .into_iter()
            .filter(|r| {
                r.booking.company_id == company_id
                    && r.booking.activity_date == date
                    && r.booking.is_operational()
            })
            .map(|r| {
                let assignment = EffectiveAssignment::resolve(&r, day);
                let price = pricing::resolve(
                    &r.booking,
                    &r.program,
                    overrides.for_booking(&r.booking),
                );
                Row {
                    billed: billed.is_billed(r.booking.id),
                    booking: r,
                    assignment,
                    price,
                }
            })
            .collect::<Vec<_>>();
        rows.sort_by_cached_key(Row::order_key);

        Self {
            company_id,
            date,
            rows,
        }
    }

    /// Returns the ordered [`Row`]s of this [`Manifest`].
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Groups the [`Row`]s of this [`Manifest`] by their [`Boat`].
    ///
    /// [`Boat`]s are ordered by name, [`Row`]s without a [`Boat`] go last.
    #[must_use]
    pub fn by_boat(&self) -> Vec<Group<'_, Option<&Resource<Boat>>>> {
        group(self.rows.iter(), |row| {
            let boat = row.booking.boat.as_ref();
            (
                (boat.is_none(), boat.map(|b| &b.name), boat.map(|b| b.id)),
                boat,
            )
        })
    }

    /// Groups the [`Row`]s of this [`Manifest`] by their [`PickupTime`].
    ///
    /// [`Row`]s without a [`PickupTime`] go last.
    #[must_use]
    pub fn by_pickup(&self) -> Vec<Group<'_, Option<PickupTime>>> {
        group(self.rows.iter(), |row| {
            let time = row.booking.booking.pickup_time;
            ((time.is_none(), time), time)
        })
    }

    /// Groups the billable [`Row`]s of this [`Manifest`] by their [`Agent`].
    ///
    /// [`Agent`]s are ordered by name, direct [`Booking`]s go last.
    #[must_use]
    pub fn by_agent(&self) -> Vec<Group<'_, Option<&Agent>>> {
        group(self.rows.iter().filter(|r| r.is_billable()), |row| {
            let agent = row.booking.agent.as_ref();
            (
                (
                    agent.is_none(),
                    agent.map(|a| &a.name),
                    agent.map(|a| a.id),
                ),
                agent,
            )
        })
    }

    /// Groups the billable [`Row`]s of this [`Manifest`] by their
    /// [`Program`] ordered by name.
    #[must_use]
    pub fn by_program(&self) -> Vec<Group<'_, &Program>> {
        group(self.rows.iter().filter(|r| r.is_billable()), |row| {
            let program = &row.booking.program;
            ((&program.name, program.id), program)
        })
    }

    /// Sums up all the [`Row`]s of this [`Manifest`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::of(&self.rows)
    }
}

/// Single [`Booking`] line of a [`Manifest`].
#[derive(Clone, Debug)]
pub struct Row {
    /// Resolved [`Booking`] of this [`Row`].
    pub booking: read::booking::Resolved,

    /// [`EffectiveAssignment`] of the [`Booking`].
    pub assignment: EffectiveAssignment,

    /// Resolved price of the [`Booking`].
    pub price: Result<Breakdown, MissingPricingData>,

    /// Indicates whether the [`Booking`] is billed by an active invoice.
    pub billed: bool,
}

impl Row {
    /// Indicates whether the [`Booking`] of this [`Row`] takes part in the
    /// financial views.
    #[must_use]
    pub fn is_billable(&self) -> bool {
        self.booking.booking.is_billable()
    }

    /// Returns the [`PickupWindow`] of this [`Row`], if its [`PickupTime`]
    /// is known.
    #[must_use]
    pub fn pickup_window(&self) -> Option<PickupWindow> {
        self.booking
            .booking
            .pickup_time
            .map(|t| t.window(PickupTime::WINDOW_MINUTES))
    }

    /// Returns the key this [`Row`] is ordered by in a [`Manifest`].
    fn order_key(
        &self,
    ) -> (bool, Option<PickupTime>, String, String, booking::Id) {
        let b = &self.booking.booking;
        let name: &str = b.customer_name.as_ref();
        (
            b.pickup_time.is_none(),
            b.pickup_time,
            name.to_lowercase(),
            name.to_owned(),
            b.id,
        )
    }
}

/// [`Guide`] and [`Restaurant`] effectively serving a [`Booking`].
#[derive(Clone, Debug)]
pub enum EffectiveAssignment {
    /// [`Assignment`] of the [`Boat`] carrying the [`Booking`].
    Locked {
        /// Assigned [`Guide`], if any.
        guide: Option<Resource<Guide>>,

        /// Assigned [`Restaurant`], if any.
        restaurant: Option<Resource<Restaurant>>,
    },

    /// [`Guide`] and [`Restaurant`] set directly on the [`Booking`].
    DirectOverride {
        /// [`Guide`] of the [`Booking`], if any.
        guide: Option<Resource<Guide>>,

        /// [`Restaurant`] of the [`Booking`], if any.
        restaurant: Option<Resource<Restaurant>>,
    },

    /// Neither an [`Assignment`] nor direct values exist.
    Unassigned,
}

impl EffectiveAssignment {
    /// Resolves the [`EffectiveAssignment`] of the provided [`Booking`].
    ///
    /// An [`Assignment`] of the [`Boat`] always wins, while the values of the
    /// [`Booking`] itself are used only when the [`Boat`] has no
    /// [`Assignment`] or the [`Booking`] has no [`Boat`] at all.
    #[must_use]
    pub fn resolve(
        booking: &read::booking::Resolved,
        day: &assignment::Day,
    ) -> Self {
        if let Some(lock) = booking.booking.boat_id.and_then(|id| day.get(id))
        {
            return Self::Locked {
                guide: lock.guide.clone(),
                restaurant: lock.restaurant.clone(),
            };
        }

        if booking.guide.is_none() && booking.restaurant.is_none() {
            return Self::Unassigned;
        }
        Self::DirectOverride {
            guide: booking.guide.clone(),
            restaurant: booking.restaurant.clone(),
        }
    }

    /// Returns the effective [`Guide`], if any.
    #[must_use]
    pub fn guide(&self) -> Option<&Resource<Guide>> {
        match self {
            Self::Locked { guide, .. } | Self::DirectOverride { guide, .. } => {
                guide.as_ref()
            }
            Self::Unassigned => None,
        }
    }

    /// Returns the effective [`Restaurant`], if any.
    #[must_use]
    pub fn restaurant(&self) -> Option<&Resource<Restaurant>> {
        match self {
            Self::Locked { restaurant, .. }
            | Self::DirectOverride { restaurant, .. } => restaurant.as_ref(),
            Self::Unassigned => None,
        }
    }
}

/// [`Row`]s of a [`Manifest`] sharing the same `K`ey.
#[derive(Clone, Debug)]
pub struct Group<'m, K> {
    /// Key shared by the [`Row`]s of this [`Group`].
    pub key: K,

    /// [`Row`]s of this [`Group`] in the [`Manifest`] order.
    pub rows: Vec<&'m Row>,
}

impl<K> Group<'_, K> {
    /// Sums up the [`Row`]s of this [`Group`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::of(self.rows.iter().copied())
    }
}

/// Groups the provided `rows` by the key returned from the `by` function
/// along with the value the [`Group`]s are ordered by.
fn group<'m, K, O, I, F>(rows: I, by: F) -> Vec<Group<'m, K>>
where
    I: IntoIterator<Item = &'m Row>,
    F: Fn(&'m Row) -> (O, K),
    O: Ord,
{
    let mut groups = BTreeMap::<O, Group<'m, K>>::new();
    for row in rows {
        let (order, key) = by(row);
        groups
            .entry(order)
            .or_insert_with(|| Group { key, rows: vec![] })
            .rows
            .push(row);
    }
    groups.into_values().collect()
}

/// Sums of [`Row`]s of a [`Manifest`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// Number of [`Booking`]s.
    pub bookings: usize,

    /// Total [`Passengers`].
    pub passengers: Passengers,

    /// Cash to be collected on pickup.
    pub collect_money: money::Totals,

    /// Resolved prices of the billable [`Booking`]s.
    pub revenue: money::Totals,

    /// Number of billable [`Booking`]s without a resolvable price.
    ///
    /// Never summed up into the [`Totals::revenue`].
    pub unpriced: usize,

    /// Number of billable [`Booking`]s billed by an active invoice.
    pub billed: usize,

    /// Number of billable [`Booking`]s not billed yet.
    pub unbilled: usize,
}

impl Totals {
    /// Sums up the provided [`Row`]s.
    pub fn of<'m>(rows: impl IntoIterator<Item = &'m Row>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            let booking = &row.booking.booking;
            totals.bookings += 1;
            totals.passengers += booking.passengers;
            if let Some(cash) = booking.collect_money {
                totals.collect_money.add(cash);
            }
            if !row.is_billable() {
                continue;
            }

            match &row.price {
                Ok(price) => totals.revenue.add(price.total),
                Err(_) => totals.unpriced += 1,
            }
            if row.billed {
                totals.billed += 1;
            } else {
                totals.unbilled += 1;
            }
        }
        totals
    }
}
