//! Financial read model definitions.
//!
//! Only billable [`Booking`]s are ever considered.

use std::collections::BTreeMap;

use common::money;

use crate::{
    domain::{
        agent,
        booking::Passengers,
        pricing::{self, Breakdown, MissingPricingData},
        program, Program,
    },
    read::{
        self, booking::list::Period, pricing::Overrides, settlement::Billed,
    },
};
#[cfg(doc)]
use crate::domain::{Agent, Booking};

/// Statement of the billable [`Booking`]s of an [`Agent`] within a
/// [`Period`].
#[derive(Clone, Debug)]
pub struct Statement {
    /// ID of the [`Agent`] this [`Statement`] is about.
    pub agent_id: agent::Id,

    /// [`Period`] of activity dates covered by this [`Statement`].
    pub period: Period,

    /// Lines of this [`Statement`], ordered by activity date.
    pub lines: Vec<Line>,
}

impl Statement {
    /// Compiles a [`Statement`] out of the provided [`Booking`]s.
    ///
    /// [`Booking`]s of other [`Agent`]s, out of the [`Period`], or not
    /// billable are left out.
    #[must_use]
    pub fn compile(
        agent_id: agent::Id,
        period: Period,
        bookings: Vec<read::booking::Resolved>,
        overrides: &Overrides,
        billed: &Billed,
    ) -> Self {
        let mut lines = bookings
            .into_iter()
            .filter(|r| {
                r.booking.agent_id == Some(agent_id)
                    && period.contains(r.booking.activity_date)
                    && r.booking.is_billable()
            })
            .map(|r| Line {
                price: pricing::resolve(
                    &r.booking,
                    &r.program,
                    overrides.for_booking(&r.booking),
                ),
                billed: billed.is_billed(r.booking.id),
                booking: r,
            })
            .collect::<Vec<_>>();
        lines.sort_by(|a, b| {
            let (a, b) = (&a.booking.booking, &b.booking.booking);
            (a.activity_date, &a.customer_name, a.id).cmp(&(
                b.activity_date,
                &b.customer_name,
                b.id,
            ))
        });

        Self {
            agent_id,
            period,
            lines,
        }
    }

    /// Sums the prices of the [`Line`]s of this [`Statement`].
    #[must_use]
    pub fn totals(&self) -> StatementTotals {
        let mut totals = StatementTotals::default();
        for line in &self.lines {
            match (&line.price, line.billed) {
                (Ok(price), true) => totals.billed.add(price.total),
                (Ok(price), false) => totals.unbilled.add(price.total),
                (Err(_), _) => totals.unpriced += 1,
            }
        }
        totals
    }
}

/// Single [`Booking`] of a [`Statement`].
#[derive(Clone, Debug)]
pub struct Line {
    /// Resolved [`Booking`].
    pub booking: read::booking::Resolved,

    /// Price of the [`Booking`].
    pub price: Result<Breakdown, MissingPricingData>,

    /// Indicator whether the [`Booking`] is billed already.
    pub billed: bool,
}

/// Totals of a [`Statement`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatementTotals {
    /// Sum of the billed [`Booking`]s prices.
    pub billed: money::Totals,

    /// Sum of the unbilled [`Booking`]s prices.
    pub unbilled: money::Totals,

    /// Number of [`Booking`]s without a resolvable price.
    pub unpriced: usize,
}

/// Revenue of billable [`Booking`]s within a [`Period`], per [`Program`].
#[derive(Clone, Debug)]
pub struct Revenue {
    /// [`Period`] of activity dates covered by this [`Revenue`].
    pub period: Period,

    /// Revenue of every [`Program`] having billable [`Booking`]s, ordered by
    /// [`Program`] name.
    pub programs: Vec<ProgramRevenue>,
}

impl Revenue {
    /// Compiles a [`Revenue`] out of the provided [`Booking`]s.
    #[must_use]
    pub fn compile(
        period: Period,
        bookings: Vec<read::booking::Resolved>,
        overrides: &Overrides,
    ) -> Self {
        let mut programs =
            BTreeMap::<(program::Name, program::Id), ProgramRevenue>::new();
        for r in bookings {
            if !(period.contains(r.booking.activity_date)
                && r.booking.is_billable())
            {
                continue;
            }

            let price = pricing::resolve(
                &r.booking,
                &r.program,
                overrides.for_booking(&r.booking),
            );
            let entry = programs
                .entry((r.program.name.clone(), r.program.id))
                .or_insert_with(|| ProgramRevenue {
                    program: r.program.clone(),
                    bookings: 0,
                    passengers: Passengers::default(),
                    revenue: money::Totals::default(),
                    unpriced: 0,
                });
            entry.bookings += 1;
            entry.passengers += r.booking.passengers;
            match price {
                Ok(price) => entry.revenue.add(price.total),
                Err(_) => entry.unpriced += 1,
            }
        }

        Self {
            period,
            programs: programs.into_values().collect(),
        }
    }

    /// Sums the revenue of all the [`Program`]s.
    #[must_use]
    pub fn total(&self) -> money::Totals {
        self.programs
            .iter()
            .flat_map(|p| p.revenue.iter())
            .collect()
    }
}

/// [`Revenue`] of a single [`Program`].
#[derive(Clone, Debug)]
pub struct ProgramRevenue {
    /// [`Program`] this [`ProgramRevenue`] is about.
    pub program: Program,

    /// Number of billable [`Booking`]s.
    pub bookings: usize,

    /// Passengers of the billable [`Booking`]s.
    pub passengers: Passengers,

    /// Sum of the resolved prices.
    pub revenue: money::Totals,

    /// Number of [`Booking`]s without a resolvable price, not summed in the
    /// `revenue`.
    pub unpriced: usize,
}
