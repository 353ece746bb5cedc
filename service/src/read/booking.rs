//! [`Booking`] read model definitions.

use crate::domain::{
    agent,
    resource::{Boat, Driver, Guide, Hotel, Restaurant},
    Agent, Booking, Program, Resource,
};

/// [`Booking`] with all its references resolved.
#[derive(Clone, Debug)]
pub struct Resolved {
    /// Resolved [`Booking`] itself.
    pub booking: Booking,

    /// Booked [`Program`].
    pub program: Program,

    /// [`Agent`] the [`Booking`] was placed through, if any.
    pub agent: Option<Agent>,

    /// [`agent::Staff`] the [`Booking`] was placed by, if any.
    pub agent_staff: Option<agent::Staff>,

    /// [`Hotel`] the customers are picked up from, if any.
    pub hotel: Option<Resource<Hotel>>,

    /// [`Driver`] picking the customers up, if any.
    pub driver: Option<Resource<Driver>>,

    /// [`Boat`] carrying the customers, if any.
    pub boat: Option<Resource<Boat>>,

    /// [`Guide`] set directly on the [`Booking`], if any.
    pub guide: Option<Resource<Guide>>,

    /// [`Restaurant`] set directly on the [`Booking`], if any.
    pub restaurant: Option<Resource<Restaurant>>,
}

pub mod list {
    //! [`Booking`]s list definitions.

    use derive_more::{Display, Error};

    use crate::domain::{
        agent,
        booking::{ActivityDate, Status},
        company,
        resource::{self, Boat},
        Booking,
    };
    #[cfg(doc)]
    use crate::domain::{Agent, Company};

    /// Inclusive range of [`ActivityDate`]s.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Period {
        /// First [`ActivityDate`] of this [`Period`].
        from: ActivityDate,

        /// Last [`ActivityDate`] of this [`Period`].
        to: ActivityDate,
    }

    impl Period {
        /// Creates a new [`Period`] out of the provided bounds.
        ///
        /// # Errors
        ///
        /// If `from` goes after `to`.
        pub fn new(
            from: ActivityDate,
            to: ActivityDate,
        ) -> Result<Self, InvalidPeriod> {
            if from > to {
                return Err(InvalidPeriod { from, to });
            }
            Ok(Self { from, to })
        }

        /// Creates a new [`Period`] of a single `day`.
        #[must_use]
        pub fn day(day: ActivityDate) -> Self {
            Self { from: day, to: day }
        }

        /// Returns the first [`ActivityDate`] of this [`Period`].
        #[must_use]
        pub fn from(&self) -> ActivityDate {
            self.from
        }

        /// Returns the last [`ActivityDate`] of this [`Period`].
        #[must_use]
        pub fn to(&self) -> ActivityDate {
            self.to
        }

        /// Indicates whether the provided `date` is within this [`Period`].
        #[must_use]
        pub fn contains(&self, date: ActivityDate) -> bool {
            self.from <= date && date <= self.to
        }
    }

    /// Error of creating a [`Period`] ending before it begins.
    #[derive(Clone, Copy, Debug, Display, Error)]
    #[display("period from {from} to {to} ends before it begins")]
    pub struct InvalidPeriod {
        /// Requested beginning.
        #[error(not(source))]
        pub from: ActivityDate,

        /// Requested end.
        #[error(not(source))]
        pub to: ActivityDate,
    }

    /// Selector of [`Booking`]s.
    ///
    /// Deleted [`Booking`]s are never selected.
    #[derive(Clone, Debug)]
    pub struct Selector {
        /// ID of the [`Company`] to select the [`Booking`]s of.
        pub company_id: company::Id,

        /// [`Period`] to select the [`Booking`]s within.
        pub period: Period,

        /// [`Status`]es of the [`Booking`]s to select.
        pub statuses: Vec<Status>,

        /// IDs of the [`Boat`]s to select the [`Booking`]s carried by, if
        /// any.
        pub boat_ids: Option<Vec<resource::Id<Boat>>>,

        /// ID of the [`Agent`] to select the [`Booking`]s of, if any.
        pub agent_id: Option<agent::Id>,
    }

    impl Selector {
        /// Creates a new [`Selector`] of the [`Booking`]s taking part in the
        /// operations of the provided `date`.
        #[must_use]
        pub fn operational(
            company_id: company::Id,
            date: ActivityDate,
        ) -> Self {
            Self {
                company_id,
                period: Period::day(date),
                statuses: Status::OPERATIONAL.to_vec(),
                boat_ids: None,
                agent_id: None,
            }
        }

        /// Creates a new [`Selector`] of the billable [`Booking`]s within
        /// the provided [`Period`].
        #[must_use]
        pub fn billable(company_id: company::Id, period: Period) -> Self {
            Self {
                company_id,
                period,
                statuses: Status::BILLABLE.to_vec(),
                boat_ids: None,
                agent_id: None,
            }
        }

        /// Narrows this [`Selector`] to the [`Booking`]s of the provided
        /// [`Agent`].
        #[must_use]
        pub fn of_agent(mut self, agent_id: agent::Id) -> Self {
            self.agent_id = Some(agent_id);
            self
        }

        /// Indicates whether the provided [`Booking`] is selected by this
        /// [`Selector`].
        #[must_use]
        pub fn matches(&self, booking: &Booking) -> bool {
            booking.company_id == self.company_id
                && booking.deleted_at.is_none()
                && self.period.contains(booking.activity_date)
                && self.statuses.contains(&booking.status)
                && self.boat_ids.as_ref().map_or(true, |ids| {
                    booking.boat_id.is_some_and(|id| ids.contains(&id))
                })
                && self
                    .agent_id
                    .map_or(true, |id| booking.agent_id == Some(id))
        }
    }
}
