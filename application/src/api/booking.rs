//! [`Booking`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, Context};

/// [`Booking`] of a tour program along with everything it refers to.
#[derive(Clone, Debug, From, Into)]
pub struct Booking(read::booking::Resolved);

/// Booking of a tour `Program` made by a customer directly or through an
/// `Agent`.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.booking.id.into()
    }

    /// Name of the customer this `Booking` is made for.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.0.booking.customer_name.as_ref()
    }

    /// Hotel room of the customers, if known.
    #[must_use]
    pub fn room_number(&self) -> Option<&str> {
        self.0.booking.room_number.as_ref().map(AsRef::as_ref)
    }

    /// Remarks to this `Booking`, if any.
    #[must_use]
    pub fn remarks(&self) -> Option<&str> {
        self.0.booking.remarks.as_ref().map(AsRef::as_ref)
    }

    /// Number of adults.
    #[must_use]
    pub fn adults(&self) -> i32 {
        self.0.booking.passengers.adults.into()
    }

    /// Number of children.
    #[must_use]
    pub fn children(&self) -> i32 {
        self.0.booking.passengers.children.into()
    }

    /// Number of infants.
    #[must_use]
    pub fn infants(&self) -> i32 {
        self.0.booking.passengers.infants.into()
    }

    /// `Date` of the tour.
    #[must_use]
    pub fn activity_date(&self) -> Date {
        self.0.booking.activity_date.coerce()
    }

    /// Pickup time in `HH:MM` format, if known.
    #[must_use]
    pub fn pickup_time(&self) -> Option<String> {
        self.0.booking.pickup_time.map(|t| t.to_string())
    }

    /// Pickup window in `hh:mm AM - hh:mm AM` format, if the pickup time is
    /// known.
    #[must_use]
    pub fn pickup_window(&self) -> Option<String> {
        self.0
            .booking
            .pickup_time
            .map(|t| t.window(domain::booking::PickupTime::WINDOW_MINUTES))
            .map(|w| w.to_string())
    }

    /// Cash to be collected from the customers on pickup, if any.
    #[must_use]
    pub fn collect_money(&self) -> Option<Money> {
        self.0.booking.collect_money
    }

    /// Status of this `Booking`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.booking.status.into()
    }

    /// Way this `Booking` is paid.
    #[must_use]
    pub fn payment_type(&self) -> PaymentType {
        self.0.booking.payment_type.into()
    }

    /// Booked `Program`.
    #[must_use]
    pub fn program(&self) -> api::Program {
        self.0.program.clone().into()
    }

    /// `Agent` this `Booking` was placed through, if any.
    #[must_use]
    pub fn agent(&self) -> Option<api::Agent> {
        self.0.agent.clone().map(Into::into)
    }

    /// Name of the `Agent`'s staff member this `Booking` was placed by, if
    /// any.
    #[must_use]
    pub fn agent_staff(&self) -> Option<&str> {
        self.0.agent_staff.as_ref().map(|s| s.name.as_ref())
    }

    /// `Hotel` the customers are picked up from, if any.
    #[must_use]
    pub fn hotel(&self) -> Option<api::Hotel> {
        self.0.hotel.clone().map(Into::into)
    }

    /// `Driver` picking the customers up, if any.
    #[must_use]
    pub fn driver(&self) -> Option<api::Driver> {
        self.0.driver.clone().map(Into::into)
    }

    /// `Boat` carrying the customers, if any.
    #[must_use]
    pub fn boat(&self) -> Option<api::Boat> {
        self.0.boat.clone().map(Into::into)
    }

    /// `Guide` set on this `Booking` directly, if any.
    ///
    /// Used only if the `Boat` of this `Booking` has no
    /// `ResourceAssignment`.
    #[must_use]
    pub fn guide(&self) -> Option<api::Guide> {
        self.0.guide.clone().map(Into::into)
    }

    /// `Restaurant` set on this `Booking` directly, if any.
    ///
    /// Used only if the `Boat` of this `Booking` has no
    /// `ResourceAssignment`.
    #[must_use]
    pub fn restaurant(&self) -> Option<api::Restaurant> {
        self.0.restaurant.clone().map(Into::into)
    }

    /// `DateTime` when this `Booking` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.booking.created_at.coerce()
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    GraphQLScalar,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// Placed, but not confirmed yet.
    Pending,

    /// Confirmed by the company.
    Confirmed,

    /// Operated already.
    Completed,

    /// Cancelled by the customer or the `Agent`.
    Cancelled,

    /// Voided by the company.
    Void,
}

impl From<domain::booking::Status> for Status {
    fn from(value: domain::booking::Status) -> Self {
        use domain::booking::Status as S;

        match value {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
            S::Void => Self::Void,
        }
    }
}

/// Way a `Booking` is paid.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentType")]
pub enum PaymentType {
    /// Cash collected on pickup.
    Cash,

    /// Bank transfer.
    Transfer,

    /// Credit of the `Agent`, settled by an `Invoice`.
    Credit,
}

impl From<domain::booking::PaymentType> for PaymentType {
    fn from(value: domain::booking::PaymentType) -> Self {
        use domain::booking::PaymentType as P;

        match value {
            P::Cash => Self::Cash,
            P::Transfer => Self::Transfer,
            P::Credit => Self::Credit,
        }
    }
}
