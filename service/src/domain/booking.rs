//! [`Booking`] definitions.

use std::{fmt, ops, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateOf, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

use crate::domain::{
    agent, company, program,
    resource::{self, Boat, Driver, Guide, Hotel, Restaurant},
};
#[cfg(doc)]
use crate::domain::{Agent, Company, Program};

/// Customer reservation for one [`Program`] on one [`ActivityDate`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`Company`] this [`Booking`] belongs to.
    ///
    /// Never changes and scopes every lookup related to this [`Booking`].
    pub company_id: company::Id,

    /// ID of the booked [`Program`].
    pub program_id: program::Id,

    /// ID of the [`Agent`] this [`Booking`] was placed through, if any.
    ///
    /// [`None`] means a direct booking.
    pub agent_id: Option<agent::Id>,

    /// ID of the [`agent::Staff`] this [`Booking`] was placed by, if any.
    pub agent_staff_id: Option<agent::StaffId>,

    /// ID of the [`Hotel`] the customers are picked up from, if any.
    pub hotel_id: Option<resource::Id<Hotel>>,

    /// ID of the [`Driver`] picking the customers up, if any.
    pub driver_id: Option<resource::Id<Driver>>,

    /// ID of the [`Boat`] the customers are carried by, if any.
    pub boat_id: Option<resource::Id<Boat>>,

    /// ID of the [`Guide`] set directly on this [`Booking`], if any.
    ///
    /// Used only when no assignment exists for the [`Boat`] of this
    /// [`Booking`].
    pub guide_id: Option<resource::Id<Guide>>,

    /// ID of the [`Restaurant`] set directly on this [`Booking`], if any.
    ///
    /// Used only when no assignment exists for the [`Boat`] of this
    /// [`Booking`].
    pub restaurant_id: Option<resource::Id<Restaurant>>,

    /// [`CustomerName`] of this [`Booking`].
    pub customer_name: CustomerName,

    /// [`RoomNumber`] of the customers in their [`Hotel`], if any.
    pub room_number: Option<RoomNumber>,

    /// [`Remarks`] to this [`Booking`], if any.
    pub remarks: Option<Remarks>,

    /// [`Passengers`] of this [`Booking`].
    pub passengers: Passengers,

    /// [`ActivityDate`] of this [`Booking`].
    pub activity_date: ActivityDate,

    /// [`PickupTime`] of the customers, if known.
    pub pickup_time: Option<PickupTime>,

    /// Cash to be collected from the customers on pickup, if any.
    pub collect_money: Option<Money>,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`PaymentType`] of this [`Booking`].
    pub payment_type: PaymentType,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was deleted, if it was.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Booking {
    /// Indicates whether this [`Booking`] takes part in the daily operations.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.deleted_at.is_none() && self.status.is_operational()
    }

    /// Indicates whether this [`Booking`] takes part in the financial views
    /// and may be billed.
    #[must_use]
    pub fn is_billable(&self) -> bool {
        self.deleted_at.is_none() && self.status.is_billable()
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of the customer a [`Booking`] is made for.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CustomerName(String);

impl CustomerName {
    /// Creates a new [`CustomerName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`CustomerName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`CustomerName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for CustomerName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CustomerName`")
    }
}

/// Number of the hotel room the customers of a [`Booking`] stay in.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct RoomNumber(String);

impl RoomNumber {
    /// Creates a new [`RoomNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        let valid = number.trim() == number
            && !number.is_empty()
            && number.len() <= 32;
        valid.then_some(Self(number))
    }
}

/// Free-form remarks to a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Remarks(String);

impl Remarks {
    /// Creates new [`Remarks`] if the given `remarks` are valid.
    #[must_use]
    pub fn new(remarks: impl Into<String>) -> Option<Self> {
        let remarks = remarks.into();
        (!remarks.trim().is_empty() && remarks.len() <= 4096)
            .then_some(Self(remarks))
    }
}

/// Counts of passengers in a [`Booking`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Passengers {
    /// Number of adults.
    pub adults: u16,

    /// Number of children.
    pub children: u16,

    /// Number of infants.
    pub infants: u16,
}

impl Passengers {
    /// Returns the total number of these [`Passengers`].
    #[must_use]
    pub fn total(self) -> u32 {
        u32::from(self.adults)
            + u32::from(self.children)
            + u32::from(self.infants)
    }
}

impl ops::AddAssign for Passengers {
    fn add_assign(&mut self, rhs: Self) {
        self.adults = self.adults.saturating_add(rhs.adults);
        self.children = self.children.saturating_add(rhs.children);
        self.infants = self.infants.saturating_add(rhs.infants);
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Placed, but not confirmed yet."]
        Pending = 1,

        #[doc = "Confirmed by the [`Company`]."]
        Confirmed = 2,

        #[doc = "Operated already."]
        Completed = 3,

        #[doc = "Cancelled by the customer or the [`Agent`]."]
        Cancelled = 4,

        #[doc = "Voided by the [`Company`]."]
        Void = 5,
    }
}

impl Status {
    /// [`Status`]es of [`Booking`]s taking part in the daily operations.
    pub const OPERATIONAL: &'static [Self] =
        &[Self::Pending, Self::Confirmed, Self::Completed];

    /// [`Status`]es of [`Booking`]s taking part in the financial views.
    pub const BILLABLE: &'static [Self] = &[Self::Confirmed, Self::Completed];

    /// Indicates whether this [`Status`] is one of [`Status::OPERATIONAL`].
    #[must_use]
    pub fn is_operational(self) -> bool {
        Self::OPERATIONAL.contains(&self)
    }

    /// Indicates whether this [`Status`] is one of [`Status::BILLABLE`].
    #[must_use]
    pub fn is_billable(self) -> bool {
        Self::BILLABLE.contains(&self)
    }
}

define_kind! {
    #[doc = "Way a [`Booking`] is paid."]
    enum PaymentType {
        #[doc = "Cash collected on pickup."]
        Cash = 1,

        #[doc = "Bank transfer."]
        Transfer = 2,

        #[doc = "Credit of the [`Agent`], settled by an invoice."]
        Credit = 3,
    }
}

/// Day the activity of a [`Booking`] physically happens on.
pub type ActivityDate = DateOf<unit::Activity>;

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Booking, unit::Deletion)>;

/// Time of the day customers of a [`Booking`] are picked up at.
///
/// Always normalized to whole minutes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PickupTime(time::Time);

impl PickupTime {
    /// Length of a pickup window in minutes.
    pub const WINDOW_MINUTES: u8 = 15;

    /// Creates a new [`PickupTime`] out of the provided `hour` and `minute`.
    #[must_use]
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        time::Time::from_hms(hour, minute, 0).ok().map(Self)
    }

    /// Parses a [`PickupTime`] out of `HH:MM` or `HH:MM:SS` input, dropping
    /// the seconds.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        /// `H:MM`, `HH:MM` or `HH:MM:SS` with optional fraction of seconds.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(\d{1,2}):(\d{2})(?::\d{2}(?:\.\d+)?)?$")
                .expect("valid regex")
        });

        let caps = REGEX.captures(input.trim())?;
        Self::from_hm(caps[1].parse().ok()?, caps[2].parse().ok()?)
    }

    /// Returns the hour of this [`PickupTime`].
    #[must_use]
    pub fn hour(self) -> u8 {
        self.0.hour()
    }

    /// Returns the minute of this [`PickupTime`].
    #[must_use]
    pub fn minute(self) -> u8 {
        self.0.minute()
    }

    /// Returns the [`PickupWindow`] starting at this [`PickupTime`] and
    /// lasting for the provided number of `minutes`.
    #[must_use]
    pub fn window(self, minutes: u8) -> PickupWindow {
        PickupWindow {
            start: self,
            end: Self(self.0 + time::Duration::minutes(i64::from(minutes))),
        }
    }
}

impl From<time::Time> for PickupTime {
    fn from(time: time::Time) -> Self {
        Self(
            time::Time::from_hms(time.hour(), time.minute(), 0)
                .expect("valid hour and minute"),
        )
    }
}

impl fmt::Display for PickupTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for PickupTime {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or("invalid `PickupTime`")
    }
}

#[cfg(feature = "postgres")]
impl<'a> FromSql<'a> for PickupTime {
    postgres_types::accepts!(TIME);

    fn from_sql(
        ty: &postgres_types::Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        time::Time::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for PickupTime {
    postgres_types::accepts!(TIME);
    postgres_types::to_sql_checked!();

    fn to_sql(
        &self,
        ty: &postgres_types::Type,
        w: &mut postgres_types::private::BytesMut,
    ) -> Result<
        postgres_types::IsNull,
        Box<dyn std::error::Error + Sync + Send>,
    > {
        self.0.to_sql(ty, w)
    }
}

/// Time range customers of a [`Booking`] should be ready for pickup within.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PickupWindow {
    /// Beginning of this [`PickupWindow`].
    pub start: PickupTime,

    /// End of this [`PickupWindow`].
    pub end: PickupTime,
}

impl fmt::Display for PickupWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// 12-hour clock representation of a [`PickupTime`].
        const FORMAT: &[BorrowedFormatItem<'_>] =
            format_description!("[hour repr:12]:[minute] [period]");

        let start = self.start.0.format(FORMAT).map_err(|_| fmt::Error)?;
        let end = self.end.0.format(FORMAT).map_err(|_| fmt::Error)?;
        write!(f, "{start} - {end}")
    }
}

#[cfg(test)]
mod spec {
    use super::{PickupTime, Status};

    #[test]
    fn normalizes_pickup_time() {
        assert_eq!(PickupTime::parse("14:05:00").unwrap().to_string(), "14:05");
        assert_eq!(PickupTime::parse("14:05:59").unwrap().to_string(), "14:05");
        assert_eq!(PickupTime::parse(" 7:30 ").unwrap().to_string(), "07:30");
        assert_eq!(
            PickupTime::parse("09:15:00.250").unwrap().to_string(),
            "09:15",
        );
        assert_eq!(
            PickupTime::from(time::macros::time!(8:45:30)).to_string(),
            "08:45",
        );
    }

    #[test]
    fn rejects_invalid_pickup_time() {
        assert!(PickupTime::parse("24:00").is_none());
        assert!(PickupTime::parse("12:60").is_none());
        assert!(PickupTime::parse("noon").is_none());
        assert!(PickupTime::parse("").is_none());
    }

    #[test]
    fn formats_pickup_window() {
        let time = PickupTime::parse("14:05:00").unwrap();
        assert_eq!(
            time.window(PickupTime::WINDOW_MINUTES).to_string(),
            "02:05 PM - 02:20 PM",
        );

        let time = PickupTime::parse("11:50").unwrap();
        assert_eq!(time.window(15).to_string(), "11:50 AM - 12:05 PM");

        let time = PickupTime::parse("00:00").unwrap();
        assert_eq!(time.window(15).to_string(), "12:00 AM - 12:15 AM");
    }

    #[test]
    fn distinguishes_operational_and_billable_statuses() {
        assert!(Status::Pending.is_operational());
        assert!(!Status::Pending.is_billable());
        assert!(Status::Confirmed.is_billable());
        assert!(Status::Completed.is_billable());
        assert!(!Status::Cancelled.is_operational());
        assert!(!Status::Void.is_operational());
        assert!(!Status::Void.is_billable());
    }
}
