//! [`Invoice`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{agent, booking, company};
#[cfg(doc)]
use crate::domain::{Agent, Booking, Company};

/// Bill of an [`Agent`] aggregating its [`Booking`]s.
#[derive(Clone, Debug)]
pub struct Invoice {
    /// ID of this [`Invoice`].
    pub id: Id,

    /// ID of the [`Company`] issuing this [`Invoice`].
    pub company_id: company::Id,

    /// ID of the [`Agent`] billed by this [`Invoice`].
    pub agent_id: agent::Id,

    /// [`Number`] of this [`Invoice`], unique within its [`Company`].
    pub number: Number,

    /// [`DateTime`] when this [`Invoice`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Invoice`] was voided, if it was.
    pub voided_at: Option<VoidingDateTime>,
}

impl Invoice {
    /// Indicates whether this [`Invoice`] is not voided.
    ///
    /// Only [`Item`]s of active [`Invoice`]s make their [`Booking`]s billed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.voided_at.is_none()
    }
}

/// ID of an [`Invoice`].
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
    PartialEq,
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

/// Number of an [`Invoice`] as printed on it.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number
            && !number.is_empty()
            && number.len() <= 64
            && !number.chars().any(char::is_control)
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Line of an [`Invoice`] billing a single [`Booking`].
#[derive(Clone, Debug)]
pub struct Item {
    /// ID of the [`Invoice`] this [`Item`] belongs to.
    pub invoice_id: Id,

    /// ID of the billed [`Booking`].
    pub booking_id: booking::Id,

    /// Price of the [`Booking`] resolved when it was attached.
    pub amount: Money,

    /// [`DateTime`] when this [`Item`] was created.
    pub created_at: ItemCreationDateTime,
}

/// [`DateTime`] when an [`Invoice`] was created.
pub type CreationDateTime = DateTimeOf<(Invoice, unit::Creation)>;

/// [`DateTime`] when an [`Invoice`] was voided.
pub type VoidingDateTime = DateTimeOf<(Invoice, unit::Voiding)>;

/// [`DateTime`] when an [`Item`] was created.
pub type ItemCreationDateTime = DateTimeOf<(Item, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Number;

    #[test]
    fn validates_number() {
        assert!(Number::new("INV-2024-0001").is_some());
        assert!(Number::new("").is_none());
        assert!(Number::new(" INV-1").is_none());
        assert!(Number::new("INV\n1").is_none());
        assert!(Number::new("9".repeat(65)).is_none());
    }
}
