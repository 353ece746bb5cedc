//! [`Agent`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{company, program};
#[cfg(doc)]
use crate::domain::{Booking, Program};

/// Reseller placing [`Booking`]s on behalf of its customers.
#[derive(Clone, Debug)]
pub struct Agent {
    /// ID of this [`Agent`].
    pub id: Id,

    /// ID of the [`Company`] this [`Agent`] works with.
    ///
    /// [`Company`]: crate::domain::Company
    pub company_id: company::Id,

    /// [`Name`] of this [`Agent`].
    pub name: Name,
}

/// ID of an [`Agent`].
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

/// Name of an [`Agent`] or its [`Staff`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let valid =
            name.trim() == name && !name.is_empty() && name.len() <= 256;
        valid.then_some(Self(name))
    }
}

/// Employee of an [`Agent`] a [`Booking`] was placed by.
#[derive(Clone, Debug)]
pub struct Staff {
    /// ID of this [`Staff`].
    pub id: StaffId,

    /// ID of the [`Agent`] employing this [`Staff`].
    pub agent_id: Id,

    /// [`Name`] of this [`Staff`].
    pub name: Name,
}

/// ID of an [`Agent`]'s [`Staff`].
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
pub struct StaffId(Uuid);

impl StaffId {
    /// Creates a new random [`StaffId`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Prices an [`Agent`] negotiated for a [`Program`].
///
/// Every defined price takes precedence over the matching default price of
/// the [`Program`].
#[derive(Clone, Debug)]
pub struct PricingOverride {
    /// ID of the [`Agent`] the prices were negotiated by.
    pub agent_id: Id,

    /// ID of the [`Program`] the prices are negotiated for.
    pub program_id: program::Id,

    /// Price of a whole booking, overriding [`Program::base_price`].
    pub agent_price: Option<Decimal>,

    /// Price of an adult, overriding [`Program::adult_selling_price`].
    pub adult_agent_price: Option<Decimal>,

    /// Price of a child, overriding [`Program::child_selling_price`].
    pub child_agent_price: Option<Decimal>,
}
