//! [`Program`] definitions.

use common::{define_kind, money::Currency};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::company;

/// Tour product sold by a [`Company`].
///
/// [`Company`]: crate::domain::Company
#[derive(Clone, Debug)]
pub struct Program {
    /// ID of this [`Program`].
    pub id: Id,

    /// ID of the [`Company`] selling this [`Program`].
    ///
    /// [`Company`]: crate::domain::Company
    pub company_id: company::Id,

    /// [`Name`] of this [`Program`].
    pub name: Name,

    /// [`PricingType`] of this [`Program`].
    pub pricing_type: PricingType,

    /// [`Currency`] all the prices of this [`Program`] are expressed in.
    pub currency: Currency,

    /// Price of a whole booking of this [`Program`] with
    /// [`PricingType::Flat`].
    pub base_price: Decimal,

    /// Price of an adult of this [`Program`] with [`PricingType::PerHead`],
    /// if defined.
    pub adult_selling_price: Option<Decimal>,

    /// Price of a child of this [`Program`] with [`PricingType::PerHead`],
    /// if defined.
    pub child_selling_price: Option<Decimal>,
}

/// ID of a [`Program`].
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

/// Name of a [`Program`].
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

define_kind! {
    #[doc = "Way a [`Program`] is priced."]
    enum PricingType {
        #[doc = "Single price for a whole booking."]
        Flat = 1,

        #[doc = "Price per adult and per child, infants are free."]
        PerHead = 2,
    }
}
