//! [`Program`]-related definitions.

use common::Money;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::Context;

/// Tour [`Program`] offered to the customers.
#[derive(Clone, Debug, From, Into)]
pub struct Program(domain::Program);

/// Tour `Program` offered to the customers.
#[graphql_object(context = Context)]
impl Program {
    /// Unique identifier of this `Program`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Program`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.name.as_ref()
    }

    /// Way this `Program` is priced.
    #[must_use]
    pub fn pricing_type(&self) -> PricingType {
        self.0.pricing_type.into()
    }

    /// Price of a whole booking of this `Program` priced flat.
    #[must_use]
    pub fn base_price(&self) -> Money {
        Money {
            amount: self.0.base_price,
            currency: self.0.currency,
        }
    }

    /// Price of a single adult of this `Program` priced per head.
    #[must_use]
    pub fn adult_selling_price(&self) -> Option<Money> {
        self.0.adult_selling_price.map(|amount| Money {
            amount,
            currency: self.0.currency,
        })
    }

    /// Price of a single child of this `Program` priced per head.
    #[must_use]
    pub fn child_selling_price(&self) -> Option<Money> {
        self.0.child_selling_price.map(|amount| Money {
            amount,
            currency: self.0.currency,
        })
    }
}

/// Unique identifier of a `Program`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::program::Id)]
#[into(domain::program::Id)]
#[graphql(name = "ProgramId", transparent)]
pub struct Id(Uuid);

/// Way a `Program` is priced.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PricingType")]
pub enum PricingType {
    /// Single price for a whole booking.
    Flat,

    /// Price per adult and per child, infants are free.
    PerHead,
}

impl From<domain::program::PricingType> for PricingType {
    fn from(value: domain::program::PricingType) -> Self {
        use domain::program::PricingType as T;

        match value {
            T::Flat => Self::Flat,
            T::PerHead => Self::PerHead,
        }
    }
}
