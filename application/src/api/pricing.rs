//! Price resolution definitions.

use common::Money;
use derive_more::{From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject};
use service::domain::pricing::{self, Rates};

use crate::{api::program::PricingType, Context};

/// Resolved price of a `Booking` along with the way it was resolved.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct PriceBreakdown(pricing::Breakdown);

impl PriceBreakdown {
    /// Converts the provided [`pricing::Rate`] into a [`Rate`] in the
    /// currency of this [`PriceBreakdown`].
    fn rate(&self, rate: pricing::Rate) -> Rate {
        Rate {
            amount: Money {
                amount: rate.amount,
                currency: self.0.currency(),
            },
            source: rate.source.into(),
        }
    }
}

/// Resolved price of a `Booking` along with the way it was resolved.
#[graphql_object(context = Context)]
impl PriceBreakdown {
    /// `PricingType` of the `Program` the price was resolved by.
    #[must_use]
    pub fn pricing_type(&self) -> PricingType {
        self.0.pricing_type.into()
    }

    /// Rate of the whole `Booking`, if the `Program` is priced flat.
    #[must_use]
    pub fn flat_rate(&self) -> Option<Rate> {
        match self.0.rates {
            Rates::Flat { price } => Some(self.rate(price)),
            Rates::PerHead { .. } => None,
        }
    }

    /// Rate of a single adult, if the `Program` is priced per head.
    #[must_use]
    pub fn adult_rate(&self) -> Option<Rate> {
        match self.0.rates {
            Rates::PerHead { adult, .. } => Some(self.rate(adult)),
            Rates::Flat { .. } => None,
        }
    }

    /// Rate of a single child, if the `Program` is priced per head.
    #[must_use]
    pub fn child_rate(&self) -> Option<Rate> {
        match self.0.rates {
            Rates::PerHead { child, .. } => Some(self.rate(child)),
            Rates::Flat { .. } => None,
        }
    }

    /// Total price rounded to the minor units of its currency.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total
    }
}

/// Per-unit amount a `PriceBreakdown` was resolved with.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Rate {
    /// Amount of this `Rate`.
    pub amount: Money,

    /// Source this `Rate` was taken from.
    pub source: RateSource,
}

/// Source a `Rate` was taken from.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum RateSource {
    /// Default price of the `Program`.
    ProgramDefault,

    /// Price negotiated by the `Agent`.
    AgentOverride,

    /// Price is defined nowhere and counts as zero.
    Missing,
}

impl From<pricing::Source> for RateSource {
    fn from(value: pricing::Source) -> Self {
        match value {
            pricing::Source::ProgramDefault => Self::ProgramDefault,
            pricing::Source::AgentOverride => Self::AgentOverride,
            pricing::Source::Missing => Self::Missing,
        }
    }
}
