//! Resolution of the price of a [`Booking`].

use common::{money::Currency, Money};
use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::domain::{
    agent::PricingOverride,
    booking::Passengers,
    program::{self, PricingType},
    Booking, Program,
};
#[cfg(doc)]
use crate::domain::Agent;

/// Resolves the price of the provided [`Booking`] of the provided
/// [`Program`].
///
/// The `agent_override` is applied only if it was negotiated by the [`Agent`]
/// of the [`Booking`] for its [`Program`], so direct [`Booking`]s always use
/// the [`Program`] defaults.
///
/// # Errors
///
/// With [`MissingPricingData`] if the [`Program`] is priced per head and
/// neither the adult nor the child rate could be resolved.
pub fn resolve(
    booking: &Booking,
    program: &Program,
    agent_override: Option<&PricingOverride>,
) -> Result<Breakdown, MissingPricingData> {
    let agent_override = agent_override.filter(|o| {
        booking.agent_id == Some(o.agent_id)
            && booking.program_id == o.program_id
            && program.id == o.program_id
    });

    let rates = match program.pricing_type {
        PricingType::Flat => Rates::Flat {
            price: Rate::pick(
                agent_override.and_then(|o| o.agent_price),
                Some(program.base_price),
            ),
        },
        PricingType::PerHead => {
            let adult = Rate::pick(
                agent_override.and_then(|o| o.adult_agent_price),
                program.adult_selling_price,
            );
            let child = Rate::pick(
                agent_override.and_then(|o| o.child_agent_price),
                program.child_selling_price,
            );
            if adult.source == Source::Missing
                && child.source == Source::Missing
            {
                return Err(MissingPricingData {
                    program_id: program.id,
                });
            }
            Rates::PerHead {
                passengers: booking.passengers,
                adult,
                child,
            }
        }
    };

    let total = Money {
        amount: rates.total(),
        currency: program.currency,
    }
    .rounded();

    Ok(Breakdown {
        pricing_type: program.pricing_type,
        rates,
        total,
    })
}

/// Resolved price of a [`Booking`] along with the way it was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Breakdown {
    /// [`PricingType`] of the [`Program`] the price was resolved by.
    pub pricing_type: PricingType,

    /// [`Rates`] the price was resolved with.
    pub rates: Rates,

    /// Resolved total price.
    pub total: Money,
}

impl Breakdown {
    /// Returns the [`Currency`] of this [`Breakdown`].
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.total.currency
    }
}

/// Per-unit rates a [`Breakdown`] was resolved with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rates {
    /// Single price for the whole [`Booking`].
    Flat {
        /// [`Rate`] of the whole [`Booking`].
        price: Rate,
    },

    /// Price per passenger.
    PerHead {
        /// [`Passengers`] the [`Rate`]s are multiplied by.
        passengers: Passengers,

        /// [`Rate`] of a single adult.
        adult: Rate,

        /// [`Rate`] of a single child.
        child: Rate,
    },
}

impl Rates {
    /// Rate of a single infant.
    pub const INFANT: Decimal = Decimal::ZERO;

    /// Calculates the exact total of these [`Rates`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        match self {
            Self::Flat { price } => price.amount,
            Self::PerHead {
                passengers,
                adult,
                child,
            } => {
                adult.amount * Decimal::from(passengers.adults)
                    + child.amount * Decimal::from(passengers.children)
                    + Self::INFANT * Decimal::from(passengers.infants)
            }
        }
    }
}

/// Per-unit amount used in a [`Breakdown`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rate {
    /// Amount of this [`Rate`].
    pub amount: Decimal,

    /// [`Source`] of this [`Rate`].
    pub source: Source,
}

impl Rate {
    /// Picks the `agent` amount if any, or falls back to the `program`
    /// default one.
    fn pick(agent: Option<Decimal>, program: Option<Decimal>) -> Self {
        match (agent, program) {
            (Some(amount), _) => Self {
                amount,
                source: Source::AgentOverride,
            },
            (None, Some(amount)) => Self {
                amount,
                source: Source::ProgramDefault,
            },
            (None, None) => Self {
                amount: Decimal::ZERO,
                source: Source::Missing,
            },
        }
    }
}

/// Source a [`Rate`] was taken from.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Source {
    /// Default price of the [`Program`].
    #[display("program default")]
    ProgramDefault,

    /// Price negotiated by the [`Agent`].
    #[display("agent override")]
    AgentOverride,

    /// Price is defined nowhere and counts as zero.
    #[display("missing")]
    Missing,
}

/// Error of resolving a price of a [`Program`] priced per head without any
/// rate defined.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("`Program(id: {program_id})` has no per-head rates")]
pub struct MissingPricingData {
    /// ID of the [`Program`] missing the rates.
    #[error(not(source))]
    pub program_id: program::Id,
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::domain::{
        agent::{self, PricingOverride},
        booking::{self, CustomerName, Passengers, PaymentType, Status},
        company,
        program::{self, PricingType},
        Booking, Program,
    };

    use super::{resolve, MissingPricingData, Rates, Source};

    fn program(pricing_type: PricingType) -> Program {
        Program {
            id: program::Id::new(),
            company_id: company::Id::new(),
            name: program::Name::new("Phi Phi Islands").unwrap(),
            pricing_type,
            currency: Currency::Thb,
            base_price: dec!(3000),
            adult_selling_price: Some(dec!(500)),
            child_selling_price: Some(dec!(250)),
        }
    }

    fn booking(
        program: &Program,
        agent_id: Option<agent::Id>,
        passengers: Passengers,
    ) -> Booking {
        Booking {
            id: booking::Id::new(),
            company_id: program.company_id,
            program_id: program.id,
            agent_id,
            agent_staff_id: None,
            hotel_id: None,
            driver_id: None,
            boat_id: None,
            guide_id: None,
            restaurant_id: None,
            customer_name: CustomerName::new("John Doe").unwrap(),
            room_number: None,
            remarks: None,
            passengers,
            activity_date: "2024-03-01".parse().unwrap(),
            pickup_time: None,
            collect_money: None,
            status: Status::Confirmed,
            payment_type: PaymentType::Credit,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn passengers(adults: u16, children: u16, infants: u16) -> Passengers {
        Passengers {
            adults,
            children,
            infants,
        }
    }

    fn thb(amount: Decimal) -> Money {
        Money {
            amount,
            currency: Currency::Thb,
        }
    }

    #[test]
    fn flat_uses_override_regardless_of_counts() {
        let program = program(PricingType::Flat);
        let agent_id = agent::Id::new();
        let over = PricingOverride {
            agent_id,
            program_id: program.id,
            agent_price: Some(dec!(2500)),
            adult_agent_price: None,
            child_agent_price: None,
        };

        for counts in [passengers(1, 0, 0), passengers(6, 3, 2)] {
            let booking = booking(&program, Some(agent_id), counts);

            let price = resolve(&booking, &program, Some(&over)).unwrap();
            assert_eq!(price.total, thb(dec!(2500)));
            assert!(matches!(
                price.rates,
                Rates::Flat { price } if price.source == Source::AgentOverride,
            ));

            let price = resolve(&booking, &program, None).unwrap();
            assert_eq!(price.total, thb(dec!(3000)));
        }
    }

    #[test]
    fn per_head_multiplies_rates() {
        let program = program(PricingType::PerHead);
        let booking = booking(&program, None, passengers(2, 1, 3));

        let price = resolve(&booking, &program, None).unwrap();

        assert_eq!(price.total, thb(dec!(1250)));
        assert_eq!(price.pricing_type, PricingType::PerHead);
    }

    #[test]
    fn per_head_override_replaces_only_defined_rates() {
        let program = program(PricingType::PerHead);
        let agent_id = agent::Id::new();
        let over = PricingOverride {
            agent_id,
            program_id: program.id,
            agent_price: None,
            adult_agent_price: Some(dec!(400)),
            child_agent_price: None,
        };
        let booking = booking(&program, Some(agent_id), passengers(2, 2, 0));

        let price = resolve(&booking, &program, Some(&over)).unwrap();

        assert_eq!(price.total, thb(dec!(1300)));
        let Rates::PerHead { adult, child, .. } = price.rates else {
            panic!("expected per-head rates");
        };
        assert_eq!(adult.source, Source::AgentOverride);
        assert_eq!(child.source, Source::ProgramDefault);
    }

    #[test]
    fn ignores_override_of_another_agent_or_direct_booking() {
        let program = program(PricingType::Flat);
        let over = PricingOverride {
            agent_id: agent::Id::new(),
            program_id: program.id,
            agent_price: Some(dec!(1)),
            adult_agent_price: None,
            child_agent_price: None,
        };

        let direct = booking(&program, None, passengers(2, 0, 0));
        let price = resolve(&direct, &program, Some(&over)).unwrap();
        assert_eq!(price.total, thb(dec!(3000)));

        let other =
            booking(&program, Some(agent::Id::new()), passengers(2, 0, 0));
        let price = resolve(&other, &program, Some(&over)).unwrap();
        assert_eq!(price.total, thb(dec!(3000)));
    }

    #[test]
    fn fails_without_any_per_head_rate() {
        let mut program = program(PricingType::PerHead);
        program.adult_selling_price = None;
        program.child_selling_price = None;
        let booking = booking(&program, None, passengers(2, 0, 0));

        assert_eq!(
            resolve(&booking, &program, None),
            Err(MissingPricingData {
                program_id: program.id,
            }),
        );
    }

    #[test]
    fn single_missing_rate_counts_as_zero() {
        let mut program = program(PricingType::PerHead);
        program.child_selling_price = None;
        let booking = booking(&program, None, passengers(2, 2, 0));

        let price = resolve(&booking, &program, None).unwrap();

        assert_eq!(price.total, thb(dec!(1000)));
    }

    #[test]
    fn rounds_total_half_to_even() {
        let mut program = program(PricingType::PerHead);
        program.adult_selling_price = Some(dec!(0.125));
        program.child_selling_price = None;
        let booking = booking(&program, None, passengers(1, 0, 0));

        let price = resolve(&booking, &program, None).unwrap();

        assert_eq!(price.total, thb(dec!(0.12)));
    }
}
