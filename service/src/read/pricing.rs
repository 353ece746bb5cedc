//! Pricing read model definitions.

use std::collections::HashMap;

use crate::domain::{
    agent::{self, PricingOverride},
    program, Booking,
};
#[cfg(doc)]
use crate::domain::{Agent, Program};

/// [`PricingOverride`]s keyed by [`Agent`] and [`Program`].
#[derive(Clone, Debug, Default)]
pub struct Overrides(HashMap<(agent::Id, program::Id), PricingOverride>);

impl Overrides {
    /// Returns the [`PricingOverride`] applicable to the provided
    /// [`Booking`], if any.
    #[must_use]
    pub fn for_booking(&self, booking: &Booking) -> Option<&PricingOverride> {
        let agent_id = booking.agent_id?;
        self.0.get(&(agent_id, booking.program_id))
    }
}

impl FromIterator<PricingOverride> for Overrides {
    fn from_iter<I: IntoIterator<Item = PricingOverride>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|o| ((o.agent_id, o.program_id), o))
                .collect(),
        )
    }
}

/// Selector of a single [`PricingOverride`].
#[derive(Clone, Copy, Debug)]
pub struct ForAgentProgram {
    /// ID of the [`Agent`] the [`PricingOverride`] was negotiated by.
    pub agent_id: agent::Id,

    /// ID of the [`Program`] the [`PricingOverride`] is negotiated for.
    pub program_id: program::Id,
}
