//! Settlement read model definitions.

use std::collections::{HashMap, HashSet};

use crate::domain::{booking, invoice};
#[cfg(doc)]
use crate::domain::{Booking, Invoice};

/// IDs of the [`Booking`]s billed by active [`Invoice`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Billed(HashSet<booking::Id>);

impl Billed {
    /// Indicates whether the provided [`Booking`] is not billed yet.
    #[must_use]
    pub fn is_unbilled(&self, id: booking::Id) -> bool {
        !self.is_billed(id)
    }

    /// Indicates whether the provided [`Booking`] is billed already.
    #[must_use]
    pub fn is_billed(&self, id: booking::Id) -> bool {
        self.0.contains(&id)
    }

    /// Iterates over the IDs of the billed [`Booking`]s in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = booking::Id> + '_ {
        self.0.iter().copied()
    }

    /// Returns the number of the billed [`Booking`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether no [`Booking`] is billed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<booking::Id> for Billed {
    fn from_iter<I: IntoIterator<Item = booking::Id>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Active [`Invoice`]s the requested [`Booking`]s are billed by.
///
/// Unbilled [`Booking`]s have no entry.
#[derive(Clone, Debug, Default)]
pub struct BilledBy(HashMap<booking::Id, invoice::Id>);

impl BilledBy {
    /// Returns the ID of the active [`Invoice`] billing the provided
    /// [`Booking`], if any.
    #[must_use]
    pub fn get(&self, id: booking::Id) -> Option<invoice::Id> {
        self.0.get(&id).copied()
    }
}

impl FromIterator<(booking::Id, invoice::Id)> for BilledBy {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (booking::Id, invoice::Id)>,
    {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::booking;

    use super::Billed;

    #[test]
    fn tells_unbilled() {
        let (billed, unbilled) = (booking::Id::new(), booking::Id::new());
        let set = [billed].into_iter().collect::<Billed>();

        assert!(set.is_billed(billed));
        assert!(!set.is_unbilled(billed));
        assert!(set.is_unbilled(unbilled));
        assert!(Billed::default().is_unbilled(billed));
    }
}
