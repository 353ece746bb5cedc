//! [`Assignment`] read model definitions.

use std::collections::HashMap;

use crate::domain::{
    booking::ActivityDate,
    company,
    resource::{self, Boat, Guide, Restaurant},
    Assignment, Resource,
};
#[cfg(doc)]
use crate::domain::Company;

/// [`Assignment`] with its [`Resource`]s resolved.
#[derive(Clone, Debug)]
pub struct Resolved {
    /// Resolved [`Assignment`] itself.
    pub assignment: Assignment,

    /// Assigned [`Boat`].
    pub boat: Resource<Boat>,

    /// [`Guide`] the [`Boat`] is paired with, if any.
    pub guide: Option<Resource<Guide>>,

    /// [`Restaurant`] the [`Boat`] is paired with, if any.
    pub restaurant: Option<Resource<Restaurant>>,
}

/// All the [`Resolved`] [`Assignment`]s of a single day keyed by [`Boat`].
///
/// [`Boat`]s without an [`Assignment`] have no entry.
#[derive(Clone, Debug, Default)]
pub struct Day(HashMap<resource::Id<Boat>, Resolved>);

impl Day {
    /// Returns the [`Resolved`] [`Assignment`] of the provided [`Boat`], if
    /// any.
    #[must_use]
    pub fn get(&self, boat_id: resource::Id<Boat>) -> Option<&Resolved> {
        self.0.get(&boat_id)
    }

    /// Iterates over the [`Resolved`] [`Assignment`]s of this [`Day`] in no
    /// particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Resolved> + '_ {
        self.0.values()
    }

    /// Returns the number of [`Assignment`]s in this [`Day`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this [`Day`] has no [`Assignment`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Resolved> for Day {
    fn from_iter<I: IntoIterator<Item = Resolved>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|r| (r.assignment.boat_id, r))
                .collect(),
        )
    }
}

/// Selector of a [`Day`] of a [`Company`].
#[derive(Clone, Copy, Debug)]
pub struct ForDate {
    /// ID of the [`Company`] the [`Assignment`]s belong to.
    pub company_id: company::Id,

    /// [`ActivityDate`] of the [`Assignment`]s.
    pub date: ActivityDate,
}

/// Work of a [`Guide`] on a single [`Boat`] during a day.
#[derive(Clone, Debug)]
pub struct Duty {
    /// [`Boat`] the [`Guide`] is assigned to.
    pub boat: Resource<Boat>,

    /// [`Restaurant`] the [`Boat`] is paired with, if any.
    pub restaurant: Option<Resource<Restaurant>>,
}

/// Selector of the [`Duty`] list of a [`Guide`].
#[derive(Clone, Copy, Debug)]
pub struct ForGuide {
    /// ID of the [`Company`] the [`Guide`] works for.
    pub company_id: company::Id,

    /// ID of the [`Guide`].
    pub guide_id: resource::Id<Guide>,

    /// [`ActivityDate`] of the [`Duty`] list.
    pub date: ActivityDate,
}
