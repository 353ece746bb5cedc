//! [`Company`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking::ActivityDate;

/// Tour operator owning all the other entities.
///
/// Resolving the [`Company`] of a request is the duty of the caller.
#[derive(Clone, Debug)]
pub struct Company {
    /// ID of this [`Company`].
    pub id: Id,

    /// [`Name`] of this [`Company`].
    pub name: Name,

    /// [`Email`] the daily manifest of this [`Company`] is sent to, if any.
    pub operations_email: Option<Email>,
}

/// ID of a [`Company`].
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

/// Name of a [`Company`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
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

/// Email address of a [`Company`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        /// Loose shape of an email address, the mail server has the final
        /// word.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        let address = address.into();
        (address.len() <= 320 && REGEX.is_match(&address))
            .then_some(Self(address))
    }
}

/// Record of the daily manifest of a [`Company`] sent to its operations
/// [`Email`].
///
/// Exists at most once per [`Company`] and [`ActivityDate`].
#[derive(Clone, Copy, Debug)]
pub struct ManifestDispatch {
    /// ID of the [`Company`] the manifest was sent to.
    pub company_id: Id,

    /// [`ActivityDate`] of the sent manifest.
    pub activity_date: ActivityDate,

    /// [`DateTime`] when the manifest was sent.
    pub dispatched_at: DispatchDateTime,
}

/// [`DateTime`] when a [`ManifestDispatch`] happened.
pub type DispatchDateTime = DateTimeOf<(ManifestDispatch, unit::Creation)>;
