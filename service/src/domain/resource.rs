//! [`Resource`] definitions.

use std::{fmt, hash, marker::PhantomData, str::FromStr};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::company;

/// Physical resource of a [`Company`] tours are operated with.
///
/// `Of` describes the [`Kind`] of this [`Resource`].
///
/// [`Company`]: crate::domain::Company
#[derive(Clone, Debug)]
pub struct Resource<Of> {
    /// ID of this [`Resource`].
    pub id: Id<Of>,

    /// ID of the [`Company`] owning this [`Resource`].
    ///
    /// [`Company`]: crate::domain::Company
    pub company_id: company::Id,

    /// [`Name`] of this [`Resource`].
    pub name: Name,
}

/// Kind of a [`Resource`].
pub trait Kind {
    /// Name of the table storing [`Resource`]s of this [`Kind`].
    const TABLE: &'static str;

    /// Human-readable name of this [`Kind`].
    const NAME: &'static str;
}

/// Driver picking customers up from their hotels.
#[derive(Clone, Copy, Debug)]
pub struct Driver;

impl Kind for Driver {
    const TABLE: &'static str = "drivers";
    const NAME: &'static str = "Driver";
}

/// Boat carrying customers during a tour.
#[derive(Clone, Copy, Debug)]
pub struct Boat;

impl Kind for Boat {
    const TABLE: &'static str = "boats";
    const NAME: &'static str = "Boat";
}

/// Guide accompanying customers on a [`Boat`].
#[derive(Clone, Copy, Debug)]
pub struct Guide;

impl Kind for Guide {
    const TABLE: &'static str = "guides";
    const NAME: &'static str = "Guide";
}

/// Restaurant serving meals to customers of a [`Boat`].
#[derive(Clone, Copy, Debug)]
pub struct Restaurant;

impl Kind for Restaurant {
    const TABLE: &'static str = "restaurants";
    const NAME: &'static str = "Restaurant";
}

/// Hotel customers are picked up from.
#[derive(Clone, Copy, Debug)]
pub struct Hotel;

impl Kind for Hotel {
    const TABLE: &'static str = "hotels";
    const NAME: &'static str = "Hotel";
}

/// ID of a [`Resource`].
pub struct Id<Of> {
    /// Inner representation of this [`Id`].
    uuid: Uuid,

    /// Type parameter describing the [`Kind`] of the identified [`Resource`].
    _of: PhantomData<Of>,
}

impl<Of> Id<Of> {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self::from(Uuid::new_v4())
    }
}

impl<Of> Default for Id<Of> {
    fn default() -> Self {
        Self::from(Uuid::default())
    }
}

impl<Of> Copy for Id<Of> {}
impl<Of> Clone for Id<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of> Eq for Id<Of> {}
impl<Of> PartialEq for Id<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<Of> Ord for Id<Of> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uuid.cmp(&other.uuid)
    }
}
impl<Of> PartialOrd for Id<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of> hash::Hash for Id<Of> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<Of> fmt::Debug for Id<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.uuid, f)
    }
}

impl<Of> fmt::Display for Id<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<Of> FromStr for Id<Of> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from)
    }
}

impl<Of> From<Uuid> for Id<Of> {
    fn from(uuid: Uuid) -> Self {
        Self {
            uuid,
            _of: PhantomData,
        }
    }
}

impl<Of> From<Id<Of>> for Uuid {
    fn from(id: Id<Of>) -> Self {
        id.uuid
    }
}

#[cfg(feature = "postgres")]
impl<'a, Of> FromSql<'a> for Id<Of> {
    fn from_sql(
        ty: &postgres_types::Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Uuid::from_sql(ty, raw).map(Self::from)
    }

    fn accepts(ty: &postgres_types::Type) -> bool {
        <Uuid as FromSql<'_>>::accepts(ty)
    }
}

#[cfg(feature = "postgres")]
impl<Of> ToSql for Id<Of> {
    postgres_types::to_sql_checked!();

    fn to_sql(
        &self,
        ty: &postgres_types::Type,
        w: &mut postgres_types::private::BytesMut,
    ) -> Result<
        postgres_types::IsNull,
        Box<dyn std::error::Error + Sync + Send>,
    > {
        self.uuid.to_sql(ty, w)
    }

    fn accepts(ty: &postgres_types::Type) -> bool {
        <Uuid as ToSql>::accepts(ty)
    }
}

/// Name of a [`Resource`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}
