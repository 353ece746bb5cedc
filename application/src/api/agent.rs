//! [`Agent`]-related definitions.

use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::Context;

/// Travel [`Agent`] placing bookings on behalf of its customers.
#[derive(Clone, Debug, From, Into)]
pub struct Agent(domain::Agent);

/// Travel `Agent` placing bookings on behalf of its customers.
#[graphql_object(context = Context)]
impl Agent {
    /// Unique identifier of this `Agent`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `Agent`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.name.as_ref()
    }
}

/// Unique identifier of an `Agent`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::agent::Id)]
#[into(domain::agent::Id)]
#[graphql(name = "AgentId", transparent)]
pub struct Id(Uuid);
