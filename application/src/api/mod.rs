//! GraphQL API definitions.

pub mod agent;
pub mod assignment;
pub mod booking;
pub mod manifest;
mod mutation;
pub mod pricing;
pub mod program;
mod query;
pub mod resource;
pub mod scalar;
pub mod settlement;

use crate::{define_error, AsError, Context, Error};

pub use self::{
    agent::Agent,
    assignment::{GuideDuty, ResourceAssignment},
    booking::Booking,
    manifest::DailyManifest,
    mutation::Mutation,
    pricing::PriceBreakdown,
    program::Program,
    query::Query,
    resource::{Boat, Driver, Guide, Hotel, Restaurant},
    settlement::{AgentStatement, Invoice, Revenue},
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<Context>,
>;

/// Converts the provided count into a GraphQL integer.
///
/// # Errors
///
/// If the count doesn't fit into a GraphQL integer.
pub fn count(value: usize) -> Result<i32, Error> {
    i32::try_from(value).map_err(AsError::into_error)
}

define_error! {
    enum InputError {
        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "`from` date goes after `to` date"]
        InvalidPeriod,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "`width` must be positive"]
        InvalidWidth,
    }
}
