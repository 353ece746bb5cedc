//! Domain definitions.

pub mod agent;
pub mod assignment;
pub mod booking;
pub mod company;
pub mod invoice;
pub mod pricing;
pub mod program;
pub mod resource;

pub use self::{
    agent::Agent, assignment::Assignment, booking::Booking, company::Company,
    invoice::Invoice, program::Program, resource::Resource,
};
