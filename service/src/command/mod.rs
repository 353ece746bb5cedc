//! [`Command`] definition.

pub mod attach_bookings_to_invoice;
pub mod create_invoice;
pub mod set_resource_assignment;
pub mod void_invoice;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    attach_bookings_to_invoice::AttachBookingsToInvoice,
    create_invoice::CreateInvoice,
    set_resource_assignment::SetResourceAssignment, void_invoice::VoidInvoice,
};
