//! [`Company`] read model definitions.

#[cfg(doc)]
use crate::domain::{company::Email, Company};

/// Selector of all the [`Company`]s having an operations [`Email`].
#[derive(Clone, Copy, Debug)]
pub struct WithOperationsEmail;
