//! [`Mailer`]-related implementations.

#[cfg(feature = "smtp")]
pub mod smtp;

use derive_more::{Display, Error as StdError, From};

use crate::domain::company;

#[cfg(feature = "smtp")]
pub use self::smtp::Smtp;

/// Outbound mail operation.
pub use common::Handler as Mailer;

/// Email to be delivered by a [`Mailer`].
#[derive(Clone, Debug)]
pub struct Email {
    /// Sender of this [`Email`].
    pub from: company::Email,

    /// Recipient of this [`Email`].
    pub to: company::Email,

    /// Subject line of this [`Email`].
    pub subject: String,

    /// HTML body of this [`Email`].
    pub html: String,

    /// Files attached to this [`Email`].
    pub attachments: Vec<Attachment>,
}

/// File attached to an [`Email`].
#[derive(Clone, Debug)]
pub struct Attachment {
    /// File name of this [`Attachment`].
    pub name: String,

    /// MIME type of this [`Attachment`].
    pub content_type: &'static str,

    /// Contents of this [`Attachment`].
    pub body: Vec<u8>,
}

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "smtp")]
    /// [`Smtp`] error.
    Smtp(smtp::Error),
}
