//! SMTP [`Mailer`] implementation.

use common::operations::Deliver;
use derive_more::{Display, Error as StdError, From};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor,
};
use tracerr::Traced;

use crate::infra::mail::{self, Email, Mailer};

/// [`Smtp`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Host of the SMTP relay.
    pub host: String,

    /// Port of the SMTP relay.
    pub port: u16,

    /// User to authenticate as, if any.
    pub user: Option<String>,

    /// Password to authenticate with.
    pub password: Option<String>,

    /// Indicator whether the connection is secured with TLS.
    pub tls: bool,
}

/// [`Mailer`] delivering [`Email`]s through an SMTP relay.
#[derive(Clone, Debug)]
pub struct Smtp(AsyncSmtpTransport<Tokio1Executor>);

impl Smtp {
    /// Creates a new [`Smtp`] [`Mailer`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// Errors if the TLS parameters of the relay cannot be built.
    pub fn new(conf: &Config) -> Result<Self, Traced<mail::Error>> {
        let mut builder = if conf.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&conf.host)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &conf.host,
            )
        }
        .port(conf.port);

        if let Some(user) = &conf.user {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                conf.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self(builder.build()))
    }
}

impl Mailer<Deliver<Email>> for Smtp {
    type Ok = ();
    type Err = Traced<mail::Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        let message =
            message(email).map_err(tracerr::map_from_and_wrap!())?;
        self.0
            .send(message)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
            .map(drop)
    }
}

/// Builds a MIME [`Message`] out of the provided [`Email`].
fn message(email: Email) -> Result<Message, Traced<Error>> {
    let Email {
        from,
        to,
        subject,
        html,
        attachments,
    } = email;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(html));
    for a in attachments {
        let content_type = ContentType::parse(a.content_type)
            .map_err(|_| tracerr::new!(Error::ContentType(a.content_type)))?;
        body = body.singlepart(
            lettre::message::Attachment::new(a.name).body(a.body, content_type),
        );
    }

    Message::builder()
        .from(mailbox(&from)?)
        .to(mailbox(&to)?)
        .subject(subject)
        .multipart(body)
        .map_err(tracerr::from_and_wrap!())
}

/// Parses the provided address into a [`Mailbox`].
fn mailbox(address: &impl AsRef<str>) -> Result<Mailbox, Traced<Error>> {
    address
        .as_ref()
        .parse()
        .map_err(tracerr::from_and_wrap!())
}

/// [`Smtp`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Email address cannot be used as a [`Mailbox`].
    #[display("Invalid email address: {_0}")]
    Address(lettre::address::AddressError),

    /// Attachment content type cannot be parsed.
    #[display("Invalid attachment content type: `{_0}`")]
    #[from(ignore)]
    ContentType(#[error(not(source))] &'static str),

    /// [`Message`] cannot be built.
    #[display("Failed to build email message: {_0}")]
    Message(lettre::error::Error),

    /// SMTP transport failed.
    #[display("SMTP transport failed: {_0}")]
    Transport(lettre::transport::smtp::Error),
}
