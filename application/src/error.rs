//! [`Error`]-related definitions.

use std::{fmt, num::TryFromIntError};

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use juniper::IntoFieldError;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] representing an internal server error.
    ///
    /// The provided `msg` is logged rather than exposed to the client.
    #[must_use]
    pub fn internal(msg: &impl fmt::Display) -> Self {
        log::error!("internal server error: {msg}");
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".into(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        for frame in self.backtrace.iter().flat_map(|t| t.iter()) {
            write!(f, "\n{frame}")?;
        }
        Ok(())
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let Self {
            code,
            status_code,
            backtrace,
            message,
        } = self;

        let mut ext = juniper::Object::with_capacity(3);
        let fields = [
            ("code", juniper::Value::scalar(code.to_owned())),
            (
                "status",
                juniper::Value::scalar(status_code.as_u16().to_string()),
            ),
            (
                "backtrace",
                juniper::Value::list(
                    backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        ];
        for (name, value) in fields {
            drop(ext.add_field(name, value));
        }
        juniper::FieldError::new(message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`] meaningful to the client.
    ///
    /// [`None`] means an internal failure.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`], falling back to
    /// [`Error::internal()`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|e| Error {
            backtrace: Some(self.trace().clone()),
            ..e
        })
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        log::warn!("store is unavailable: {self}");
        Some(Error {
            code: "STORE_UNAVAILABLE",
            status_code: http::StatusCode::SERVICE_UNAVAILABLE,
            message: "Store is unavailable".into(),
            backtrace: None,
        })
    }
}

impl AsError for TryFromIntError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, IntoFieldError as _};

    use super::{AsError as _, Error};

    crate::define_error! {
        enum SampleError {
            #[code = "ALREADY_BILLED"]
            #[status = CONFLICT]
            #[message = "`Booking` is billed already"]
            AlreadyBilled,
        }
    }

    #[test]
    fn defines_error_with_code_and_status() {
        let err = Error::from(SampleError::AlreadyBilled);

        assert_eq!(err.code, "ALREADY_BILLED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "[ALREADY_BILLED]: `Booking` is billed already",
        );
    }

    #[test]
    fn hides_internal_details() {
        let err = i32::try_from(u64::MAX).unwrap_err().into_error();

        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn exposes_code_and_status_in_extensions() {
        let field: juniper::FieldError<DefaultScalarValue> =
            Error::from(SampleError::AlreadyBilled).into_field_error();

        assert_eq!(field.message(), "`Booking` is billed already");
        let ext = field.extensions().as_object_value().unwrap();
        assert_eq!(
            ext.get_field_value("code").and_then(|v| v.as_string_value()),
            Some("ALREADY_BILLED"),
        );
        assert_eq!(
            ext.get_field_value("status").and_then(|v| v.as_string_value()),
            Some("409"),
        );
    }
}
