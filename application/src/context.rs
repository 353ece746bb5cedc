//! [`Context`]-related definitions.

use std::{
    iter,
    sync::atomic::{self, AtomicU16},
};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{headers, TypedHeader};
use http::{HeaderName, HeaderValue};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::domain::company;
use tokio::sync::OnceCell;
use uuid::Uuid;

#[cfg(doc)]
use service::domain::Company;

use crate::{define_error, AsError as _, Error, GraphQlResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// ID of the [`Company`] the current request is made on behalf of.
    company_id: OnceCell<company::Id>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns ID of the [`Company`] the current request is made on behalf
    /// of.
    ///
    /// The ID is read from the [`XCompanyId`] header set by the upstream
    /// identity layer.
    ///
    /// # Errors
    ///
    /// Errors if the [`XCompanyId`] header is missing or malformed.
    pub async fn company_id(&self) -> Result<company::Id, Error> {
        self.company_id
            .get_or_try_init(|| async {
                let res = self
                    .parts
                    .clone()
                    .extract::<TypedHeader<XCompanyId>>()
                    .await;
                match res {
                    Ok(TypedHeader(XCompanyId(id))) => Ok(id.into()),
                    Err(e) if e.is_missing() => {
                        Err(CompanyError::Required.into())
                    }
                    Err(e) => Err(e.into_error()),
                }
                .map_err(self.error())
            })
            .await
            .copied()
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = GraphQlResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                GraphQlResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            company_id: OnceCell::new(),
        })
    }
}

/// `X-Company-Id` HTTP header carrying ID of the [`Company`] a request is
/// made on behalf of.
#[derive(Clone, Copy, Debug)]
pub struct XCompanyId(pub Uuid);

impl XCompanyId {
    /// [`HeaderName`] of the [`XCompanyId`] header.
    pub const NAME: HeaderName = HeaderName::from_static("x-company-id");
}

impl headers::Header for XCompanyId {
    fn name() -> &'static HeaderName {
        static NAME: HeaderName = XCompanyId::NAME;
        &NAME
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(Self)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(iter::once(value));
        }
    }
}

define_error! {
    enum CompanyError {
        #[code = "COMPANY_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "`X-Company-Id` header is required"]
        Required,
    }
}
