//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Extension, Json, Router,
};
use derive_more::{Debug, Display};
use http::{header::InvalidHeaderValue, HeaderValue, Method};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::extract::JuniperRequest;
use tower_http::cors::{AllowOrigin, CorsLayer};
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, XCompanyId},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Path the GraphQL API is served on.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Builds the [`Router`] serving the GraphQL API of the provided [`Service`].
pub fn router(service: Service) -> Router {
    let schema = api::Schema::new(
        api::Query,
        api::Mutation,
        juniper::EmptySubscription::new(),
    );

    Router::new()
        .route(
            GRAPHQL_PATH,
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
}

/// Builds the [`CorsLayer`] admitting GraphQL requests from the provided
/// `origins`. A `*` origin admits any.
///
/// # Errors
///
/// If any of the `origins` is not a valid header value.
pub fn cors(origins: &[String]) -> Result<CorsLayer, InvalidOrigin> {
    let parsed = origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|source| InvalidOrigin {
                origin: origin.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let allowed = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE, XCompanyId::NAME])
        .allow_origin(allowed))
}

/// Error of an origin not allowed by [`cors()`] to be configured.
#[derive(Debug, Display, derive_more::Error)]
#[display("`{origin}` is not a valid CORS origin: {source}")]
pub struct InvalidOrigin {
    /// Configured origin.
    #[error(not(source))]
    pub origin: String,

    /// Reason of the origin being invalid.
    pub source: InvalidHeaderValue,
}

/// [`juniper`] GraphQL response carrying the status of the failed request.
#[derive(Debug)]
pub struct GraphQlResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response, if it contains errors.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for GraphQlResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        let status = if response.is_ok() {
            http::StatusCode::OK
        } else {
            status_code
        };
        (status, Json(response)).into_response()
    }
}

/// GraphQL API handler.
///
/// Every request is executed in a fresh [`Context`] bound to the
/// `X-Company-Id` header of the request.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(request): JuniperRequest,
) -> GraphQlResponse {
    let response = request.execute(&*schema, &context).await;
    GraphQlResponse {
        status_code: context.error_status_code(),
        response,
    }
}

#[cfg(test)]
mod spec {
    use super::cors;

    #[test]
    fn accepts_listed_and_wildcard_origins() {
        let listed = ["https://ops.andaman.tours".to_owned()];
        assert!(cors(&listed).is_ok());

        let any = ["*".to_owned()];
        assert!(cors(&any).is_ok());
    }

    #[test]
    fn names_invalid_origin() {
        let origins = [
            "https://ops.andaman.tours".to_owned(),
            "https://bad\norigin".to_owned(),
        ];

        let err = cors(&origins).unwrap_err();

        assert_eq!(err.origin, "https://bad\norigin");
        assert!(err.to_string().contains("is not a valid CORS origin"));
    }
}
