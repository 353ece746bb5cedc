use std::{future::IntoFuture as _, io, sync::OnceLock, time};

use application::{Args, Config, XCompanyId};
use axum::extract::MatchedPath;
use axum_client_ip::InsecureClientIp;
use futures::{future, TryFutureExt as _};
use service::{
    infra::{postgres, Postgres, Smtp},
    Service,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(output(io::stdout, false))
        .with(output(io::stderr, true))
        .init();

    _ = start().await;
}

/// Creates a compact [`tracing_subscriber`] layer printing either the
/// `WARN`/`ERROR` events (if `alarming`) or all the others.
fn output<S, W>(
    writer: W,
    alarming: bool,
) -> impl tracing_subscriber::Layer<S> + Send + Sync
where
    S: log::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let level = *meta.level();
            let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || (alarming == (level <= log::Level::WARN) && level <= max)
        }))
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        smtp,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;

    let smtp = Smtp::new(&smtp.into()).map_err(|e| {
        log::error!("failed to initialize `Smtp` mailer: {e}");
    })?;

    let (service, background) = Service::new(service.into(), postgres, smtp);
    if background.is_empty() {
        log::info!("manifest dispatch is disabled");
    }

    let cors = application::cors(&server.cors.origins).map_err(|e| {
        log::error!("{e}");
    })?;

    let app = application::router(service)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    log::info_span!(
                        "HTTP request",
                        http.client_ip =
                            InsecureClientIp::from(r.headers(), r.extensions())
                                .map(|ip| ip.0.to_string())
                                .ok(),
                        http.company_id = r
                            .headers()
                            .get(XCompanyId::NAME)
                            .and_then(|h| h.to_str().ok()),
                        http.flavor = ?r.version(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.status_code = log::field::Empty,
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get(http::header::USER_AGENT)
                            .and_then(|h| h.to_str().ok()),
                    )
                })
                // Server errors are logged as `ERROR`, client ones as `WARN`.
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &log::Span| {
                        let status = r.status();
                        _ = span.record(
                            "http.status_code",
                            log::field::display(status.as_u16()),
                        );

                        let duration = format!("{}ms", dur.as_millis());
                        if status.is_server_error() {
                            log::error!(duration = %duration);
                        } else if status.is_client_error() {
                            log::warn!(duration = %duration);
                        } else {
                            log::info!(duration = %duration);
                        }
                    },
                ),
        );

    let addr = (server.host.clone(), server.port);
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        log::error!(
            "failed to listen on `{}:{}`: {e}",
            server.host,
            server.port,
        );
    })?;
    log::info!("listening on `{}:{}`", server.host, server.port);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for shutdown signal: {e}");
                future::pending::<()>().await;
            }
            log::info!("shutting down");
        })
        .into_future()
        .map_err(|e| log::error!("webserver failed: {e}"));
    // Background tasks run until the server stops, so only their failure
    // matters here.
    let background = background
        .into_future()
        .map_err(|e| log::error!("background task failed: {e}"))
        .and_then(|()| future::pending::<Result<(), ()>>());

    tokio::select! {
        res = server => res,
        res = background => res,
    }
}
