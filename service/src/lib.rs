//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
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

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error;

use common::operations::{By, Start};
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::{Database, Mailer};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Width the text cells of the exported manifests are truncated to.
    #[default(24)]
    pub column_width: usize,

    /// [`task::DispatchManifests`] configuration.
    ///
    /// [`None`] disables the [`task::DispatchManifests`].
    pub dispatch: Option<task::dispatch_manifests::Config>,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// The [`Mailer`] is used by the background [`Task`]s only, which are
    /// started once the returned [`task::Background`] is awaited.
    pub fn new<M>(
        config: Config,
        database: Db,
        mailer: M,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::DispatchManifests<Self, M>,
                        (task::dispatch_manifests::Config, M),
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
        M: 'static,
    {
        let this = Service { config, database };

        let mut bg = task::Background::default();
        if let Some(dispatch) = this.config.dispatch.clone() {
            let svc = this.clone();
            bg.spawn(async move {
                svc.execute(Start(By::new((dispatch, mailer)))).await
            });
        }

        (this, bg)
    }

    /// Creates a new [`Service`] with the default [`Config`] and no
    /// background [`Task`]s.
    #[cfg(test)]
    pub(crate) fn test(database: Db) -> Self {
        Self {
            config: Config::default(),
            database,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
