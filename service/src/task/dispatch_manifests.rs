//! [`DispatchManifests`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use askama::Template;
use common::{
    operations::{
        By, Commit, Deliver, Insert, Perform, Select, Start, Transact,
        Transacted,
    },
    DateTime,
};
use derive_more::{Display, Error as StdError, From};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::ActivityDate,
        company::{self, ManifestDispatch},
        Company,
    },
    infra::{
        database,
        mail::{self, Attachment, Email},
        Database, Mailer,
    },
    query::daily_manifest,
    read::{
        self,
        assignment::{Day, ForDate},
        booking::list::Selector,
        company::WithOperationsEmail,
        manifest::export::{Column, Section},
        pricing::Overrides,
        settlement::Billed,
        Manifest,
    },
    Service,
};

use super::Task;

/// Configuration for [`DispatchManifests`] [`Task`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Interval between dispatch attempts.
    pub interval: time::Duration,

    /// Number of days after today the dispatched [`Manifest`]s are compiled
    /// for.
    pub days_ahead: u16,

    /// Sender of the dispatched [`Manifest`]s.
    pub from: company::Email,
}

/// [`Task`] for emailing the [`Manifest`]s of the upcoming day to the
/// operations [`company::Email`] of every [`Company`].
///
/// Every [`Manifest`] is dispatched at most once per [`Company`] and day.
#[derive(Clone, Debug)]
pub struct DispatchManifests<S, M> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,

    /// [`Mailer`] delivering the [`Manifest`]s.
    mailer: M,
}

impl<Db, M> Task<Start<By<DispatchManifests<Self, M>, (Config, M)>>>
    for Service<Db>
where
    DispatchManifests<Service<Db>, M>:
        Task<Perform<()>, Ok = (), Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<DispatchManifests<Self, M>, (Config, M)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (config, mailer) = by.into_inner();
        let task = DispatchManifests {
            config,
            service: self.clone(),
            mailer,
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::DispatchManifests` failed: {e}");
            });
        }
    }
}

impl<Db, M> Task<Perform<()>> for DispatchManifests<Service<Db>, M>
where
    Db: Database<
        Select<By<Vec<Company>, WithOperationsEmail>>,
        Ok = Vec<Company>,
        Err = Traced<database::Error>,
    >,
    Self: Task<
        Perform<(Company, ActivityDate)>,
        Ok = bool,
        Err = Traced<ExecutionError>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let date = ActivityDate::today()
            .add_days(i64::from(self.config.days_ahead))
            .ok_or(E::DateOutOfRange(self.config.days_ahead))
            .map_err(tracerr::wrap!())?;

        let companies = self
            .service
            .database()
            .execute(Select(By::new(WithOperationsEmail)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for company in companies {
            let id = company.id;
            match self.execute(Perform((company, date))).await {
                Ok(true) => {
                    log::info!(
                        "dispatched manifest of {date} to `Company(id: {id})`",
                    );
                }
                Ok(false) => {
                    log::debug!(
                        "manifest of {date} to `Company(id: {id})` is \
                         dispatched already",
                    );
                }
                Err(e) => {
                    log::error!(
                        "failed to dispatch manifest of {date} to \
                         `Company(id: {id})`: {e}",
                    );
                }
            }
        }
        Ok(())
    }
}

impl<Db, M> Task<Perform<(Company, ActivityDate)>>
    for DispatchManifests<Service<Db>, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<ManifestDispatch>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<read::booking::Resolved>, Selector>>,
            Ok = Vec<read::booking::Resolved>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Day, ForDate>>,
            Ok = Day,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Overrides, company::Id>>,
            Ok = Overrides,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Billed, company::Id>>,
            Ok = Billed,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
    M: Mailer<Deliver<Email>, Ok = (), Err = Traced<mail::Error>>,
{
    /// Indicates whether the [`Manifest`] was dispatched, or it had been
    /// dispatched before.
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Perform((company, date)): Perform<(Company, ActivityDate)>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Some(to) = company.operations_email.clone() else {
            return Ok(false);
        };

        let tx = self
            .service
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let inserted = tx
            .execute(Insert(ManifestDispatch {
                company_id: company.id,
                activity_date: date,
                dispatched_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !inserted {
            return Ok(false);
        }

        let manifest = daily_manifest::compile(&tx, company.id, date)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let email = ManifestEmail {
            company: &company,
            manifest: &manifest,
            width: self.service.config().column_width,
        }
        .into_email(self.config.from.clone(), to)
        .map_err(tracerr::from_and_wrap!(=> E))?;

        self.mailer
            .execute(Deliver(email))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(true)
    }
}

/// HTML body of a dispatched [`Manifest`].
#[derive(Template)]
#[template(path = "manifest.html")]
struct ManifestHtml<'a> {
    /// Name of the [`Company`] the [`Manifest`] is compiled for.
    company: &'a str,

    /// Day the [`Manifest`] is compiled for.
    date: ActivityDate,

    /// Number of bookings in the [`Manifest`].
    bookings: usize,

    /// Number of passengers in the [`Manifest`].
    passengers: u32,

    /// Boat [`Section`]s of the [`Manifest`].
    sections: &'a [Section],
}

/// [`Manifest`] of a [`Company`] to be dispatched as an [`Email`].
struct ManifestEmail<'a> {
    /// [`Company`] the [`Manifest`] is dispatched to.
    company: &'a Company,

    /// Dispatched [`Manifest`].
    manifest: &'a Manifest,

    /// Width of the text cells in the [`Manifest`] [`Section`]s.
    width: usize,
}

impl ManifestEmail<'_> {
    /// Renders this [`ManifestEmail`] into an [`Email`] with the CSV export
    /// of the [`Manifest`] attached.
    fn into_email(
        self,
        from: company::Email,
        to: company::Email,
    ) -> Result<Email, askama::Error> {
        let Self {
            company,
            manifest,
            width,
        } = self;
        let date = manifest.date;
        let totals = manifest.totals();
        let sections = manifest.sections(Column::SECTION, width);

        let html = ManifestHtml {
            company: company.name.as_ref(),
            date,
            bookings: totals.bookings,
            passengers: totals.passengers.total(),
            sections: &sections,
        }
        .render()?;

        Ok(Email {
            from,
            to,
            subject: format!("{}: manifest of {date}", company.name),
            html,
            attachments: vec![Attachment {
                name: format!("manifest-{date}.csv"),
                content_type: "text/csv; charset=utf-8",
                body: manifest.to_csv(Column::ALL).into_bytes(),
            }],
        })
    }
}

/// Error of [`DispatchManifests`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// Dispatched day cannot be represented.
    #[display("Cannot dispatch manifests of {_0} days ahead")]
    #[from(ignore)]
    DateOutOfRange(#[error(not(source))] u16),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mail(mail::Error),

    /// [`Manifest`] cannot be rendered.
    #[display("Failed to render manifest: {_0}")]
    Template(askama::Error),
}

#[cfg(test)]
mod spec {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use common::operations::{Deliver, Perform};
    use tracerr::Traced;

    use crate::{
        domain::{booking::ActivityDate, company, program::PricingType},
        infra::{
            database::{memory::State, Memory},
            mail::{self, Email},
            Mailer,
        },
        Service,
    };

    use super::{Config, DispatchManifests, Task as _};

    /// [`Mailer`] recording the delivered [`Email`]s.
    #[derive(Clone, Debug, Default)]
    struct Outbox(Arc<Mutex<Vec<Email>>>);

    impl Outbox {
        fn sent(&self) -> Vec<Email> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Mailer<Deliver<Email>> for Outbox {
        type Ok = ();
        type Err = Traced<mail::Error>;

        async fn execute(
            &self,
            Deliver(email): Deliver<Email>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.lock().unwrap().push(email);
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            interval: Duration::from_secs(60),
            days_ahead: 1,
            from: company::Email::new("manifest@tours.co.th").unwrap(),
        }
    }

    fn state() -> (State, ActivityDate) {
        let tomorrow = ActivityDate::today().add_days(1).unwrap();
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        state.companies[0].operations_email =
            company::Email::new("ops@andaman-tours.co.th");
        let silent = state.company("Krabi Tours");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let other = state.program(silent, "Hong", PricingType::Flat);
        _ = state.booking(program, "O'Brien", tomorrow, |_| {});
        _ = state.booking(other, "Smith", tomorrow, |_| {});
        (state, tomorrow)
    }

    #[tokio::test]
    async fn dispatches_once_per_day() {
        let (state, tomorrow) = state();
        let outbox = Outbox::default();
        let svc = Service::test(Memory::new(state));
        let task = DispatchManifests {
            config: config(),
            service: svc.clone(),
            mailer: outbox.clone(),
        };

        task.execute(Perform(())).await.unwrap();
        task.execute(Perform(())).await.unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.to.to_string(), "ops@andaman-tours.co.th");
        assert_eq!(email.from.to_string(), "manifest@tours.co.th");
        assert_eq!(
            email.subject,
            format!("Andaman Tours: manifest of {tomorrow}"),
        );
        assert!(email.html.contains("No boat"));
        assert!(email.html.contains("<h1>Andaman Tours</h1>"));
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(
            email.attachments[0].name,
            format!("manifest-{tomorrow}.csv"),
        );
        let csv = String::from_utf8(email.attachments[0].body.clone()).unwrap();
        assert!(csv.contains("O'Brien"));
        assert!(!csv.contains("Smith"));

        let dispatches = svc.database().state().await.dispatches;
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].activity_date, tomorrow);
    }

    #[cfg(feature = "smtp")]
    #[tokio::test]
    async fn retries_after_failed_delivery() {
        use crate::infra::mail::smtp;

        /// [`Mailer`] failing every delivery.
        #[derive(Clone, Copy, Debug)]
        struct Broken;

        impl Mailer<Deliver<Email>> for Broken {
            type Ok = ();
            type Err = Traced<mail::Error>;

            async fn execute(
                &self,
                _: Deliver<Email>,
            ) -> Result<Self::Ok, Self::Err> {
                Err(tracerr::new!(mail::Error::from(
                    smtp::Error::ContentType("text/csv"),
                )))
            }
        }

        let (state, _) = state();
        let svc = Service::test(Memory::new(state));

        let broken = DispatchManifests {
            config: config(),
            service: svc.clone(),
            mailer: Broken,
        };
        broken.execute(Perform(())).await.unwrap();
        assert!(svc.database().state().await.dispatches.is_empty());

        let outbox = Outbox::default();
        let working = DispatchManifests {
            config: config(),
            service: svc.clone(),
            mailer: outbox.clone(),
        };
        working.execute(Perform(())).await.unwrap();
        assert_eq!(outbox.sent().len(), 1);
        assert_eq!(svc.database().state().await.dispatches.len(), 1);
    }
}
