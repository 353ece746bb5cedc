//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{
    query,
    read::{
        assignment::{ForDate, ForGuide},
        booking::list::Period,
    },
    Query as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `ResourceAssignment`s of the provided `Date` ordered by
    /// the `Boat` name.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            gql.name = "resourceAssignments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn resource_assignments(
        date: Date,
        ctx: &Context,
    ) -> Result<Vec<api::ResourceAssignment>, Error> {
        let company_id = ctx.company_id().await?;

        let day = ctx
            .service()
            .execute(query::assignment::OfDay::by(ForDate {
                company_id,
                date: date.coerce(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        let mut assignments = day.iter().cloned().collect::<Vec<_>>();
        assignments.sort_by_cached_key(|a| {
            let name = a.boat.name.to_string();
            (name.to_lowercase(), name, a.boat.id)
        });
        Ok(assignments.into_iter().map(Into::into).collect())
    }

    /// Returns the `GuideDuty` list of the provided `Guide` on the provided
    /// `Date`.
    ///
    /// Empty if the `Guide` is not assigned to any `Boat`.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            gql.name = "guideAssignments",
            guide_id = %guide_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn guide_assignments(
        guide_id: api::resource::GuideId,
        date: Date,
        ctx: &Context,
    ) -> Result<Vec<api::GuideDuty>, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::assignment::OfGuide::by(ForGuide {
                company_id,
                guide_id: guide_id.into(),
                date: date.coerce(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|duties| duties.into_iter().map(Into::into).collect())
    }

    /// Resolves the price of the `Booking` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `MISSING_PRICING_DATA` - the `Program` of the `Booking` is priced
    ///                            per head without any rate defined.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "bookingPrice",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking_price(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::PriceBreakdown, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::BookingPrice {
                company_id,
                booking_id: booking_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns IDs of all the `Booking`s billed by active `Invoice`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "billedBookingIds",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn billed_booking_ids(
        ctx: &Context,
    ) -> Result<Vec<api::booking::Id>, Error> {
        let company_id = ctx.company_id().await?;

        let billed = ctx
            .service()
            .execute(query::settlement::BilledBookings::by(company_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        let mut ids =
            billed.iter().map(api::booking::Id::from).collect::<Vec<_>>();
        ids.sort();
        Ok(ids)
    }

    /// Indicates whether the `Booking` with the provided ID is not billed by
    /// any active `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "isBookingUnbilled",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn is_booking_unbilled(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::IsBookingUnbilled {
                company_id,
                booking_id: booking_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Compiles the `DailyManifest` of the provided `Date`.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            gql.name = "dailyManifest",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn daily_manifest(
        date: Date,
        ctx: &Context,
    ) -> Result<api::DailyManifest, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::DailyManifest {
                company_id,
                date: date.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Compiles the `AgentStatement` of the provided `Agent` within the
    /// provided inclusive period.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - the `from` date goes after the `to` date;
    /// - `AGENT_NOT_EXISTS` - the `Agent` with the provided ID does not
    ///                        exist.
    #[tracing::instrument(
        skip_all,
        fields(
            agent_id = %agent_id,
            from = %from,
            gql.name = "agentStatement",
            otel.name = Self::SPAN_NAME,
            to = %to,
        ),
    )]
    pub async fn agent_statement(
        agent_id: api::agent::Id,
        from: Date,
        to: Date,
        ctx: &Context,
    ) -> Result<api::AgentStatement, Error> {
        let period = period(from, to).map_err(ctx.error())?;
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::AgentStatement {
                company_id,
                agent_id: agent_id.into(),
                period,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Compiles the `Revenue` of the billable `Booking`s within the provided
    /// inclusive period.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - the `from` date goes after the `to` date.
    #[tracing::instrument(
        skip_all,
        fields(
            from = %from,
            gql.name = "revenue",
            otel.name = Self::SPAN_NAME,
            to = %to,
        ),
    )]
    pub async fn revenue(
        from: Date,
        to: Date,
        ctx: &Context,
    ) -> Result<api::Revenue, Error> {
        let period = period(from, to).map_err(ctx.error())?;
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(query::Revenue { company_id, period })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Creates a new [`Period`] out of the provided bounds.
fn period(from: Date, to: Date) -> Result<Period, Error> {
    Period::new(from.coerce(), to.coerce())
        .map_err(|_| api::InputError::InvalidPeriod.into())
}

impl AsError for query::booking_price::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "MISSING_PRICING_DATA"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Program` of the `Booking` is priced per head \
                             without any rate defined"]
                MissingPricingData,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BookingNotExists(_) => {
                Some(BookingError::NotExists.into())
            }
            Self::MissingPricingData(_) => {
                Some(Error::MissingPricingData.into())
            }
        }
    }
}

impl AsError for query::agent_statement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "AGENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Agent` with the provided ID does not exist"]
                NotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AgentNotExists(_) => Some(Error::NotExists.into()),
        }
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID does not exist"]
        NotExists,
    }
}
