//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{
    command, query, read::assignment::ForDate, Command as _, Query as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Pairs the provided `Boat` with the provided `Guide` and `Restaurant`
    /// on the provided `Date`.
    ///
    /// Replaces the previous `ResourceAssignment` of the `Boat` on that
    /// `Date`, if any. Omitted `guideId` or `restaurantId` clears the
    /// corresponding pairing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - the `boatId` is not provided, or any of the
    ///                        provided resources does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            boat_id = ?boat_id,
            date = %date,
            gql.name = "setResourceAssignment",
            guide_id = ?guide_id,
            otel.name = Self::SPAN_NAME,
            restaurant_id = ?restaurant_id,
        ),
    )]
    pub async fn set_resource_assignment(
        date: Date,
        boat_id: Option<api::resource::BoatId>,
        guide_id: Option<api::resource::GuideId>,
        restaurant_id: Option<api::resource::RestaurantId>,
        ctx: &Context,
    ) -> Result<api::ResourceAssignment, Error> {
        let company_id = ctx.company_id().await?;

        let assignment = ctx
            .service()
            .execute(command::SetResourceAssignment {
                company_id,
                date: date.coerce(),
                boat_id: boat_id.map(Into::into),
                guide_id: guide_id.map(Into::into),
                restaurant_id: restaurant_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        let day = ctx
            .service()
            .execute(query::assignment::OfDay::by(ForDate {
                company_id,
                date: assignment.activity_date,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        day.get(assignment.boat_id)
            .cloned()
            .map(Into::into)
            .ok_or_else(|| AssignmentError::Disappeared.into())
            .map_err(ctx.error())
    }

    /// Issues a new empty `Invoice` billing the provided `Agent`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AGENT_NOT_EXISTS` - the `Agent` with the provided ID does not
    ///                        exist;
    /// - `INVOICE_NUMBER_USED` - the provided `InvoiceNumber` is used by
    ///                           another `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            agent_id = %agent_id,
            gql.name = "createInvoice",
            number = %number,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_invoice(
        agent_id: api::agent::Id,
        number: api::settlement::Number,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(command::CreateInvoice {
                company_id,
                agent_id: agent_id.into(),
                number: number.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Bills the provided `Booking`s by the provided `Invoice`.
    ///
    /// Either all the `Booking`s are attached, or none of them. `Booking`s
    /// attached to this `Invoice` already are skipped.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - no `Booking`s are provided, or any of them is
    ///                        not billable or is placed by another `Agent`;
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` with the provided ID does not
    ///                          exist;
    /// - `INVOICE_VOIDED` - the `Invoice` is voided;
    /// - `BOOKING_NOT_EXISTS` - any of the `Booking`s does not exist;
    /// - `ALREADY_BILLED` - any of the `Booking`s is billed by another
    ///                      active `Invoice`;
    /// - `MISSING_PRICING_DATA` - price of any of the `Booking`s cannot be
    ///                            resolved.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_ids = ?booking_ids,
            gql.name = "attachBookingsToInvoice",
            invoice_id = %invoice_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn attach_bookings_to_invoice(
        invoice_id: api::settlement::Id,
        booking_ids: Vec<api::booking::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::settlement::InvoiceItem>, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(command::AttachBookingsToInvoice {
                company_id,
                invoice_id: invoice_id.into(),
                booking_ids: booking_ids.into_iter().map(Into::into).collect(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|items| items.into_iter().map(Into::into).collect())
    }

    /// Voids the provided `Invoice`, making its `Booking`s unbilled.
    ///
    /// Voiding a voided `Invoice` changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` with the provided ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "voidInvoice",
            invoice_id = %invoice_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn void_invoice(
        invoice_id: api::settlement::Id,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        let company_id = ctx.company_id().await?;

        ctx.service()
            .execute(command::VoidInvoice {
                company_id,
                invoice_id: invoice_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::set_resource_assignment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`boatId` is required"]
                NoBoat,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`Boat` with the provided ID does not exist"]
                UnknownBoat,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`Guide` with the provided ID does not exist"]
                UnknownGuide,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`Restaurant` with the provided ID does not \
                             exist"]
                UnknownRestaurant,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoBoat => Some(Error::NoBoat.into()),
            Self::UnknownBoat(_) => Some(Error::UnknownBoat.into()),
            Self::UnknownGuide(_) => Some(Error::UnknownGuide.into()),
            Self::UnknownRestaurant(_) => {
                Some(Error::UnknownRestaurant.into())
            }
        }
    }
}

impl AsError for command::create_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "AGENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Agent` with the provided ID does not exist"]
                AgentNotExists,

                #[code = "INVOICE_NUMBER_USED"]
                #[status = CONFLICT]
                #[message = "`InvoiceNumber` is used by another `Invoice`"]
                NumberUsed,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AgentNotExists(_) => Some(Error::AgentNotExists.into()),
            Self::NumberUsed(_) => Some(Error::NumberUsed.into()),
        }
    }
}

impl AsError for command::attach_bookings_to_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_BILLED"]
                #[status = CONFLICT]
                #[message = "`Booking` is billed by another active \
                             `Invoice`"]
                AlreadyBilled,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is not billable"]
                BookingNotBillable,

                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is placed by another `Agent`"]
                BookingOfAnotherAgent,

                #[code = "INVOICE_VOIDED"]
                #[status = CONFLICT]
                #[message = "`Invoice` is voided"]
                InvoiceVoided,

                #[code = "MISSING_PRICING_DATA"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "Price of the `Booking` cannot be resolved"]
                MissingPricingData,

                #[code = "VALIDATION_ERROR"]
                #[status = BAD_REQUEST]
                #[message = "At least one `Booking` must be provided"]
                NoBookings,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AlreadyBilled { .. } => Some(Error::AlreadyBilled.into()),
            Self::BookingNotBillable(_) => {
                Some(Error::BookingNotBillable.into())
            }
            Self::BookingNotExists(_) => Some(Error::BookingNotExists.into()),
            Self::BookingOfAnotherAgent(_) => {
                Some(Error::BookingOfAnotherAgent.into())
            }
            Self::InvoiceNotExists(_) => Some(InvoiceError::NotExists.into()),
            Self::InvoiceVoided(_) => Some(Error::InvoiceVoided.into()),
            Self::MissingPricingData(_) => {
                Some(Error::MissingPricingData.into())
            }
            Self::NoBookings => Some(Error::NoBookings.into()),
        }
    }
}

impl AsError for command::void_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvoiceNotExists(_) => Some(InvoiceError::NotExists.into()),
        }
    }
}

define_error! {
    enum InvoiceError {
        #[code = "INVOICE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Invoice` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum AssignmentError {
        #[code = "ASSIGNMENT_NOT_EXISTS"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "`ResourceAssignment` disappeared after being set"]
        Disappeared,
    }
}
