//! Financial settlement definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, read, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// [`Invoice`] billing `Booking`s of an `Agent`.
#[derive(Clone, Debug, From, Into)]
pub struct Invoice(domain::Invoice);

/// Invoice billing `Booking`s of an `Agent`.
#[graphql_object(context = Context)]
impl Invoice {
    /// Unique identifier of this `Invoice`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Number of this `Invoice`, unique within the company.
    #[must_use]
    pub fn number(&self) -> Number {
        self.0.number.clone().into()
    }

    /// ID of the `Agent` billed by this `Invoice`.
    #[must_use]
    pub fn agent_id(&self) -> api::agent::Id {
        self.0.agent_id.into()
    }

    /// Indicator whether this `Invoice` is not voided.
    ///
    /// Only the items of active `Invoice`s make their `Booking`s billed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.is_active()
    }

    /// `DateTime` when this `Invoice` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Invoice` was voided, if it was.
    #[must_use]
    pub fn voided_at(&self) -> Option<DateTime> {
        self.0.voided_at.map(|at| at.coerce())
    }

    /// Items of this `Invoice`, one per billed `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.items",
            id = %self.0.id,
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn items(
        &self,
        ctx: &Context,
    ) -> Result<Vec<InvoiceItem>, Error> {
        ctx.service()
            .execute(query::settlement::InvoiceItems::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|items| items.into_iter().map(Into::into).collect())
    }
}

/// Unique identifier of an `Invoice`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::invoice::Id)]
#[into(domain::invoice::Id)]
#[graphql(name = "InvoiceId", transparent)]
pub struct Id(Uuid);

/// Number of an `Invoice` as printed on it.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "InvoiceNumber",
    with = scalar::Via::<domain::invoice::Number>,
)]
pub struct Number(domain::invoice::Number);

/// Item of an [`Invoice`] billing a single `Booking`.
#[derive(Clone, Debug, From, Into)]
pub struct InvoiceItem(domain::invoice::Item);

/// Item of an `Invoice` billing a single `Booking`.
#[graphql_object(context = Context)]
impl InvoiceItem {
    /// ID of the `Invoice` this `InvoiceItem` belongs to.
    #[must_use]
    pub fn invoice_id(&self) -> Id {
        self.0.invoice_id.into()
    }

    /// ID of the billed `Booking`.
    #[must_use]
    pub fn booking_id(&self) -> api::booking::Id {
        self.0.booking_id.into()
    }

    /// Price of the `Booking` at the moment it was billed.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// `DateTime` when the `Booking` was billed.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Statement of the billable `Booking`s of an `Agent` within a period.
#[derive(Clone, Debug, From, Into)]
pub struct AgentStatement(read::finance::Statement);

/// Statement of the billable `Booking`s of an `Agent` within a period.
#[graphql_object(context = Context)]
impl AgentStatement {
    /// ID of the `Agent` this `AgentStatement` is about.
    #[must_use]
    pub fn agent_id(&self) -> api::agent::Id {
        self.0.agent_id.into()
    }

    /// First `Date` of the period.
    #[graphql(name = "from")]
    #[must_use]
    pub fn from_date(&self) -> Date {
        self.0.period.from().coerce()
    }

    /// Last `Date` of the period.
    #[graphql(name = "to")]
    #[must_use]
    pub fn to_date(&self) -> Date {
        self.0.period.to().coerce()
    }

    /// Lines of this `AgentStatement` ordered by activity date and customer
    /// name.
    #[must_use]
    pub fn lines(&self) -> Vec<StatementLine> {
        self.0.lines.iter().cloned().map(Into::into).collect()
    }

    /// Sum of the prices of the billed `Booking`s, per currency.
    #[must_use]
    pub fn billed(&self) -> Vec<Money> {
        self.0.totals().billed.iter().collect()
    }

    /// Sum of the prices of the `Booking`s not billed yet, per currency.
    #[must_use]
    pub fn unbilled(&self) -> Vec<Money> {
        self.0.totals().unbilled.iter().collect()
    }

    /// Number of `Booking`s without a resolvable price.
    pub fn unpriced(&self) -> Result<i32, Error> {
        api::count(self.0.totals().unpriced)
    }
}

/// Single `Booking` of an [`AgentStatement`].
#[derive(Clone, Debug, From, Into)]
pub struct StatementLine(read::finance::Line);

/// Single `Booking` of an `AgentStatement`.
#[graphql_object(context = Context)]
impl StatementLine {
    /// `Booking` of this `StatementLine`.
    #[must_use]
    pub fn booking(&self) -> api::Booking {
        self.0.booking.clone().into()
    }

    /// Resolved price of the `Booking`.
    ///
    /// `null` if the `Program` lacks the pricing data.
    #[must_use]
    pub fn price(&self) -> Option<api::PriceBreakdown> {
        self.0.price.ok().map(Into::into)
    }

    /// Indicator whether the `Booking` is billed by an active `Invoice`.
    #[must_use]
    pub fn billed(&self) -> bool {
        self.0.billed
    }
}

/// Revenue of the billable `Booking`s within a period, per `Program`.
#[derive(Clone, Debug, From, Into)]
pub struct Revenue(read::finance::Revenue);

/// Revenue of the billable `Booking`s within a period, per `Program`.
#[graphql_object(context = Context)]
impl Revenue {
    /// First `Date` of the period.
    #[graphql(name = "from")]
    #[must_use]
    pub fn from_date(&self) -> Date {
        self.0.period.from().coerce()
    }

    /// Last `Date` of the period.
    #[graphql(name = "to")]
    #[must_use]
    pub fn to_date(&self) -> Date {
        self.0.period.to().coerce()
    }

    /// Revenue of every `Program` having billable `Booking`s, ordered by its
    /// name.
    #[must_use]
    pub fn programs(&self) -> Vec<ProgramRevenue> {
        self.0.programs.iter().cloned().map(Into::into).collect()
    }

    /// Sum of the revenue of all the `Program`s, per currency.
    #[must_use]
    pub fn total(&self) -> Vec<Money> {
        self.0.total().iter().collect()
    }
}

/// [`Revenue`] of a single `Program`.
#[derive(Clone, Debug, From, Into)]
pub struct ProgramRevenue(read::finance::ProgramRevenue);

/// `Revenue` of a single `Program`.
#[graphql_object(context = Context)]
impl ProgramRevenue {
    /// `Program` this `ProgramRevenue` is about.
    #[must_use]
    pub fn program(&self) -> api::Program {
        self.0.program.clone().into()
    }

    /// Number of billable `Booking`s.
    pub fn bookings(&self) -> Result<i32, Error> {
        api::count(self.0.bookings)
    }

    /// Number of adults of the billable `Booking`s.
    #[must_use]
    pub fn adults(&self) -> i32 {
        self.0.passengers.adults.into()
    }

    /// Number of children of the billable `Booking`s.
    #[must_use]
    pub fn children(&self) -> i32 {
        self.0.passengers.children.into()
    }

    /// Number of infants of the billable `Booking`s.
    #[must_use]
    pub fn infants(&self) -> i32 {
        self.0.passengers.infants.into()
    }

    /// Sum of the resolved prices, per currency.
    #[must_use]
    pub fn revenue(&self) -> Vec<Money> {
        self.0.revenue.iter().collect()
    }

    /// Number of `Booking`s without a resolvable price, not summed up in the
    /// `revenue`.
    pub fn unpriced(&self) -> Result<i32, Error> {
        api::count(self.0.unpriced)
    }
}
