//! In-memory [`Database`] implementation for tests.
//!
//! A transaction takes the whole [`State`] exclusively, so concurrent
//! transactions are serialized.

use std::sync::{Arc, Mutex as SyncMutex};

use common::{
    money::Currency,
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Update, Upsert,
    },
    DateTime,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        agent::{self, PricingOverride},
        booking::{
            self, ActivityDate, CustomerName, Passengers, PaymentType, Status,
        },
        company::{self, ManifestDispatch},
        invoice::{self, Item},
        program::{self, PricingType},
        resource::{self, Boat, Driver, Guide, Hotel, Kind, Restaurant},
        Agent, Assignment, Booking, Company, Invoice, Program, Resource,
    },
    infra::{database, Database},
    read::{
        self,
        assignment::{Day, Duty, ForDate, ForGuide},
        booking::list::Selector,
        company::WithOperationsEmail,
        pricing::{ForAgentProgram, Overrides},
        settlement::{Billed, BilledBy},
    },
};

/// In-memory [`Database`] sharing its [`State`] between clones.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new [`Memory`] database holding the provided [`State`].
    pub(crate) fn new(state: State) -> Self {
        Self(NonTx(Arc::new(Mutex::new(state))))
    }

    /// Returns a snapshot of the committed [`State`].
    pub(crate) async fn state(&self) -> State {
        self.0 .0.lock().await.clone()
    }

    /// Commits the provided change of [`State`] outside of any transaction.
    pub(crate) async fn update(&self, change: impl FnOnce(&mut State)) {
        change(&mut *self.0 .0.lock().await);
    }
}

/// Non-transactional access to a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub(crate) struct NonTx(Arc<Mutex<State>>);

/// Transactional access to a [`Memory`] database.
#[derive(Clone, Debug)]
pub(crate) struct Tx(Arc<SyncMutex<Working>>);

/// Uncommitted changes of a [`Tx`].
#[derive(Debug)]
struct Working {
    /// Committed [`State`] locked until the [`Tx`] ends.
    guard: Option<OwnedMutexGuard<State>>,

    /// [`State`] visible inside the [`Tx`].
    state: State,
}

/// Access to the [`State`] of a [`Memory`] database.
pub(crate) trait Access {
    /// Runs the provided function over the accessible [`State`].
    async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R;
}

impl Access for NonTx {
    async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut *self.0.lock().await)
    }
}

impl Access for Tx {
    async fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut working = self.0.lock().expect("not poisoned");
        f(&mut working.state)
    }
}

/// Data stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub(crate) companies: Vec<Company>,
    pub(crate) drivers: Vec<Resource<Driver>>,
    pub(crate) boats: Vec<Resource<Boat>>,
    pub(crate) guides: Vec<Resource<Guide>>,
    pub(crate) restaurants: Vec<Resource<Restaurant>>,
    pub(crate) hotels: Vec<Resource<Hotel>>,
    pub(crate) programs: Vec<Program>,
    pub(crate) agents: Vec<Agent>,
    pub(crate) staff: Vec<agent::Staff>,
    pub(crate) overrides: Vec<PricingOverride>,
    pub(crate) bookings: Vec<Booking>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) invoices: Vec<Invoice>,
    pub(crate) items: Vec<Item>,
    pub(crate) dispatches: Vec<ManifestDispatch>,
}

/// [`Kind`] of [`Resource`]s stored in a [`State`].
pub(crate) trait Stored: Kind + Clone + Sized {
    /// Returns the [`Resource`]s of this [`Kind`].
    fn all(state: &State) -> &Vec<Resource<Self>>;

    /// Returns the mutable [`Resource`]s of this [`Kind`].
    fn all_mut(state: &mut State) -> &mut Vec<Resource<Self>>;
}

macro_rules! impl_stored {
    ($($kind:ty => $field:ident),* $(,)?) => {$(
        impl Stored for $kind {
            fn all(state: &State) -> &Vec<Resource<Self>> {
                &state.$field
            }

            fn all_mut(state: &mut State) -> &mut Vec<Resource<Self>> {
                &mut state.$field
            }
        }
    )*};
}

impl_stored! {
    Driver => drivers,
    Boat => boats,
    Guide => guides,
    Restaurant => restaurants,
    Hotel => hotels,
}

impl State {
    /// Adds a new [`Company`] to this [`State`].
    pub(crate) fn company(&mut self, name: &str) -> company::Id {
        let id = company::Id::new();
        self.companies.push(Company {
            id,
            name: company::Name::new(name).expect("valid name"),
            operations_email: None,
        });
        id
    }

    /// Adds a new [`Resource`] of the `K` [`Kind`] to this [`State`].
    pub(crate) fn resource<K: Stored>(
        &mut self,
        company_id: company::Id,
        name: &str,
    ) -> resource::Id<K> {
        let id = resource::Id::new();
        K::all_mut(self).push(Resource {
            id,
            company_id,
            name: resource::Name::new(name).expect("valid name"),
        });
        id
    }

    /// Adds a new [`Program`] priced with the provided [`PricingType`] to
    /// this [`State`].
    pub(crate) fn program(
        &mut self,
        company_id: company::Id,
        name: &str,
        pricing_type: PricingType,
    ) -> program::Id {
        let id = program::Id::new();
        self.programs.push(Program {
            id,
            company_id,
            name: program::Name::new(name).expect("valid name"),
            pricing_type,
            currency: Currency::Thb,
            base_price: Decimal::from(3000),
            adult_selling_price: Some(Decimal::from(500)),
            child_selling_price: Some(Decimal::from(250)),
        });
        id
    }

    /// Adds a new [`Agent`] to this [`State`].
    pub(crate) fn agent(
        &mut self,
        company_id: company::Id,
        name: &str,
    ) -> agent::Id {
        let id = agent::Id::new();
        self.agents.push(Agent {
            id,
            company_id,
            name: agent::Name::new(name).expect("valid name"),
        });
        id
    }

    /// Adds a new [`Booking`] of the provided [`Program`] to this [`State`].
    ///
    /// The [`Booking`] is confirmed for 2 adults, unless `adjust`ed.
    pub(crate) fn booking(
        &mut self,
        program_id: program::Id,
        customer: &str,
        date: ActivityDate,
        adjust: impl FnOnce(&mut Booking),
    ) -> booking::Id {
        let company_id = self
            .programs
            .iter()
            .find(|p| p.id == program_id)
            .expect("`Program` exists")
            .company_id;

        let mut booking = Booking {
            id: booking::Id::new(),
            company_id,
            program_id,
            agent_id: None,
            agent_staff_id: None,
            hotel_id: None,
            driver_id: None,
            boat_id: None,
            guide_id: None,
            restaurant_id: None,
            customer_name: CustomerName::new(customer).expect("valid name"),
            room_number: None,
            remarks: None,
            passengers: Passengers {
                adults: 2,
                children: 0,
                infants: 0,
            },
            activity_date: date,
            pickup_time: None,
            collect_money: None,
            status: Status::Confirmed,
            payment_type: PaymentType::Credit,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        adjust(&mut booking);

        let id = booking.id;
        self.bookings.push(booking);
        id
    }

    /// Adds a new active [`Invoice`] to this [`State`].
    pub(crate) fn invoice(
        &mut self,
        company_id: company::Id,
        agent_id: agent::Id,
        number: &str,
    ) -> invoice::Id {
        let id = invoice::Id::new();
        self.invoices.push(Invoice {
            id,
            company_id,
            agent_id,
            number: invoice::Number::new(number).expect("valid number"),
            created_at: DateTime::now().coerce(),
            voided_at: None,
        });
        id
    }

    /// Finds a [`Resource`] of the provided [`company::Id`].
    fn find<K: Stored>(
        &self,
        company_id: company::Id,
        id: Option<resource::Id<K>>,
    ) -> Option<Resource<K>> {
        let id = id?;
        K::all(self)
            .iter()
            .find(|r| r.id == id && r.company_id == company_id)
            .cloned()
    }

    /// Resolves the references of the provided [`Booking`].
    ///
    /// [`None`] is returned if its [`Program`] does not exist.
    pub(crate) fn resolve(
        &self,
        booking: &Booking,
    ) -> Option<read::booking::Resolved> {
        let company_id = booking.company_id;
        let program =
            self.programs.iter().find(|p| p.id == booking.program_id)?;
        let agent = booking.agent_id.and_then(|id| {
            self.agents
                .iter()
                .find(|a| a.id == id && a.company_id == company_id)
        });
        let agent_staff = booking.agent_staff_id.and_then(|id| {
            self.staff
                .iter()
                .find(|s| s.id == id && Some(s.agent_id) == booking.agent_id)
        });

        Some(read::booking::Resolved {
            booking: booking.clone(),
            program: program.clone(),
            agent: agent.cloned(),
            agent_staff: agent_staff.cloned(),
            hotel: self.find(company_id, booking.hotel_id),
            driver: self.find(company_id, booking.driver_id),
            boat: self.find(company_id, booking.boat_id),
            guide: self.find(company_id, booking.guide_id),
            restaurant: self.find(company_id, booking.restaurant_id),
        })
    }

    /// Finds an [`Invoice`] by its [`invoice::Id`].
    fn invoice_by_id(&self, id: invoice::Id) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0 .0).lock_owned().await;
        let state = guard.clone();
        Ok(Memory(Tx(Arc::new(SyncMutex::new(Working {
            guard: Some(guard),
            state,
        })))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut working = self.0 .0.lock().expect("not poisoned");
        let mut guard = working.guard.take().expect("not committed yet");
        *guard = working.state.clone();
        Ok(())
    }
}

impl<C, K> Database<Select<By<Option<Resource<K>>, resource::Id<K>>>>
    for Memory<C>
where
    C: Access,
    K: Stored,
{
    type Ok = Option<Resource<K>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Resource<K>>, resource::Id<K>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|s| K::all(s).iter().find(|r| r.id == id).cloned())
            .await)
    }
}

impl<C> Database<Select<By<Option<Agent>, agent::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = Option<Agent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Agent>, agent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|s| s.agents.iter().find(|a| a.id == id).cloned())
            .await)
    }
}

impl<C> Database<Select<By<Vec<Company>, WithOperationsEmail>>> for Memory<C>
where
    C: Access,
{
    type Ok = Vec<Company>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Company>, WithOperationsEmail>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .with(|s| {
                let mut companies = s
                    .companies
                    .iter()
                    .filter(|c| c.operations_email.is_some())
                    .cloned()
                    .collect::<Vec<_>>();
                companies.sort_by_key(|c| c.id);
                companies
            })
            .await)
    }
}

impl<C> Database<Insert<ManifestDispatch>> for Memory<C>
where
    C: Access,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(dispatch): Insert<ManifestDispatch>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .with(|s| {
                let exists = s.dispatches.iter().any(|d| {
                    d.company_id == dispatch.company_id
                        && d.activity_date == dispatch.activity_date
                });
                if !exists {
                    s.dispatches.push(dispatch);
                }
                !exists
            })
            .await)
    }
}

impl<C> Database<Upsert<Assignment>> for Memory<C>
where
    C: Access,
{
    type Ok = Assignment;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Upsert(assignment): Upsert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .0
            .with(|s| {
                let existing = s.assignments.iter().position(|a| {
                    a.company_id == assignment.company_id
                        && a.activity_date == assignment.activity_date
                        && a.boat_id == assignment.boat_id
                });
                match existing {
                    Some(idx) => {
                        let stored = &mut s.assignments[idx];
                        *stored = Assignment {
                            version: stored.version.next(),
                            ..assignment
                        };
                        stored.clone()
                    }
                    None => {
                        s.assignments.push(assignment.clone());
                        assignment
                    }
                }
            })
            .await)
    }
}

impl<C> Database<Select<By<Day, ForDate>>> for Memory<C>
where
    C: Access,
{
    type Ok = Day;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Day, ForDate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForDate { company_id, date } = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.assignments
                    .iter()
                    .filter(|a| {
                        a.company_id == company_id && a.activity_date == date
                    })
                    .filter_map(|a| {
                        Some(read::assignment::Resolved {
                            boat: s.find(company_id, Some(a.boat_id))?,
                            guide: s.find(company_id, a.guide_id),
                            restaurant: s.find(company_id, a.restaurant_id),
                            assignment: a.clone(),
                        })
                    })
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Duty>, ForGuide>>> for Memory<C>
where
    C: Access,
{
    type Ok = Vec<Duty>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Duty>, ForGuide>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForGuide {
            company_id,
            guide_id,
            date,
        } = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                let mut duties = s
                    .assignments
                    .iter()
                    .filter(|a| {
                        a.company_id == company_id
                            && a.activity_date == date
                            && a.guide_id == Some(guide_id)
                    })
                    .filter_map(|a| {
                        Some(Duty {
                            boat: s.find(company_id, Some(a.boat_id))?,
                            restaurant: s.find(company_id, a.restaurant_id),
                        })
                    })
                    .collect::<Vec<_>>();
                duties.sort_by(|a, b| {
                    (&a.boat.name, a.boat.id).cmp(&(&b.boat.name, b.boat.id))
                });
                duties
            })
            .await)
    }
}

impl<C> Database<Select<By<Option<read::booking::Resolved>, booking::Id>>>
    for Memory<C>
where
    C: Access,
{
    type Ok = Option<read::booking::Resolved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::booking::Resolved>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.bookings
                    .iter()
                    .find(|b| b.id == id && b.deleted_at.is_none())
                    .and_then(|b| s.resolve(b))
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<read::booking::Resolved>, Selector>>>
    for Memory<C>
where
    C: Access,
{
    type Ok = Vec<read::booking::Resolved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::booking::Resolved>, Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                let mut bookings = s
                    .bookings
                    .iter()
                    .filter(|b| selector.matches(b))
                    .filter_map(|b| s.resolve(b))
                    .collect::<Vec<_>>();
                bookings.sort_by_key(|r| {
                    (r.booking.activity_date, r.booking.id)
                });
                bookings
            })
            .await)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Select<By<Overrides, company::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = Overrides;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Overrides, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let company_id = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.overrides
                    .iter()
                    .filter(|o| {
                        s.agents.iter().any(|a| {
                            a.id == o.agent_id && a.company_id == company_id
                        })
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Option<PricingOverride>, ForAgentProgram>>>
    for Memory<C>
where
    C: Access,
{
    type Ok = Option<PricingOverride>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PricingOverride>, ForAgentProgram>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ForAgentProgram {
            agent_id,
            program_id,
        } = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.overrides
                    .iter()
                    .find(|o| {
                        o.agent_id == agent_id && o.program_id == program_id
                    })
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Select<By<Option<Invoice>, invoice::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = Option<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Invoice>, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.with(|s| s.invoice_by_id(id).cloned()).await)
    }
}

impl<C> Database<Select<By<Option<Invoice>, (company::Id, invoice::Number)>>>
    for Memory<C>
where
    C: Access,
{
    type Ok = Option<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Invoice>, (company::Id, invoice::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (company_id, number) = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.invoices
                    .iter()
                    .find(|i| i.company_id == company_id && i.number == number)
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Insert<Invoice>> for Memory<C>
where
    C: Access,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.with(|s| s.invoices.push(invoice)).await;
        Ok(())
    }
}

impl<C> Database<Update<Invoice>> for Memory<C>
where
    C: Access,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(invoice): Update<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with(|s| {
                if let Some(existing) =
                    s.invoices.iter_mut().find(|i| i.id == invoice.id)
                {
                    existing.voided_at = invoice.voided_at;
                }
            })
            .await;
        Ok(())
    }
}

impl<C, B> Database<Lock<By<Invoice, B>>> for Memory<C>
where
    C: Access,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Invoice, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Insert<Item>> for Memory<C>
where
    C: Access,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.with(|s| s.items.push(item)).await;
        Ok(())
    }
}

impl<C> Database<Select<By<Vec<Item>, invoice::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = Vec<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Item>, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let invoice_id = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                let mut items = s
                    .items
                    .iter()
                    .filter(|i| i.invoice_id == invoice_id)
                    .cloned()
                    .collect::<Vec<_>>();
                items.sort_by_key(|i| (i.created_at, i.booking_id));
                items
            })
            .await)
    }
}

impl<C> Database<Select<By<Billed, company::Id>>> for Memory<C>
where
    C: Access,
{
    type Ok = Billed;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Billed, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let company_id = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.items
                    .iter()
                    .filter(|i| {
                        s.invoice_by_id(i.invoice_id).is_some_and(|v| {
                            v.company_id == company_id && v.is_active()
                        })
                    })
                    .map(|i| i.booking_id)
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<BilledBy, Vec<booking::Id>>>> for Memory<C>
where
    C: Access,
{
    type Ok = BilledBy;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<BilledBy, Vec<booking::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .0
            .with(|s| {
                s.items
                    .iter()
                    .filter(|i| {
                        ids.contains(&i.booking_id)
                            && s.invoice_by_id(i.invoice_id)
                                .is_some_and(Invoice::is_active)
                    })
                    .map(|i| (i.booking_id, i.invoice_id))
                    .collect()
            })
            .await)
    }
}
