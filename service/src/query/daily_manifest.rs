//! [`DailyManifest`] [`Query`] definition.

use common::operations::{By, Select};
use futures::future;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Company};
use crate::{
    domain::{booking::ActivityDate, company},
    infra::{database, Database},
    read::{
        self,
        assignment::{Day, ForDate},
        booking::list::Selector,
        pricing::Overrides,
        settlement::Billed,
        Manifest,
    },
    Service,
};

use super::Query;

/// [`Query`] compiling the [`Manifest`] of a [`Company`] for a single day.
#[derive(Clone, Copy, Debug)]
pub struct DailyManifest {
    /// ID of the [`Company`] to compile the [`Manifest`] for.
    pub company_id: company::Id,

    /// [`ActivityDate`] to compile the [`Manifest`] for.
    pub date: ActivityDate,
}

impl<Db> Query<DailyManifest> for Service<Db>
where
    Db: Database<
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
        >,
{
    type Ok = Manifest;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DailyManifest { company_id, date }: DailyManifest,
    ) -> Result<Self::Ok, Self::Err> {
        compile(self.database(), company_id, date).await
    }
}

/// Compiles the [`Manifest`] of the provided [`Company`] and day reading
/// everything from the provided [`Database`] concurrently.
///
/// # Errors
///
/// If any of the reads fails.
pub(crate) async fn compile<Db>(
    db: &Db,
    company_id: company::Id,
    date: ActivityDate,
) -> Result<Manifest, Traced<database::Error>>
where
    Db: Database<
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
        >,
{
    let (bookings, day, overrides, billed) = future::try_join4(
        db.execute(Select(By::<Vec<read::booking::Resolved>, _>::new(
            Selector::operational(company_id, date),
        ))),
        db.execute(Select(By::<Day, _>::new(ForDate { company_id, date }))),
        db.execute(Select(By::<Overrides, _>::new(company_id))),
        db.execute(Select(By::<Billed, _>::new(company_id))),
    )
    .await
    .map_err(tracerr::wrap!())?;

    Ok(Manifest::compile(
        company_id,
        date,
        bookings,
        &day,
        &overrides,
        &billed,
    ))
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money};
    use rust_decimal_macros::dec;

    use crate::{
        command::{AttachBookingsToInvoice, SetResourceAssignment},
        domain::{
            booking::{ActivityDate, PickupTime, Status},
            program::PricingType,
            resource::{Boat, Guide, Restaurant},
        },
        infra::database::{memory::State, Memory},
        read::manifest::{export::{escape, Column}, EffectiveAssignment},
        Command as _, Query as _, Service,
    };

    use super::DailyManifest;

    fn date(s: &str) -> ActivityDate {
        Date::parse(s).unwrap().coerce()
    }

    #[tokio::test]
    async fn prefers_boat_assignment_over_booking_guide() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let b1 = state.resource::<Boat>(company, "B1");
        let g1 = state.resource::<Guide>(company, "G1");
        let g2 = state.resource::<Guide>(company, "G2");
        let g3 = state.resource::<Guide>(company, "G3");
        let r1 = state.resource::<Restaurant>(company, "R1");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let day = date("2024-11-02");
        let aboard = state.booking(program, "Aboard", day, |b| {
            b.boat_id = Some(b1);
            b.guide_id = Some(g3);
            b.pickup_time = PickupTime::parse("07:30");
        });
        let walking = state.booking(program, "Walking", day, |b| {
            b.guide_id = Some(g2);
            b.pickup_time = PickupTime::parse("08:00");
        });
        let svc = Service::test(Memory::new(state));
        _ = svc
            .execute(SetResourceAssignment {
                company_id: company,
                date: day,
                boat_id: Some(b1),
                guide_id: Some(g1),
                restaurant_id: Some(r1),
            })
            .await
            .unwrap();

        let manifest = svc
            .execute(DailyManifest {
                company_id: company,
                date: day,
            })
            .await
            .unwrap();

        let rows = manifest.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].booking.booking.id, aboard);
        assert!(matches!(
            rows[0].assignment,
            EffectiveAssignment::Locked { .. },
        ));
        assert_eq!(rows[0].assignment.guide().unwrap().id, g1);
        assert_eq!(rows[0].assignment.restaurant().unwrap().id, r1);
        assert_eq!(rows[1].booking.booking.id, walking);
        assert!(matches!(
            rows[1].assignment,
            EffectiveAssignment::DirectOverride { .. },
        ));
        assert_eq!(rows[1].assignment.guide().unwrap().id, g2);
        assert!(rows[1].assignment.restaurant().is_none());

        let sections = manifest.sections(Column::SECTION, 24);
        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections[0].heading(),
            "Boat: B1 | Guide: G1 | Restaurant: R1",
        );
        assert_eq!(sections[1].heading(), "No boat");
    }

    #[tokio::test]
    async fn orders_equal_pickups_by_customer_name() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let day = date("2024-11-02");
        let at = |time| move |b: &mut crate::domain::Booking| {
            b.pickup_time = PickupTime::parse(time);
        };
        let late = state.booking(program, "Adams", day, at("09:00"));
        let zed = state.booking(program, "Zed", day, at("08:15:40"));
        let baker = state.booking(program, "baker", day, at("08:15"));
        let unknown = state.booking(program, "Aaron", day, |_| {});
        _ = state.booking(program, "Cancelled", day, |b| {
            b.status = Status::Cancelled;
        });
        _ = state.booking(program, "Tomorrow", date("2024-11-03"), |_| {});
        let svc = Service::test(Memory::new(state));

        let manifest = svc
            .execute(DailyManifest {
                company_id: company,
                date: day,
            })
            .await
            .unwrap();

        let ids = manifest
            .rows()
            .iter()
            .map(|r| r.booking.booking.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, [baker, zed, late, unknown]);
    }

    #[tokio::test]
    async fn totals_prices_and_billed_state() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let agent = state.agent(company, "Phuket Travel");
        let flat = state.program(company, "Phi Phi", PricingType::Flat);
        let per_head = state.program(company, "Racha", PricingType::PerHead);
        state.programs[1].adult_selling_price = None;
        state.programs[1].child_selling_price = None;
        let day = date("2024-11-02");
        let billed = state.booking(flat, "Billed", day, |b| {
            b.agent_id = Some(agent);
        });
        _ = state.booking(flat, "Pending", day, |b| {
            b.status = Status::Pending;
            b.collect_money = Some(Money {
                amount: dec!(1500),
                currency: Currency::Thb,
            });
        });
        _ = state.booking(per_head, "Unpriced", day, |_| {});
        let invoice = state.invoice(company, agent, "INV-1");
        let svc = Service::test(Memory::new(state));
        _ = svc
            .execute(AttachBookingsToInvoice {
                company_id: company,
                invoice_id: invoice,
                booking_ids: vec![billed],
            })
            .await
            .unwrap();

        let manifest = svc
            .execute(DailyManifest {
                company_id: company,
                date: day,
            })
            .await
            .unwrap();

        let totals = manifest.totals();
        assert_eq!(totals.bookings, 3);
        assert_eq!(totals.passengers.total(), 6);
        assert_eq!(
            totals.collect_money.get(Currency::Thb).map(|m| m.amount),
            Some(dec!(1500)),
        );
        assert_eq!(totals.unpriced, 1);
        assert_eq!(totals.billed, 1);

        let row = manifest
            .rows()
            .iter()
            .find(|r| r.booking.booking.id == billed)
            .unwrap();
        assert!(row.billed);
        assert_eq!(Column::Price.value(row), "3000THB");
        let unpriced = manifest
            .rows()
            .iter()
            .find(|r| r.price.is_err())
            .unwrap();
        assert_eq!(Column::Price.value(unpriced), "");
    }

    #[tokio::test]
    async fn exports_csv_readable_back() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let program = state.program(company, "Phi Phi", PricingType::Flat);
        let day = date("2024-11-02");
        _ = state.booking(program, "O'Brien, \"Jr.\"", day, |b| {
            b.remarks = crate::domain::booking::Remarks::new("Vegan\nLate");
        });
        let svc = Service::test(Memory::new(state));

        let manifest = svc
            .execute(DailyManifest {
                company_id: company,
                date: day,
            })
            .await
            .unwrap();
        let exported =
            manifest.to_csv(&[Column::CustomerName, Column::Remarks]);
        assert_eq!(
            exported,
            "Customer,Remarks\r\n\"O'Brien, \"\"Jr.\"\"\",\"Vegan\nLate\"\r\n",
        );
        assert!(exported.contains(&*escape("O'Brien, \"Jr.\"")));

        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "O'Brien, \"Jr.\"");
        assert_eq!(&records[0][1], "Vegan\nLate");
    }
}
