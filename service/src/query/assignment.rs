//! [`Query`] collection related to [`Assignment`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{
    domain::{resource::Guide, Assignment},
    Query,
};
use crate::read::assignment::{Day, Duty, ForDate, ForGuide};

use super::DatabaseQuery;

/// Queries all the [`Assignment`]s of a single day.
pub type OfDay = DatabaseQuery<By<Day, ForDate>>;

/// Queries the [`Duty`] list of a [`Guide`] on a single day.
///
/// A [`Guide`] having no [`Assignment`]s that day gets an empty list.
pub type OfGuide = DatabaseQuery<By<Vec<Duty>, ForGuide>>;

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{
        command::SetResourceAssignment,
        domain::{
            booking::ActivityDate,
            resource::{Boat, Guide, Restaurant},
        },
        infra::database::{memory::State, Memory},
        read::assignment::{ForDate, ForGuide},
        Command as _, Query as _, Service,
    };

    use super::{OfDay, OfGuide};

    #[tokio::test]
    async fn lists_duties_of_guide() {
        let mut state = State::default();
        let company = state.company("Andaman Tours");
        let b1 = state.resource::<Boat>(company, "B1");
        let b2 = state.resource::<Boat>(company, "B2");
        let g1 = state.resource::<Guide>(company, "G1");
        let g2 = state.resource::<Guide>(company, "G2");
        let r1 = state.resource::<Restaurant>(company, "R1");
        let svc = Service::test(Memory::new(state));
        let date: ActivityDate = Date::parse("2024-11-02").unwrap().coerce();

        for (boat_id, guide_id, restaurant_id) in
            [(b1, Some(g1), Some(r1)), (b2, Some(g1), None)]
        {
            _ = svc
                .execute(SetResourceAssignment {
                    company_id: company,
                    date,
                    boat_id: Some(boat_id),
                    guide_id,
                    restaurant_id,
                })
                .await
                .unwrap();
        }

        let day = svc
            .execute(OfDay::by(ForDate {
                company_id: company,
                date,
            }))
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
        let locked = day.get(b1).unwrap();
        assert_eq!(locked.guide.as_ref().unwrap().id, g1);
        assert_eq!(locked.restaurant.as_ref().unwrap().id, r1);

        let duties = svc
            .execute(OfGuide::by(ForGuide {
                company_id: company,
                guide_id: g1,
                date,
            }))
            .await
            .unwrap();
        assert_eq!(duties.len(), 2);
        assert_eq!(duties[0].boat.id, b1);
        assert_eq!(duties[0].restaurant.as_ref().unwrap().id, r1);
        assert_eq!(duties[1].boat.id, b2);
        assert!(duties[1].restaurant.is_none());

        let idle = svc
            .execute(OfGuide::by(ForGuide {
                company_id: company,
                guide_id: g2,
                date,
            }))
            .await
            .unwrap();
        assert!(idle.is_empty());
    }
}
