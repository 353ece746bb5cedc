//! Definitions of the resources a `Booking` is served with.

use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain::{self, resource};
use uuid::Uuid;

use crate::Context;

/// Defines a GraphQL object of the provided resource kind along with the
/// scalar of its ID.
macro_rules! define_resource {
    (
        #[doc = $doc:literal]
        $kind:ident,
        #[doc = $id_doc:literal]
        #[graphql(name = $id_name:literal)]
        $id:ident $(,)?
    ) => {
        #[doc = $doc]
        #[derive(Clone, Debug, From, Into)]
        pub struct $kind(domain::Resource<resource::$kind>);

        #[doc = $doc]
        #[graphql_object(context = Context)]
        impl $kind {
            /// Unique identifier of this resource.
            #[must_use]
            pub fn id(&self) -> $id {
                self.0.id.into()
            }

            /// Name of this resource.
            #[must_use]
            pub fn name(&self) -> &str {
                self.0.name.as_ref()
            }
        }

        #[doc = $id_doc]
        #[derive(
            Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into,
            PartialEq,
        )]
        #[from(resource::Id<resource::$kind>)]
        #[into(resource::Id<resource::$kind>)]
        #[graphql(name = $id_name, transparent)]
        pub struct $id(Uuid);
    };
}

define_resource! {
    #[doc = "Boat carrying the customers to the islands."]
    Boat,
    #[doc = "Unique identifier of a `Boat`."]
    #[graphql(name = "BoatId")]
    BoatId,
}

define_resource! {
    #[doc = "Guide accompanying the customers."]
    Guide,
    #[doc = "Unique identifier of a `Guide`."]
    #[graphql(name = "GuideId")]
    GuideId,
}

define_resource! {
    #[doc = "Restaurant serving the customers a meal."]
    Restaurant,
    #[doc = "Unique identifier of a `Restaurant`."]
    #[graphql(name = "RestaurantId")]
    RestaurantId,
}

define_resource! {
    #[doc = "Driver picking the customers up."]
    Driver,
    #[doc = "Unique identifier of a `Driver`."]
    #[graphql(name = "DriverId")]
    DriverId,
}

define_resource! {
    #[doc = "Hotel the customers are picked up from."]
    Hotel,
    #[doc = "Unique identifier of a `Hotel`."]
    #[graphql(name = "HotelId")]
    HotelId,
}
