//! Background [`Task`]s definitions.

mod background;
pub mod dispatch_manifests;

pub use common::Handler as Task;

pub use self::{
    background::Background, dispatch_manifests::DispatchManifests,
};
