//! Read entities definitions.

pub mod assignment;
pub mod booking;
pub mod company;
pub mod finance;
pub mod manifest;
pub mod pricing;
pub mod settlement;

pub use self::manifest::Manifest;
