//! Marker types describing the meaning of a date or a date and time.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing the latest modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing the day an activity physically happens on.
#[derive(Clone, Copy, Debug)]
pub struct Activity;

/// Marker type describing an entity voiding.
#[derive(Clone, Copy, Debug)]
pub struct Voiding;
