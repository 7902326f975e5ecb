/// Opaque numeric identifier of a work-plan activity.
pub type ActivityId = i64;

/// Opaque numeric identifier of a user known to the identity provider.
pub type UserId = i64;
