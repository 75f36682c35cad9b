//! Types for common values in Steam responses.

/// Uniquely identifies an application on Steam. For example: 440 for Team Fortress 2.
pub type AppId = u32;
/// The 64-bit ID of a Steam group.
pub type GroupId = u64;
/// The 32-bit account-relative form of a user's Steam ID.
pub type AccountId = u32;
