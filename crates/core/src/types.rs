/// Cabinet and cassette identifiers are UUIDv7, generated before insertion.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh identifier. UUIDv7 sorts by creation time.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7()
}

/// Current time truncated to microseconds, the precision PostgreSQL keeps,
/// so records read back compare equal to what was written.
pub fn now() -> Timestamp {
    use chrono::SubsecRound;
    chrono::Utc::now().trunc_subsecs(6)
}
