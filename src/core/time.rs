use time::OffsetDateTime;

/// UTC now truncated to whole seconds, so stored timestamps round-trip
/// through RFC 3339 without nanosecond noise.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
