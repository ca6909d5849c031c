/// Hard upper bound for any listing `LIMIT`/page size to protect DB and memory usage.
pub const MAX_LISTING_ELEMENTS: i64 = 200;
/// Reported in every response envelope.
pub const API_VERSION: &str = "1.0";
/// Header carrying the caller's API key on write endpoints.
pub const API_KEY_HEADER: &str = "x-apikey";
