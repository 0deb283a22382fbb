use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_u64() -> u64 {
    now_i64().max(0) as u64
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn unix_to_rfc3339(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.to_rfc3339())
}

pub fn get_instant() -> Instant {
    Instant::now()
}
