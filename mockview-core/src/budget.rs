//! Wall-clock time budget of a session.
//!
//! Expiry is evaluated lazily whenever a session is touched; nothing sweeps
//! expired sessions in the background.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::session::Session;

/// Time spent since `start`. A clock behind `start` counts as zero.
pub fn elapsed(start: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - start).to_std().unwrap_or(Duration::ZERO)
}

/// True once `now` has reached `start_time + time_limit`
pub fn is_expired(session: &Session, now: DateTime<Utc>) -> bool {
    elapsed(session.start_time(), now) >= session.time_limit()
}

/// Budget left at `now`, never negative
pub fn remaining(session: &Session, now: DateTime<Utc>) -> Duration {
    session
        .time_limit()
        .saturating_sub(elapsed(session.start_time(), now))
}
