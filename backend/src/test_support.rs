//! Test utilities for the backend crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and when the `test-support` feature is
//! enabled.

mod cache;
mod document_store;

pub use cache::{CacheEvent, InMemoryCacheTransport, RecordingCacheMetrics};
pub use document_store::InMemoryDocumentStore;

pub mod clock {
    //! Settable clock for services that stamp timestamps.

    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Clock reporting a stored instant until it is moved.
    pub struct SettableClock(Mutex<DateTime<Utc>>);

    impl SettableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Clock fixed at midnight UTC on the given date.
        ///
        /// # Panics
        ///
        /// Panics when the date does not exist.
        pub fn at_midnight(year: i32, month: u32, day: u32) -> Self {
            match Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single() {
                Some(now) => Self::new(now),
                None => panic!("invalid date {year}-{month}-{day}"),
            }
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock() += TimeDelta::seconds(seconds);
        }

        fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Clock for SettableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock()
        }
    }
}
