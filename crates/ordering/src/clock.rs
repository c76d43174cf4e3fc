//! Order date assignment.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};

/// Assigns order dates: ISO-8601 UTC timestamps with millisecond precision.
///
/// Dates handed out by one clock are strictly increasing. When the time
/// source has not advanced since the last call, the date is bumped by one
/// millisecond, so two orders of the same user never share a key.
pub struct OrderClock {
    last_millis: AtomicI64,
    source: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl OrderClock {
    /// A clock reading the system time.
    pub fn system() -> Self {
        Self::with_source(Utc::now)
    }

    /// A clock reading the given time source.
    pub fn with_source(source: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            last_millis: AtomicI64::new(i64::MIN),
            source: Box::new(source),
        }
    }

    /// Returns the next order date.
    pub fn next_order_date(&self) -> String {
        let now = (self.source)().timestamp_millis();
        let previous = match self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            }) {
            Ok(previous) | Err(previous) => previous,
        };
        let assigned = now.max(previous.saturating_add(1));

        DateTime::from_timestamp_millis(assigned)
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for OrderClock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for OrderClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderClock")
            .field("last_millis", &self.last_millis.load(Ordering::Relaxed))
            .finish()
    }
}
