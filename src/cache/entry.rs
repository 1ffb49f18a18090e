//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A single cached value together with its absolute expiration time.
///
/// The value is opaque to the cache: it is stored and handed back, never
/// inspected.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Point in time at which the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A zero or negative `ttl` produces an entry that is already expired.
    /// Spans that would overflow the representable range saturate at the
    /// minimum or maximum timestamp.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiration_from(Utc::now(), ttl),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired relative to `now`.
    ///
    /// Boundary condition: the entry is still live at exactly `expires_at`
    /// and expired from the next instant on.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks whether the entry has expired against the current clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

}

// == Utility Functions ==
/// Computes `now + ttl`, saturating instead of overflowing.
pub fn expiration_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
