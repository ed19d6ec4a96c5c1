//! Time and id sources injected into the reconciler.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use uuid::Uuid;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time at millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    pub fn advance(&mut self, by: Duration) {
        self.at += by;
    }

    pub fn set(&mut self, at: DateTime<Utc>) {
        self.at = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Source of new record ids. Uniqueness against the store is checked by the caller.
pub trait IdGenerator {
    fn next_id(&mut self, clock: &dyn Clock) -> String;
}

/// `S` + epoch milliseconds + a random number below 1000.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampIds;

impl IdGenerator for TimestampIds {
    fn next_id(&mut self, clock: &dyn Clock) -> String {
        format!("S{}{}", clock.now().timestamp_millis(), random_suffix())
    }
}

/// Uniform in `0..1000`, drawn from the random leading bits of a v4 uuid.
fn random_suffix() -> u16 {
    loop {
        let bytes = Uuid::new_v4().into_bytes();
        let draw = u16::from_be_bytes([bytes[0], bytes[1]]) >> 6;
        if draw < 1000 {
            return draw;
        }
    }
}

/// `<prefix>1`, `<prefix>2`, ... for deterministic runs.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, _clock: &dyn Clock) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
