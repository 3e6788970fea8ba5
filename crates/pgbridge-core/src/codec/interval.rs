//! Structured interval values and the shared interval parse cache.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{number_value, ValueCodec};
use crate::catalog::QualifiedName;
use crate::config::DEFAULT_INTERVAL_CACHE_CAPACITY;
use crate::error::{ConversionError, ConversionResult};
use crate::sql::SqlFragment;

/// A time span broken into calendar and clock components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Interval {
    pub seconds: f64,
    pub minutes: i64,
    pub hours: i64,
    pub days: i64,
    pub months: i64,
    pub years: i64,
}

const ZERO_LITERAL: &str = "0 seconds";

impl Interval {
    /// Parse an interval literal.
    ///
    /// Accepts the server's `postgres` output style (`1 year 2 mons 3 days
    /// 04:05:06`), the verbose style (`@ 1 year 2 mons ago`), spelled-out
    /// units, and ISO 8601 durations (`P1Y2M3DT4H5M6S`).
    pub fn parse(literal: &str) -> ConversionResult<Interval> {
        let text = literal.trim();
        let malformed = || ConversionError::MalformedInterval(literal.to_string());
        if text.is_empty() {
            return Err(malformed());
        }
        if let Some(iso) = text.strip_prefix('P') {
            return parse_iso(iso).ok_or_else(malformed);
        }
        parse_postgres(text).ok_or_else(malformed)
    }

    /// Render as a literal of `"<n> <unit>"` tokens for the non-zero components.
    pub fn to_literal(&self) -> String {
        let mut parts = Vec::new();
        for (n, unit) in [
            (self.years, "years"),
            (self.months, "months"),
            (self.days, "days"),
            (self.hours, "hours"),
            (self.minutes, "minutes"),
        ] {
            if n != 0 {
                parts.push(format!("{} {}", n, unit));
            }
        }
        if self.seconds != 0.0 {
            parts.push(format!("{} seconds", self.seconds));
        }
        if parts.is_empty() {
            ZERO_LITERAL.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// The schema representation: an object with every component.
    pub fn to_value(&self) -> ConversionResult<Value> {
        let mut map = Map::new();
        map.insert("seconds".into(), number_value(self.seconds)?);
        map.insert("minutes".into(), self.minutes.into());
        map.insert("hours".into(), self.hours.into());
        map.insert("days".into(), self.days.into());
        map.insert("months".into(), self.months.into());
        map.insert("years".into(), self.years.into());
        Ok(Value::Object(map))
    }

    /// Read the schema representation back. Missing components are zero.
    pub fn from_value(value: &Value) -> ConversionResult<Interval> {
        Interval::deserialize(value).map_err(|_| ConversionError::MalformedInterval(value.to_string()))
    }

    fn negate(self) -> Option<Interval> {
        Some(Interval {
            seconds: -self.seconds,
            minutes: self.minutes.checked_neg()?,
            hours: self.hours.checked_neg()?,
            days: self.days.checked_neg()?,
            months: self.months.checked_neg()?,
            years: self.years.checked_neg()?,
        })
    }

    /// Add `amount` of `unit`. Fails on unknown units, fractional calendar
    /// or clock amounts, and overflow.
    fn add(&mut self, amount: f64, unit: &str) -> Option<()> {
        if !amount.is_finite() {
            return None;
        }
        let (component, scale) = match unit {
            "year" | "years" | "yr" | "yrs" | "y" => (&mut self.years, 1),
            "mon" | "mons" | "month" | "months" => (&mut self.months, 1),
            "week" | "weeks" | "w" => (&mut self.days, 7),
            "day" | "days" | "d" => (&mut self.days, 1),
            "hour" | "hours" | "hr" | "hrs" | "h" => (&mut self.hours, 1),
            "min" | "mins" | "minute" | "minutes" | "m" => (&mut self.minutes, 1),
            "sec" | "secs" | "second" | "seconds" | "s" => return add_seconds(&mut self.seconds, amount),
            "millisecond" | "milliseconds" | "ms" => return add_seconds(&mut self.seconds, amount / 1_000.0),
            "microsecond" | "microseconds" | "us" => {
                return add_seconds(&mut self.seconds, amount / 1_000_000.0)
            }
            _ => return None,
        };
        let amount = whole(amount)?.checked_mul(scale)?;
        *component = component.checked_add(amount)?;
        Some(())
    }

    /// Add a `[-]HH:MM[:SS[.fff]]` clock component.
    fn add_clock(&mut self, token: &str) -> Option<()> {
        let (negative, clock) = match token.as_bytes().first()? {
            b'-' => (true, &token[1..]),
            b'+' => (false, &token[1..]),
            _ => (false, token),
        };
        let mut parts = clock.split(':');
        let hours: i64 = parts.next()?.parse().ok()?;
        let minutes: i64 = parts.next()?.parse().ok()?;
        let seconds: f64 = match parts.next() {
            Some(s) => s.parse().ok()?,
            None => 0.0,
        };
        if parts.next().is_some() || !seconds.is_finite() {
            return None;
        }
        let sign: i64 = if negative { -1 } else { 1 };
        self.hours = self.hours.checked_add(hours.checked_mul(sign)?)?;
        self.minutes = self.minutes.checked_add(minutes.checked_mul(sign)?)?;
        add_seconds(&mut self.seconds, sign as f64 * seconds)
    }
}

/// `amount` as an integer, if it has no fraction and fits in an `i64`.
fn whole(amount: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    if amount.fract() != 0.0 || amount < i64::MIN as f64 || amount >= i64::MAX as f64 {
        return None;
    }
    Some(amount as i64)
}

fn add_seconds(seconds: &mut f64, amount: f64) -> Option<()> {
    let total = *seconds + amount;
    total.is_finite().then(|| *seconds = total)
}

fn parse_postgres(text: &str) -> Option<Interval> {
    let text = text.strip_prefix('@').unwrap_or(text);
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    let ago = tokens.last() == Some(&"ago");
    if ago {
        tokens.pop();
    }

    let mut interval = Interval::default();
    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        if token.contains(':') {
            interval.add_clock(token)?;
            continue;
        }
        let amount: f64 = token.parse().ok()?;
        let unit = tokens.next()?.to_ascii_lowercase();
        interval.add(amount, &unit)?;
    }
    if ago {
        interval.negate()
    } else {
        Some(interval)
    }
}

fn parse_iso(text: &str) -> Option<Interval> {
    let mut interval = Interval::default();
    let mut in_time = false;
    let mut number = String::new();
    for c in text.chars() {
        match c {
            'T' if !in_time && number.is_empty() => in_time = true,
            '0'..='9' | '.' | '-' => number.push(c),
            designator => {
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let unit = match (in_time, designator) {
                    (false, 'Y') => "years",
                    (false, 'M') => "months",
                    (false, 'W') => "weeks",
                    (false, 'D') => "days",
                    (true, 'H') => "hours",
                    (true, 'M') => "minutes",
                    (true, 'S') => "seconds",
                    _ => return None,
                };
                interval.add(amount, unit)?;
            }
        }
    }
    number.is_empty().then_some(interval)
}

/// Bounded, thread-safe cache of parsed interval literals.
///
/// Shared by every request that decodes intervals. Least recently used
/// entries are evicted once the cache is full.
#[derive(Debug)]
pub struct IntervalCache {
    entries: Mutex<LruCache<String, Interval>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for IntervalCache {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_CACHE_CAPACITY)
    }
}

impl IntervalCache {
    /// Create a cache holding up to `capacity` literals (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Parse `literal`, reusing an earlier parse of the same text.
    ///
    /// Malformed literals are not cached.
    pub fn parse(&self, literal: &str) -> ConversionResult<Interval> {
        if let Some(interval) = self.entries.lock().get(literal) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(*interval);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let interval = Interval::parse(literal)?;
        self.entries.lock().put(literal.to_string(), interval);
        Ok(interval)
    }

    /// Number of cached literals.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached literals.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to parse.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Codec for `interval` values.
#[derive(Debug)]
pub struct IntervalCodec {
    ty: QualifiedName,
    cache: Arc<IntervalCache>,
}

impl IntervalCodec {
    pub fn new(ty: QualifiedName, cache: Arc<IntervalCache>) -> Self {
        Self { ty, cache }
    }
}

impl ValueCodec for IntervalCodec {
    fn decode(&self, value: &Value) -> ConversionResult<Value> {
        match value {
            Value::String(literal) => self.cache.parse(literal)?.to_value(),
            Value::Object(_) => Interval::from_value(value)?.to_value(),
            other => Err(ConversionError::shape("an interval", other)),
        }
    }

    fn encode(&self, value: &Value) -> ConversionResult<SqlFragment> {
        let interval = match value {
            Value::String(literal) => self.cache.parse(literal)?,
            Value::Object(_) => Interval::from_value(value)?,
            other => return Err(ConversionError::shape("an interval", other)),
        };
        Ok(SqlFragment::value(interval.to_literal()).cast(self.ty.clone()))
    }
}
