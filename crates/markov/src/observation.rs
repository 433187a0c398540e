//! Raw and validated station observations.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Optional activity flags reported alongside an observation.
///
/// `None` means the flag was not reported at all; only reported flags take
/// part in activity filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityFlags {
    /// Entity is physically installed.
    pub is_installed: Option<bool>,
    /// Entity accepts removals (rentals).
    pub is_renting: Option<bool>,
    /// Entity accepts returns.
    pub is_returning: Option<bool>,
}

impl ActivityFlags {
    /// Flags with every value reported as `true`.
    pub fn all_active() -> Self {
        Self {
            is_installed: Some(true),
            is_renting: Some(true),
            is_returning: Some(true),
        }
    }

    /// Returns `true` unless one of the reported flags is `false`.
    pub fn is_active(&self) -> bool {
        [self.is_installed, self.is_renting, self.is_returning]
            .into_iter()
            .all(|f| f.unwrap_or(true))
    }
}

/// Which observations take part in learning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityFilter {
    /// Keep only observations whose reported flags are all true.
    #[default]
    RequireActive,
    /// Keep every observation regardless of flags.
    AcceptAll,
}

impl ActivityFilter {
    /// Returns `true` if an observation with `flags` passes the filter.
    pub fn accepts(self, flags: &ActivityFlags) -> bool {
        match self {
            Self::RequireActive => flags.is_active(),
            Self::AcceptAll => true,
        }
    }
}

/// An observation as loaded from a snapshot, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    /// Entity identifier; `None` or blank when missing.
    pub entity_id: Option<String>,
    /// Timestamp text, expected to be ISO-8601.
    pub timestamp: Option<String>,
    /// Available resource count as text.
    pub quantity_a: Option<String>,
    /// Available capacity count as text.
    pub quantity_b: Option<String>,
    /// Activity flags.
    pub flags: ActivityFlags,
}

/// Why a raw observation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Entity id missing or blank.
    MissingEntity,
    /// Timestamp missing or unparseable.
    BadTimestamp,
    /// A quantity is missing, unparseable or NaN.
    BadQuantity,
}

impl RawObservation {
    /// Builds a raw observation from string slices.
    pub fn new(
        entity_id: impl Into<String>,
        timestamp: impl Into<String>,
        quantity_a: impl Into<String>,
        quantity_b: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            timestamp: Some(timestamp.into()),
            quantity_a: Some(quantity_a.into()),
            quantity_b: Some(quantity_b.into()),
            flags: ActivityFlags::default(),
        }
    }

    /// Replaces the activity flags.
    pub fn with_flags(mut self, flags: ActivityFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Validates this row into an [`Observation`].
    ///
    /// Entity and timestamp checks run before the quantity checks, so a row
    /// failing both is reported as an entity/timestamp drop.
    pub fn parse(&self) -> Result<Observation, DropReason> {
        let entity_id = self
            .entity_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(DropReason::MissingEntity)?;
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(DropReason::BadTimestamp)?;
        let quantity_a = self
            .quantity_a
            .as_deref()
            .and_then(parse_quantity)
            .ok_or(DropReason::BadQuantity)?;
        let quantity_b = self
            .quantity_b
            .as_deref()
            .and_then(parse_quantity)
            .ok_or(DropReason::BadQuantity)?;
        Ok(Observation {
            entity_id: entity_id.to_string(),
            timestamp,
            quantity_a,
            quantity_b,
            flags: self.flags,
        })
    }
}

/// A validated observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Non-empty entity identifier.
    pub entity_id: String,
    /// Observation instant in UTC.
    pub timestamp: DateTime<Utc>,
    /// Available resource count.
    pub quantity_a: f64,
    /// Available capacity count.
    pub quantity_b: f64,
    /// Activity flags.
    pub flags: ActivityFlags,
}

/// Naive layouts accepted when the text carries no offset; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Offsets are honoured and converted; text without an offset is taken to
/// already be UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_quantity(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
