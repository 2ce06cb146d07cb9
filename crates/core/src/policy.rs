//! Conflict policy toggles and the scheduling settings they live in.
//!
//! The policy is never cached: every conflict check asks the
//! [`SettingsProvider`] again, so an admin flipping a toggle takes effect on
//! the next request. When the settings store cannot be read the check runs
//! with [`ConflictPolicy::default`], which keeps every check enabled.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::time_range::{ClockTime, DayOfWeek};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Switches gating which conflict classes the detector reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictPolicy {
    /// Global kill-switch. When `false` no conflicts are reported at all.
    pub auto_conflict_detection: bool,
    /// When `true` an instructor may teach overlapping sections.
    pub allow_overlapping_classes: bool,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            auto_conflict_detection: true,
            allow_overlapping_classes: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings document
// ---------------------------------------------------------------------------

/// The `scheduling` section of the system settings.
///
/// Only the two policy toggles drive the detector; the remaining fields are
/// stored and served to clients for display and form defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingSettings {
    pub auto_conflict_detection: bool,
    pub allow_overlapping_classes: bool,
    /// Minutes.
    pub max_class_duration: u32,
    /// Minutes.
    pub min_break_between_classes: u32,
    /// Minutes.
    pub default_class_duration: u32,
    pub working_days_start: DayOfWeek,
    pub working_days_end: DayOfWeek,
    pub working_hours_start: ClockTime,
    pub working_hours_end: ClockTime,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        let policy = ConflictPolicy::default();
        Self {
            auto_conflict_detection: policy.auto_conflict_detection,
            allow_overlapping_classes: policy.allow_overlapping_classes,
            max_class_duration: 240,
            min_break_between_classes: 15,
            default_class_duration: 90,
            working_days_start: DayOfWeek::Monday,
            working_days_end: DayOfWeek::Friday,
            working_hours_start: ClockTime::at(8, 0),
            working_hours_end: ClockTime::at(18, 0),
        }
    }
}

impl SchedulingSettings {
    /// The detector-facing subset.
    pub fn policy(&self) -> ConflictPolicy {
        ConflictPolicy {
            auto_conflict_detection: self.auto_conflict_detection,
            allow_overlapping_classes: self.allow_overlapping_classes,
        }
    }

    /// Check internal consistency before persisting an update.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = Vec::new();
        if self.max_class_duration == 0 {
            errors.push("maxClassDuration must be greater than 0".to_string());
        }
        if self.default_class_duration == 0 {
            errors.push("defaultClassDuration must be greater than 0".to_string());
        }
        if self.default_class_duration > self.max_class_duration {
            errors.push("defaultClassDuration must not exceed maxClassDuration".to_string());
        }
        if self.working_hours_start >= self.working_hours_end {
            errors.push("workingHoursStart must be earlier than workingHoursEnd".to_string());
        }
        if self.working_days_start > self.working_days_end {
            errors.push("workingDaysStart must not come after workingDaysEnd".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Provider seam
// ---------------------------------------------------------------------------

/// Narrow read/write interface onto the settings store.
pub trait SettingsProvider: Send + Sync {
    /// Current scheduling settings. Implementations return the defaults when
    /// nothing has been saved yet and an error only when the store itself
    /// failed.
    fn scheduling_settings(
        &self,
    ) -> impl Future<Output = Result<SchedulingSettings, CoreError>> + Send;

    /// Replace the stored scheduling settings.
    fn save_scheduling_settings(
        &self,
        settings: &SchedulingSettings,
    ) -> impl Future<Output = Result<SchedulingSettings, CoreError>> + Send;
}

/// Read the policy fresh, falling back to safe defaults if the store is
/// unavailable. Never fails.
pub async fn load_policy<P: SettingsProvider>(provider: &P) -> ConflictPolicy {
    match provider.scheduling_settings().await {
        Ok(settings) => settings.policy(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                "Settings store unavailable, using default conflict policy"
            );
            ConflictPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_enable_every_check() {
        let policy = SchedulingSettings::default().policy();
        assert!(policy.auto_conflict_detection);
        assert!(!policy.allow_overlapping_classes);
        assert_eq!(policy, ConflictPolicy::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: SchedulingSettings =
            serde_json::from_value(serde_json::json!({ "allowOverlappingClasses": true }))
                .unwrap();
        assert!(settings.allow_overlapping_classes);
        assert!(settings.auto_conflict_detection);
        assert_eq!(settings.max_class_duration, 240);
        assert_eq!(settings.working_hours_start.to_string(), "08:00");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(SchedulingSettings::default()).unwrap();
        assert_eq!(json["autoConflictDetection"], true);
        assert_eq!(json["workingDaysEnd"], "Friday");
        assert_eq!(json["workingHoursEnd"], "18:00");
    }

    #[test]
    fn validate_rejects_inverted_hours() {
        let settings = SchedulingSettings {
            working_hours_start: ClockTime::from_hm(18, 0).unwrap(),
            working_hours_end: ClockTime::from_hm(8, 0).unwrap(),
            ..SchedulingSettings::default()
        };
        assert_matches!(
            settings.validate(),
            Err(CoreError::Validation(msg)) if msg.contains("workingHoursStart")
        );
    }

    #[test]
    fn validate_rejects_zero_duration() {
        let settings = SchedulingSettings {
            max_class_duration: 0,
            ..SchedulingSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    struct Unreachable;

    impl SettingsProvider for Unreachable {
        async fn scheduling_settings(&self) -> Result<SchedulingSettings, CoreError> {
            Err(CoreError::Storage("connection refused".into()))
        }

        async fn save_scheduling_settings(
            &self,
            _settings: &SchedulingSettings,
        ) -> Result<SchedulingSettings, CoreError> {
            Err(CoreError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn unreachable_store_falls_back_to_defaults() {
        assert_eq!(load_policy(&Unreachable).await, ConflictPolicy::default());
    }
}
