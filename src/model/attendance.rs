use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Stored attendance statuses. Values are the ones the attendance module
/// writes (Indonesian labels for manual entries, clock-in classifications
/// for self-service check-ins).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum AttendanceStatus {
    #[serde(rename = "hadir")]
    #[strum(serialize = "hadir")]
    Present,
    #[serde(rename = "alpha")]
    #[strum(serialize = "alpha")]
    Absent,
    #[serde(rename = "terlambat")]
    #[strum(serialize = "terlambat")]
    Late,
    #[serde(rename = "izin")]
    #[strum(serialize = "izin")]
    Permit,
    #[serde(rename = "sakit")]
    #[strum(serialize = "sakit")]
    Sick,
    #[serde(rename = "cuti")]
    #[strum(serialize = "cuti")]
    OnLeave,
    #[serde(rename = "early_in")]
    #[strum(serialize = "early_in")]
    EarlyIn,
    #[serde(rename = "on_time")]
    #[strum(serialize = "on_time")]
    OnTime,
    #[serde(rename = "late_in")]
    #[strum(serialize = "late_in")]
    LateIn,
}

impl AttendanceStatus {
    /// Whether the day counts towards `present_days`. Only the manual
    /// `hadir` and `terlambat` labels do; clock-in classifications do not.
    pub fn counts_as_present(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub overtime_hours: f64,
}
