use std::time::Duration;

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownStatus {
    pub eligible: bool,
    pub remaining_secs: u64,
}

impl CooldownStatus {
    /// `(hours, minutes)` left, for display.
    pub fn remaining_hm(&self) -> (u64, u64) {
        (self.remaining_secs / 3600, (self.remaining_secs % 3600) / 60)
    }
}

/// Human form of a claim period: `"24 hours"`, `"90 minutes"`, `"45 seconds"`.
pub fn describe_period(period: Duration) -> String {
    let secs = period.as_secs();
    let plural = |n: u64, unit: &str| if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") };
    if secs > 0 && secs % 3600 == 0 {
        plural(secs / 3600, "hour")
    } else if secs > 0 && secs % 60 == 0 {
        plural(secs / 60, "minute")
    } else {
        plural(secs, "second")
    }
}

/// Whole seconds are compared; a claim timestamp in the future counts as zero elapsed.
pub fn status(last_claim: Option<DateTime<Utc>>, cooldown: Duration, now: DateTime<Utc>) -> CooldownStatus {
    let Some(last) = last_claim else {
        return CooldownStatus {
            eligible: true,
            remaining_secs: 0,
        };
    };

    let elapsed = u64::try_from((now - last).num_seconds()).unwrap_or(0);
    let cooldown = cooldown.as_secs();
    CooldownStatus {
        eligible: elapsed >= cooldown,
        remaining_secs: cooldown.saturating_sub(elapsed),
    }
}
