//! Peak-window policy scheduling

use crate::config::ScheduleConfig;
use crate::host::HostRuntime;
use chrono::{DateTime, Local, Timelike};

/// A peak interval by start hour (inclusive) and end hour (exclusive),
/// wrapping past midnight when start > end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowRule {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeWindowRule {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// True when `hour` falls inside the peak window
    pub fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// Which branch of the window the sampled hour landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Peak,
    Normal,
}

/// Node selection for one scheduler invocation. Produced fresh every run;
/// never persisted here (the host runtime owns the group state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub group: String,
    pub node: String,
    pub reason: Reason,
}

/// Pure selection: the same hour and settings always yield the same
/// decision. No memory of the previous run is consulted.
pub fn decide(hour: u32, rule: TimeWindowRule, config: &ScheduleConfig) -> PolicyDecision {
    let reason = if rule.contains(hour) {
        Reason::Peak
    } else {
        Reason::Normal
    };

    let node = match reason {
        Reason::Peak => config.peak_node.clone(),
        Reason::Normal => config.normal_node.clone(),
    };

    PolicyDecision {
        group: config.group.clone(),
        node,
        reason,
    }
}

/// One scheduler invocation: sample the hour once, select the matching node,
/// apply it through the host, and post exactly one notification describing
/// the outcome. A rejected apply is recoverable: the notification still
/// fires with a best-effort failure message.
pub async fn run_schedule<H: HostRuntime>(
    host: &H,
    config: &ScheduleConfig,
    now: DateTime<Local>,
) -> PolicyDecision {
    let hour = now.hour();
    let rule = TimeWindowRule::new(config.peak_start_hour, config.peak_end_hour);
    let decision = decide(hour, rule, config);

    let applied = host
        .set_policy_group_node(&decision.group, &decision.node)
        .await;

    let (title, body) = match decision.reason {
        Reason::Peak => (
            "Peak hours mode",
            format!("Switched to high-performance node [{}]", decision.node),
        ),
        Reason::Normal => (
            "Normal mode",
            format!("Restored to standard node [{}]", decision.node),
        ),
    };
    let subtitle = format!("Current hour: {hour}");

    match applied {
        Ok(()) => host.post_notification(title, &subtitle, &body),
        Err(e) => {
            tracing::warn!("policy selection failed: {e}");
            host.post_notification(title, &subtitle, &format!("Selection failed: {e}"));
        }
    }

    decision
}
