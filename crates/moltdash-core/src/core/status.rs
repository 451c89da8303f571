//! Aggregate status snapshot and the widget view derived from it.

use serde::{Deserialize, Serialize};

/// Remaining-comment count below which the comment bar turns to a warning.
pub const COMMENT_WARNING_THRESHOLD: i64 = 10;

/// Status document returned by the dashboard server on each poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatusSnapshot {
    pub running: bool,
    pub uptime_hours: f64,
    pub total_actions: u64,
    pub successful_actions: Option<u64>,
    /// Percentage in `0.0..=100.0`.
    pub success_rate: f64,
    pub last_activity: Option<f64>,
    pub rate_limits: RateLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RateLimits {
    pub reset_date: Option<String>,
    pub comments: CommentLimits,
    pub posts: PostLimits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentLimits {
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub can_comment: Option<bool>,
    pub next_available: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostLimits {
    pub can_post: bool,
    pub next_available: String,
    pub cooldown_minutes: Option<u64>,
    pub last_post: Option<String>,
}

impl Default for PostLimits {
    fn default() -> Self {
        Self {
            can_post: true,
            next_available: "now".to_string(),
            cooldown_minutes: None,
            last_post: None,
        }
    }
}

/// Severity bucket of the comment bar.
///
/// Exactly one tier applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitTier {
    #[default]
    Normal,
    /// `0 < remaining < 10`.
    Warning,
    /// `remaining == 0`.
    Reached,
}

impl RateLimitTier {
    pub fn from_remaining(remaining: i64) -> Self {
        if remaining == 0 {
            RateLimitTier::Reached
        } else if remaining > 0 && remaining < COMMENT_WARNING_THRESHOLD {
            RateLimitTier::Warning
        } else {
            RateLimitTier::Normal
        }
    }

    /// CSS-style class name of the tier (`None` for normal).
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            RateLimitTier::Normal => None,
            RateLimitTier::Warning => Some("limit-warning"),
            RateLimitTier::Reached => Some("limit-reached"),
        }
    }
}

/// Uptime split into whole hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uptime {
    pub hours: u64,
    pub minutes: u64,
}

impl Uptime {
    pub fn from_hours(uptime_hours: f64) -> Self {
        let total_minutes = if uptime_hours.is_finite() && uptime_hours > 0.0 {
            (uptime_hours * 60.0).floor() as u64
        } else {
            0
        };
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl std::fmt::Display for Uptime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Comment rate-limit widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentWidget {
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    /// `used / limit` as a percentage, not clamped.
    pub percent: f64,
    pub tier: RateLimitTier,
    pub next_available: String,
}

impl CommentWidget {
    fn from_limits(limits: &CommentLimits) -> Self {
        Self {
            used: limits.used,
            limit: limits.limit,
            remaining: limits.remaining,
            percent: usage_percent(limits.used, limits.limit),
            tier: RateLimitTier::from_remaining(limits.remaining),
            next_available: limits.next_available.clone(),
        }
    }
}

/// Post rate-limit widget state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWidget {
    /// Set whenever the agent cannot post right now.
    pub warning: bool,
    pub next_available: String,
}

/// Everything the status widgets display, derived from one snapshot.
///
/// A new view replaces the previous one wholesale, so no tier state carries
/// over between polls.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub uptime: Uptime,
    pub total_actions: u64,
    pub successful_actions: Option<u64>,
    pub success_rate: f64,
    /// Seconds since the epoch of the bot's last action.
    pub last_activity: Option<f64>,
    pub comments: CommentWidget,
    pub posts: PostWidget,
    pub running: bool,
}

impl StatusView {
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        let posts = &snapshot.rate_limits.posts;
        Self {
            uptime: Uptime::from_hours(snapshot.uptime_hours),
            total_actions: snapshot.total_actions,
            successful_actions: snapshot.successful_actions,
            success_rate: snapshot.success_rate,
            last_activity: snapshot.last_activity.filter(|t| t.is_finite()),
            comments: CommentWidget::from_limits(&snapshot.rate_limits.comments),
            posts: PostWidget {
                warning: !posts.can_post,
                next_available: posts.next_available.clone(),
            },
            running: snapshot.running,
        }
    }
}

/// `used / limit * 100`; a zero limit reads as 0%.
pub fn usage_percent(used: i64, limit: i64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    used as f64 / limit as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_json(comments: &str, posts: &str) -> String {
        format!(
            r#"{{"running":true,"uptime_hours":2.51,"total_actions":40,"successful_actions":38,"success_rate":95.0,"last_activity":null,"rate_limits":{{"reset_date":"2026-10-18","comments":{comments},"posts":{posts}}}}}"#
        )
    }

    #[test]
    fn test_decode_server_snapshot() {
        let raw = snapshot_json(
            r#"{"used":10,"limit":50,"remaining":40,"can_comment":true,"next_available":"now"}"#,
            r#"{"can_post":false,"cooldown_minutes":30,"last_post":"5m ago","next_available":"26m"}"#,
        );
        let snapshot: StatusSnapshot = serde_json::from_str(&raw).unwrap();

        assert!(snapshot.running);
        assert_eq!(snapshot.total_actions, 40);
        assert_eq!(snapshot.successful_actions, Some(38));
        assert_eq!(snapshot.last_activity, None);
        assert_eq!(snapshot.rate_limits.comments.remaining, 40);
        assert!(!snapshot.rate_limits.posts.can_post);
        assert_eq!(snapshot.rate_limits.posts.next_available, "26m");
    }

    #[test]
    fn test_decode_minimal_snapshot_uses_defaults() {
        let snapshot: StatusSnapshot = serde_json::from_str(r#"{"running":false}"#).unwrap();
        assert_eq!(snapshot.uptime_hours, 0.0);
        assert!(snapshot.rate_limits.posts.can_post);
    }

    #[test]
    fn test_uptime_uses_division_and_remainder() {
        assert_eq!(Uptime::from_hours(2.51), Uptime { hours: 2, minutes: 30 });
        assert_eq!(Uptime::from_hours(0.0), Uptime { hours: 0, minutes: 0 });
        assert_eq!(Uptime::from_hours(25.999), Uptime { hours: 25, minutes: 59 });
        assert_eq!(Uptime::from_hours(1.5).to_string(), "1h 30m");
    }

    #[test]
    fn test_limit_exhausted_is_reached_not_warning() {
        let limits = CommentLimits {
            used: 10,
            limit: 10,
            remaining: 0,
            ..Default::default()
        };
        let widget = CommentWidget::from_limits(&limits);
        assert_eq!(widget.tier, RateLimitTier::Reached);
        assert_eq!(widget.tier.class_name(), Some("limit-reached"));
        assert_eq!(widget.percent, 100.0);
    }

    #[test]
    fn test_five_remaining_is_warning_only() {
        let tier = RateLimitTier::from_remaining(5);
        assert_eq!(tier, RateLimitTier::Warning);
        assert_ne!(tier.class_name(), Some("limit-reached"));
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(RateLimitTier::from_remaining(1), RateLimitTier::Warning);
        assert_eq!(RateLimitTier::from_remaining(9), RateLimitTier::Warning);
        assert_eq!(RateLimitTier::from_remaining(10), RateLimitTier::Normal);
        assert_eq!(RateLimitTier::from_remaining(50), RateLimitTier::Normal);
    }

    #[test]
    fn test_percent_is_not_clamped() {
        assert_eq!(usage_percent(60, 50), 120.0);
        assert_eq!(usage_percent(5, 0), 0.0);
    }

    #[test]
    fn test_post_warning_follows_can_post() {
        let mut snapshot = StatusSnapshot::default();
        snapshot.rate_limits.posts.can_post = false;
        snapshot.rate_limits.comments.remaining = 50;
        let view = StatusView::from_snapshot(&snapshot);
        assert!(view.posts.warning);
        assert_eq!(view.comments.tier, RateLimitTier::Normal);
    }

    #[test]
    fn test_new_view_replaces_previous_tier() {
        let mut snapshot = StatusSnapshot::default();
        snapshot.rate_limits.comments.remaining = 0;
        let reached = StatusView::from_snapshot(&snapshot);
        snapshot.rate_limits.comments.remaining = 4;
        let warning = StatusView::from_snapshot(&snapshot);

        assert_eq!(reached.comments.tier, RateLimitTier::Reached);
        assert_eq!(warning.comments.tier, RateLimitTier::Warning);
    }

    #[test]
    fn test_view_carries_success_count_and_last_activity() {
        let snapshot = StatusSnapshot {
            total_actions: 40,
            successful_actions: Some(38),
            last_activity: Some(1_700_000_000.0),
            ..StatusSnapshot::default()
        };
        let view = StatusView::from_snapshot(&snapshot);
        assert_eq!(view.successful_actions, Some(38));
        assert_eq!(view.last_activity, Some(1_700_000_000.0));

        let broken = StatusSnapshot {
            last_activity: Some(f64::NAN),
            ..StatusSnapshot::default()
        };
        assert_eq!(StatusView::from_snapshot(&broken).last_activity, None);
    }
}
