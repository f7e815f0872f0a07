use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AssignmentId, IdentityId, NotificationId};

/// Audience of an expiry notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Sent to directory-discovered oversight recipients about someone
    /// else's assignment.
    #[serde(rename = "shift_expiry_oversight")]
    Oversight,
    /// Sent to the assignee.
    #[serde(rename = "shift_expiry")]
    Subject,
}

impl NotificationKind {
    /// Stable tag persisted in the `type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            NotificationKind::Oversight => "shift_expiry_oversight",
            NotificationKind::Subject => "shift_expiry",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "shift_expiry_oversight" => Some(NotificationKind::Oversight),
            "shift_expiry" => Some(NotificationKind::Subject),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Render a window bound the way it is persisted in notification metadata:
/// RFC 3339, millisecond precision, `Z` suffix.
pub fn window_iso(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Metadata attached to every expiry notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMetadata {
    pub assignment_id: AssignmentId,
    pub subject_id: IdentityId,
    pub shift_start_date: Option<String>,
    pub shift_end_date: Option<String>,
}

/// Append-only notification row. Also serves as the duplicate-suppression
/// oracle for later runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: NotificationId,
    #[serde(rename = "to")]
    pub recipient_id: IdentityId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub metadata: NotificationMetadata,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: IdentityId,
    pub kind: NotificationKind,
    pub message: String,
    pub metadata: NotificationMetadata,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn into_record(self, id: NotificationId) -> NotificationRecord {
        NotificationRecord {
            id,
            recipient_id: self.recipient_id,
            kind: self.kind,
            message: self.message,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}

/// Exact-match lookup used to suppress a second notice on the same
/// calendar day. `window_start`/`window_end` compare as optional strings,
/// so a missing bound only matches a missing bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFilter {
    pub recipient_id: IdentityId,
    pub assignment_id: AssignmentId,
    pub kind: NotificationKind,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub created_from: DateTime<Utc>,
    pub created_until: DateTime<Utc>,
}

impl NotificationFilter {
    pub fn matches(&self, record: &NotificationRecord) -> bool {
        record.recipient_id == self.recipient_id
            && record.kind == self.kind
            && record.metadata.assignment_id == self.assignment_id
            && record.metadata.shift_start_date == self.window_start
            && record.metadata.shift_end_date == self.window_end
            && record.created_at >= self.created_from
            && record.created_at <= self.created_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_iso_uses_millis_and_zulu() {
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 17, 30, 0).unwrap();
        assert_eq!(
            window_iso(Some(at)).as_deref(),
            Some("2025-01-05T17:30:00.000Z")
        );
        assert_eq!(window_iso(None), None);
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let record = NotificationRecord {
            id: NotificationId::new(),
            recipient_id: IdentityId::new(),
            kind: NotificationKind::Oversight,
            message: "ends soon".into(),
            metadata: NotificationMetadata {
                assignment_id: AssignmentId::new(),
                subject_id: IdentityId::new(),
                shift_start_date: None,
                shift_end_date: Some("2025-01-05T00:00:00.000Z".into()),
            },
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "shift_expiry_oversight");
        assert!(value.get("to").is_some());
        assert!(value["metadata"]["shiftStartDate"].is_null());
        assert_eq!(value["metadata"]["shiftEndDate"], "2025-01-05T00:00:00.000Z");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn kind_tags_round_trip() {
        for kind in [NotificationKind::Oversight, NotificationKind::Subject] {
            assert_eq!(NotificationKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NotificationKind::from_tag("leave_request"), None);
    }
}
