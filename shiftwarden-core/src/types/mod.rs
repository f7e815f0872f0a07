//! Domain records shared by the scan, directory and notification layers.

pub mod assignment;
pub mod ids;
pub mod notification;
pub mod recipient;

pub use assignment::{Assignment, AssignmentState};
pub use ids::{AssignmentId, IdentityId, NotificationId};
pub use notification::{
    NewNotification, NotificationFilter, NotificationKind, NotificationMetadata,
    NotificationRecord, window_iso,
};
pub use recipient::OversightRecipient;
