//! In-app notifications derived from booking events.

pub mod notification;

pub use notification::{Notification, NotificationKind, mark_all_read};
