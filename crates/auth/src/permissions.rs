use serde::{Deserialize, Serialize};

use crate::Role;

/// A guarded action. Each HTTP mutation maps to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateResource,
    UpdateResource,
    DeleteResource,
    ConfirmBooking,
    RejectBooking,
    CancelBooking,
    ViewBooking,
    UpdateBooking,
    DeleteBooking,
    /// Update/delete of a review, bookmark or notification.
    MutateOwnEntity,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::CreateResource,
        Action::UpdateResource,
        Action::DeleteResource,
        Action::ConfirmBooking,
        Action::RejectBooking,
        Action::CancelBooking,
        Action::ViewBooking,
        Action::UpdateBooking,
        Action::DeleteBooking,
        Action::MutateOwnEntity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateResource => "create-resource",
            Action::UpdateResource => "update-resource",
            Action::DeleteResource => "delete-resource",
            Action::ConfirmBooking => "confirm-booking",
            Action::RejectBooking => "reject-booking",
            Action::CancelBooking => "cancel-booking",
            Action::ViewBooking => "view-booking",
            Action::UpdateBooking => "update-booking",
            Action::DeleteBooking => "delete-booking",
            Action::MutateOwnEntity => "mutate-own-entity",
        }
    }

    /// Role the principal must hold before any ownership fact is consulted.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Action::CreateResource
            | Action::UpdateResource
            | Action::DeleteResource
            | Action::ConfirmBooking
            | Action::RejectBooking => Some(Role::Provider),
            Action::CancelBooking
            | Action::ViewBooking
            | Action::UpdateBooking
            | Action::DeleteBooking
            | Action::MutateOwnEntity => None,
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
