//! Symbolic in-app destinations.
//!
//! Suggested actions carry a [`Route`] rather than a callback so they can be
//! persisted with the message and resolved again after a reload.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A screen the presentation layer can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Dashboard,
    Maintenance,
    Billing,
    /// Student: own room details. Admin: room allocation.
    Rooms,
}

impl Route {
    /// Resolve to a concrete path inside the role's namespace.
    pub fn path(self, role: Role) -> String {
        let base = role.base_path();
        match (self, role) {
            (Self::Dashboard, _) => base.to_string(),
            (Self::Maintenance, _) => format!("{base}/maintenance"),
            (Self::Billing, _) => format!("{base}/billing"),
            (Self::Rooms, Role::Student) => format!("{base}/room"),
            (Self::Rooms, Role::Admin) => format!("{base}/rooms"),
        }
    }

    /// Reverse lookup used when a path is typed in by hand.
    pub fn from_path(path: &str, role: Role) -> Option<Self> {
        [Self::Dashboard, Self::Maintenance, Self::Billing, Self::Rooms]
            .into_iter()
            .find(|r| r.path(role) == path.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn room_path_differs_by_role() {
        assert_eq!(Route::Rooms.path(Role::Student), "/student-dashboard/room");
        assert_eq!(Route::Rooms.path(Role::Admin), "/admin-dashboard/rooms");
    }

    #[test]
    fn every_route_stays_in_namespace() {
        for role in [Role::Admin, Role::Student] {
            for route in [Route::Dashboard, Route::Maintenance, Route::Billing, Route::Rooms] {
                assert!(route.path(role).starts_with(role.namespace()));
            }
        }
    }

    #[test]
    fn from_path_inverts_path() {
        assert_eq!(
            Route::from_path("/admin-dashboard/billing/", Role::Admin),
            Some(Route::Billing)
        );
        assert_eq!(Route::from_path("/admin-dashboard/room", Role::Admin), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Route::Rooms).unwrap(), "\"rooms\"");
    }
}
