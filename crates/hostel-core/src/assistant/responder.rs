//! Canned replies and suggested actions.

use crate::chat::SuggestedAction;
use crate::role::Role;
use crate::route::Route;

use super::intent::{AdminTopic, Intent, classify, classify_admin};

/// A generated bot reply, before it becomes a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub actions: Vec<SuggestedAction>,
    /// Recorded with the message and used by chat analytics.
    pub query_type: &'static str,
}

impl Reply {
    fn new(text: impl Into<String>, query_type: &'static str) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
            query_type,
        }
    }

    fn with_action(mut self, label: &str, route: Route) -> Self {
        self.actions.push(SuggestedAction::new(label, route));
        self
    }
}

fn name_suffix(display_name: Option<&str>) -> String {
    match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => format!(" {name}"),
        _ => String::new(),
    }
}

/// Greeting seeded into an empty history.
pub fn greeting(display_name: Option<&str>) -> String {
    format!("Hello{}! How can I help you today?", name_suffix(display_name))
}

/// Reply for a classified intent, with at most one action in the role's namespace.
pub fn reply_for(intent: Intent, role: Role, display_name: Option<&str>) -> Reply {
    let query_type = intent.as_str();
    match (intent, role) {
        (Intent::Maintenance, Role::Student) => Reply::new(
            "I can help you submit a maintenance request. Would you like to do that now?",
            query_type,
        )
        .with_action("Submit Maintenance Request", Route::Maintenance),
        (Intent::Maintenance, Role::Admin) => Reply::new(
            "You can view and manage all maintenance requests in the Maintenance section.",
            query_type,
        )
        .with_action("View Maintenance Requests", Route::Maintenance),
        (Intent::Billing, Role::Student) => Reply::new(
            "You can view your bills and make payments in the Billing section.",
            query_type,
        )
        .with_action("Go to Billing", Route::Billing),
        (Intent::Billing, Role::Admin) => Reply::new(
            "You can manage student bills and view payment history in the Billing Management section.",
            query_type,
        )
        .with_action("Manage Bills", Route::Billing),
        (Intent::Room, Role::Student) => Reply::new(
            "You can view your room details and make room-related requests in the Room Management section.",
            query_type,
        )
        .with_action("View Room Details", Route::Rooms),
        (Intent::Room, Role::Admin) => Reply::new(
            "You can manage room allocations and view room status in the Room Allocation section.",
            query_type,
        )
        .with_action("Manage Rooms", Route::Rooms),
        (Intent::Dashboard, _) => Reply::new("I can help you navigate to the dashboard.", query_type)
            .with_action("Go to Dashboard", Route::Dashboard),
        (Intent::Greeting, _) => Reply::new(
            format!(
                "Hello{}! How can I assist you today? You can ask me about maintenance requests, billing, or room management.",
                name_suffix(display_name)
            ),
            query_type,
        ),
        (Intent::Other, _) => Reply::new(
            "I'm not sure about that. You can ask me about maintenance requests, billing, room management, or try navigating to the dashboard.",
            query_type,
        )
        .with_action("Go to Dashboard", Route::Dashboard),
    }
}

fn admin_reply(topic: AdminTopic) -> Reply {
    let text = match topic {
        AdminTopic::Students => {
            "You can manage students in the Students section. Would you like to see student statistics?"
        }
        AdminTopic::Maintenance => {
            "You can view and manage maintenance requests in the Maintenance section. Need to see pending requests?"
        }
        AdminTopic::General => "How can I assist you with hostel management today?",
    };
    Reply::new(text, topic.as_str())
}

/// The reply the chat session sends back.
///
/// Students go through the full intent table. Admins get the shorter
/// two-branch rule, which offers no actions.
pub fn respond(text: &str, role: Role, display_name: Option<&str>) -> Reply {
    match role {
        Role::Student => reply_for(classify(text), role, display_name),
        Role::Admin => admin_reply(classify_admin(text)),
    }
}

/// Quick replies offered under the input box.
pub fn suggested_replies(role: Role) -> Vec<SuggestedAction> {
    let mut replies = vec![SuggestedAction::new("Go to Dashboard", Route::Dashboard)];
    match role {
        Role::Student => replies.extend([
            SuggestedAction::new("Submit Maintenance Request", Route::Maintenance),
            SuggestedAction::new("View Room Details", Route::Rooms),
            SuggestedAction::new("Check Bills", Route::Billing),
        ]),
        Role::Admin => replies.extend([
            SuggestedAction::new("View Maintenance Requests", Route::Maintenance),
            SuggestedAction::new("Manage Rooms", Route::Rooms),
            SuggestedAction::new("Manage Bills", Route::Billing),
        ]),
    }
    replies
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Role; 2] = [Role::Admin, Role::Student];

    #[test]
    fn every_intent_role_pair_has_text_and_namespaced_action() {
        for role in ROLES {
            for intent in Intent::ALL {
                let reply = reply_for(intent, role, None);
                assert!(!reply.text.is_empty(), "{intent} / {role}");
                assert!(reply.actions.len() <= 1, "{intent} / {role}");
                for action in &reply.actions {
                    assert!(action.route.path(role).starts_with(role.namespace()));
                }
            }
        }
    }

    #[test]
    fn student_room_allocation_question() {
        let reply = respond("Can I check my room allocation?", Role::Student, Some("Asha"));
        assert!(reply.text.contains("view your room details"));
        assert_eq!(reply.actions.len(), 1);
        assert_eq!(reply.actions[0].label, "View Room Details");
        assert_eq!(
            reply.actions[0].route.path(Role::Student),
            "/student-dashboard/room"
        );
        assert_eq!(reply.query_type, "room");
    }

    #[test]
    fn greeting_has_no_action_and_uses_name() {
        let reply = reply_for(Intent::Greeting, Role::Student, Some("Asha"));
        assert!(reply.text.starts_with("Hello Asha!"));
        assert!(reply.actions.is_empty());

        let anonymous = reply_for(Intent::Greeting, Role::Student, Some("  "));
        assert!(anonymous.text.starts_with("Hello!"));
    }

    #[test]
    fn admin_uses_two_branch_rule_without_actions() {
        let reply = respond("how many students are there", Role::Admin, None);
        assert!(reply.text.contains("Students section"));
        assert!(reply.actions.is_empty());
        assert_eq!(reply.query_type, "students");

        let reply = respond("maintenance backlog", Role::Admin, None);
        assert!(reply.text.contains("pending requests"));

        let reply = respond("show me the bills", Role::Admin, None);
        assert_eq!(reply.text, "How can I assist you with hostel management today?");
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn unknown_offers_dashboard() {
        let reply = respond("quantum flux", Role::Student, None);
        assert_eq!(reply.actions[0].route, Route::Dashboard);
        assert_eq!(reply.query_type, "other");
    }

    #[test]
    fn suggested_replies_start_with_dashboard() {
        for role in ROLES {
            let replies = suggested_replies(role);
            assert_eq!(replies.len(), 4);
            assert_eq!(replies[0].route, Route::Dashboard);
        }
    }

    #[test]
    fn greeting_seed_text() {
        assert_eq!(greeting(None), "Hello! How can I help you today?");
        assert_eq!(greeting(Some("Ravi")), "Hello Ravi! How can I help you today?");
    }
}
