//! Signed-in identity passed explicitly to every service.

use hostel_core::Role;
use hostel_core::records::Profile;
use hostel_store::remote::RestQuery;
use hostel_store::{AuthClient, RecordStore, RemoteBackend, RemoteConfig, SharedStore, Table};
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};

/// The caller's profile and bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: Profile,
    pub access_token: String,
}

impl AuthSession {
    pub const fn new(user: Profile, access_token: String) -> Self {
        Self { user, access_token }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub const fn role(&self) -> Role {
        self.user.role
    }

    /// Name used in greetings, if the profile has one.
    pub fn display_name(&self) -> Option<&str> {
        Some(self.user.name.trim()).filter(|n| !n.is_empty())
    }

    /// Refuse callers outside `role`'s namespace.
    pub fn require(&self, role: Role) -> ServiceResult<()> {
        Ok(self.user.role.require(role)?)
    }
}

/// Decode a profile row, rejecting roles other than admin and student.
pub fn profile_from_row(row: serde_json::Value) -> ServiceResult<Profile> {
    let role = row
        .get("role")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ServiceError::forbidden("User role not found"))?;
    if role.parse::<Role>().is_err() {
        return Err(ServiceError::forbidden(format!("Invalid role: {role}")));
    }
    serde_json::from_value(row).map_err(|e| hostel_core::Error::from(e).into())
}

async fn fetch_profile(backend: &RemoteBackend, user_id: &str) -> ServiceResult<Profile> {
    let row: Option<serde_json::Value> = backend
        .select_one(RestQuery::new(Table::Profiles).eq("id", user_id))
        .await?;
    let row = row.ok_or_else(|| ServiceError::NotFound(format!("Profile {user_id}")))?;
    profile_from_row(row)
}

/// Password sign-in against the hosted backend.
///
/// Returns the session and a backend acting as the signed-in user.
pub async fn sign_in_remote(
    config: &RemoteConfig,
    email: &str,
    password: &str,
) -> ServiceResult<(AuthSession, RemoteBackend)> {
    let tokens = AuthClient::new(config)?.sign_in(email, password).await?;
    let backend = RemoteBackend::new(config)?.with_access_token(&tokens.access_token);
    let user = fetch_profile(&backend, &tokens.user.id).await?;
    info!(user_id = %user.id, role = %user.role, "Session established");
    Ok((AuthSession::new(user, tokens.access_token), backend))
}

/// Rebuild a session from a saved token. Fails with an auth error once the token expired.
pub async fn resume_remote(
    config: &RemoteConfig,
    user_id: &str,
    access_token: &str,
) -> ServiceResult<(AuthSession, RemoteBackend)> {
    let backend = RemoteBackend::new(config)?.with_access_token(access_token);
    let user = fetch_profile(&backend, user_id).await?;
    Ok((AuthSession::new(user, access_token.to_string()), backend))
}

/// Sign out of the hosted backend. Failures are logged; the local session is dropped regardless.
pub async fn sign_out_remote(config: &RemoteConfig, access_token: &str) {
    match AuthClient::new(config) {
        Ok(client) => {
            if let Err(e) = client.sign_out(access_token).await {
                warn!(error = %e, "Remote sign-out failed");
            }
        }
        Err(e) => warn!(error = %e, "Remote sign-out skipped"),
    }
}

/// Sign in to the local backend by email. The local backend has no credentials.
pub async fn sign_in_local(store: &SharedStore, email: &str) -> ServiceResult<AuthSession> {
    let user = store
        .profile_by_email(email)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No profile for {email}")))?;
    info!(user_id = %user.id, "Local session established");
    Ok(AuthSession::new(user, "local".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(role: &str) -> serde_json::Value {
        json!({
            "id": "u1", "email": "u1@hostel.test", "name": "Asha", "role": role,
            "national_id": null, "phone": null, "room_number": "A-101"
        })
    }

    #[test]
    fn student_and_admin_rows_decode() {
        assert_eq!(profile_from_row(row("student")).unwrap().role, Role::Student);
        assert_eq!(profile_from_row(row("admin")).unwrap().role, Role::Admin);
    }

    #[test]
    fn other_roles_are_forbidden() {
        let err = profile_from_row(row("authenticated")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(hostel_core::Error::Forbidden(_))
        ));

        let mut missing = row("student");
        missing.as_object_mut().unwrap().remove("role");
        assert!(profile_from_row(missing).is_err());
    }

    #[test]
    fn require_checks_role() {
        let session = AuthSession::new(profile_from_row(row("student")).unwrap(), "t".into());
        assert!(session.require(Role::Student).is_ok());
        assert!(session.require(Role::Admin).is_err());
        assert_eq!(session.display_name(), Some("Asha"));
    }
}
