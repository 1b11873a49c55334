//! Caller roles and their route namespaces.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Role attached to a signed-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    /// Route prefix every screen of this role lives under.
    pub const fn namespace(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Student => "/student",
        }
    }

    /// Landing path of this role's dashboard.
    pub const fn base_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin-dashboard",
            Self::Student => "/student-dashboard",
        }
    }

    /// Reject callers outside the required role.
    pub fn require(self, required: Self) -> Result<(), Error> {
        if self == required {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "{} access required, signed in as {}",
                required.as_str(),
                self.as_str()
            )))
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            other => Err(Error::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_path_lives_in_namespace() {
        for role in [Role::Admin, Role::Student] {
            assert!(role.base_path().starts_with(role.namespace()));
        }
    }

    #[test]
    fn namespaces_are_disjoint() {
        assert!(!Role::Admin.base_path().starts_with(Role::Student.namespace()));
        assert!(!Role::Student.base_path().starts_with(Role::Admin.namespace()));
    }

    #[test]
    fn require_rejects_other_role() {
        assert!(Role::Admin.require(Role::Admin).is_ok());
        assert!(matches!(
            Role::Student.require(Role::Admin),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_role() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("authenticated".parse::<Role>().is_err());
    }
}
