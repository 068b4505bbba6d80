use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Application role carried in every session.
///
/// Closed set: an unknown role string is a parse error, never a new role.
/// Each role owns exactly one top-level path namespace (`/student`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Teacher, Role::Parent, Role::Admin];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }

    /// Top-level path prefix owned by this role.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::Student => "/student",
            Self::Teacher => "/teacher",
            Self::Parent => "/parent",
            Self::Admin => "/admin",
        }
    }

    /// Landing page for this role.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Student => "/student/dashboard",
            Self::Teacher => "/teacher/dashboard",
            Self::Parent => "/parent/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// `true` for the role admitted to every namespace.
    #[must_use]
    pub fn is_override(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for Role {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            other => Err(Error::InvalidRole(other.to_owned())),
        }
    }
}

/// Consumer-defined user identifier (opaque string).
///
/// Set once when the session is issued. The consumer chooses the format
/// (UUID, database key, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Teacher).unwrap();
        assert_eq!(json, "\"teacher\"");
        assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    }

    #[test]
    fn home_path_lives_in_namespace() {
        for role in Role::ALL {
            assert!(role.home_path().starts_with(role.namespace()));
        }
    }

    #[test]
    fn only_admin_overrides() {
        assert!(Role::Admin.is_override());
        assert!(!Role::Student.is_override());
        assert!(!Role::Teacher.is_override());
        assert!(!Role::Parent.is_override());
    }

    #[test]
    fn user_id_from_string() {
        let id = UserId::from("user-123".to_string());
        assert_eq!(id.to_string(), "user-123");
        assert_eq!(id.as_str(), "user-123");
    }
}
