use crate::token::SessionClaims;
use crate::types::Role;

/// Access requirement for a path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Bypasses the gate.
    Public,
    /// Login/register pages: visitors with a valid session are sent home.
    GuestOnly,
    /// Any valid session, regardless of role.
    Authenticated,
    /// Reserved for one role; the override role is admitted too.
    Role(Role),
    /// Path whose raw and dot-resolved forms classify differently.
    /// Never served: the router would see one form, the gate the other.
    Rejected,
}

/// What the request carried in its session cookie.
#[derive(Debug, Clone)]
pub enum Presented {
    Missing,
    Invalid,
    Valid(SessionClaims),
}

/// Terminal outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a protected path.
    Public,
    /// Redirect to login. `clear_cookie` is set when a stale token was sent.
    Unauthenticated { clear_cookie: bool },
    /// Valid session in someone else's namespace.
    WrongRole { home: Role },
    Authorized,
    /// Valid session on a guest-only page.
    AlreadyAuthenticated { home: Role },
}

/// Decides the outcome for a request needing `access`.
#[must_use]
pub fn evaluate(access: Access, presented: &Presented) -> Outcome {
    let claims = match presented {
        Presented::Valid(claims) => Some(claims),
        Presented::Missing | Presented::Invalid => None,
    };

    match (access, claims) {
        (Access::Public, _) => Outcome::Public,
        (Access::GuestOnly, Some(claims)) => Outcome::AlreadyAuthenticated { home: claims.role() },
        (Access::GuestOnly, None) => Outcome::Public,
        (Access::Authenticated | Access::Role(_) | Access::Rejected, None) => {
            Outcome::Unauthenticated {
                clear_cookie: matches!(presented, Presented::Invalid),
            }
        }
        (Access::Rejected, Some(claims)) => Outcome::WrongRole { home: claims.role() },
        (Access::Authenticated, Some(_)) => Outcome::Authorized,
        (Access::Role(required), Some(claims)) => {
            let role = claims.role();
            if role == required || role.is_override() {
                Outcome::Authorized
            } else {
                Outcome::WrongRole { home: role }
            }
        }
    }
}

/// Ordered prefix table; the first matching prefix wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(String, Access)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut table = Self::empty()
            .with_prefix("/auth/login", Access::GuestOnly)
            .with_prefix("/auth/register", Access::GuestOnly);
        for role in Role::ALL {
            table = table.with_prefix(role.namespace(), Access::Role(role));
        }
        table
            .with_prefix("/ai", Access::Authenticated)
            .with_prefix("/dashboard", Access::Authenticated)
    }
}

impl RouteTable {
    /// A table with no entries; every path is public.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a prefix rule. Earlier rules take precedence.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, access: Access) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        self.entries.push((prefix, access));
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, Access)] {
        &self.entries
    }

    /// Puts `prefix` first as a guest-only page unless it already is one.
    pub(crate) fn with_guest_page(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let present = self
            .entries
            .iter()
            .any(|(p, access)| p == prefix && *access == Access::GuestOnly);
        if !present {
            self.entries.insert(0, (prefix.to_string(), Access::GuestOnly));
        }
        self
    }

    /// Access requirement for a request path.
    ///
    /// The raw path (what the router matches) and its dot-resolved form must
    /// agree; otherwise the path is [`Access::Rejected`].
    #[must_use]
    pub fn access_for(&self, path: &str) -> Access {
        let raw = self.classify(path);
        let normalized = self.classify(&normalize_path(path));
        if raw == normalized {
            raw
        } else {
            tracing::debug!(path = %path, ?raw, ?normalized, "Ambiguous path rejected");
            Access::Rejected
        }
    }

    fn classify(&self, path: &str) -> Access {
        self.entries
            .iter()
            .find(|(prefix, _)| prefix_matches(prefix, path))
            .map_or(Access::Public, |(_, access)| *access)
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Collapses empty and `.` segments and resolves `..`.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::token::{NewSession, SessionCodec, SessionSecret};
    use crate::types::UserId;

    fn claims(role: Role) -> SessionClaims {
        let codec = SessionCodec::new(&SessionSecret::new("test-secret-32-bytes-long-key-01").unwrap());
        let now = OffsetDateTime::now_utc();
        let token = codec
            .encode_at(
                &NewSession {
                    user_id: UserId::from("u-1"),
                    role,
                    email: "u@school.test".into(),
                    display_name: "U".into(),
                },
                now,
            )
            .unwrap();
        codec.decode_at(&token, now).unwrap()
    }

    #[test]
    fn default_table_maps_every_prefix() {
        let table = RouteTable::default();
        assert_eq!(table.access_for("/student/dashboard"), Access::Role(Role::Student));
        assert_eq!(table.access_for("/teacher/quizzes"), Access::Role(Role::Teacher));
        assert_eq!(table.access_for("/parent"), Access::Role(Role::Parent));
        assert_eq!(table.access_for("/admin/users/7"), Access::Role(Role::Admin));
        assert_eq!(table.access_for("/ai/tutor"), Access::Authenticated);
        assert_eq!(table.access_for("/dashboard"), Access::Authenticated);
        assert_eq!(table.access_for("/auth/login"), Access::GuestOnly);
        assert_eq!(table.access_for("/auth/register"), Access::GuestOnly);
        assert_eq!(table.access_for("/auth/logout"), Access::Public);
        assert_eq!(table.access_for("/"), Access::Public);
        assert_eq!(table.access_for("/about"), Access::Public);
    }

    #[test]
    fn prefix_match_respects_segments() {
        let table = RouteTable::default();
        assert_eq!(table.access_for("/students"), Access::Public);
        assert_eq!(table.access_for("/administrator"), Access::Public);
        assert_eq!(table.access_for("/aid"), Access::Public);
    }

    #[test]
    fn paths_that_change_class_under_normalization_are_rejected() {
        let table = RouteTable::default();
        assert_eq!(table.access_for("//admin/dashboard"), Access::Rejected);
        assert_eq!(table.access_for("/student/../admin"), Access::Rejected);
        assert_eq!(table.access_for("/./teacher/"), Access::Rejected);
        assert_eq!(table.access_for("/public/../../parent"), Access::Rejected);
        assert_eq!(table.access_for("/admin/x/../../about"), Access::Rejected);
    }

    #[test]
    fn harmless_non_canonical_paths_keep_their_class() {
        let table = RouteTable::default();
        assert_eq!(table.access_for("/teacher/"), Access::Role(Role::Teacher));
        assert_eq!(table.access_for("/admin/./users"), Access::Role(Role::Admin));
        assert_eq!(table.access_for("/admin/users/../reports"), Access::Role(Role::Admin));
        assert_eq!(table.access_for("/about//team"), Access::Public);
    }

    #[test]
    fn rejected_paths_fail_closed() {
        assert_eq!(
            evaluate(Access::Rejected, &Presented::Missing),
            Outcome::Unauthenticated { clear_cookie: false }
        );
        assert_eq!(
            evaluate(Access::Rejected, &Presented::Invalid),
            Outcome::Unauthenticated { clear_cookie: true }
        );
        assert_eq!(
            evaluate(Access::Rejected, &Presented::Valid(claims(Role::Admin))),
            Outcome::WrongRole { home: Role::Admin }
        );
    }

    #[test]
    fn guest_page_is_prepended_once() {
        let table = RouteTable::default().with_guest_page("/signin");
        assert_eq!(table.access_for("/signin"), Access::GuestOnly);
        assert_eq!(table.entries()[0], ("/signin".to_string(), Access::GuestOnly));

        let before = RouteTable::default().entries().len();
        let table = RouteTable::default().with_guest_page("/auth/login");
        assert_eq!(table.entries().len(), before);
    }

    #[test]
    fn first_match_wins() {
        let table = RouteTable::empty()
            .with_prefix("/admin/health", Access::Public)
            .with_prefix("/admin/", Access::Role(Role::Admin));
        assert_eq!(table.access_for("/admin/health"), Access::Public);
        assert_eq!(table.access_for("/admin/users"), Access::Role(Role::Admin));
    }

    #[test]
    fn missing_session_redirects_without_clearing() {
        assert_eq!(
            evaluate(Access::Role(Role::Teacher), &Presented::Missing),
            Outcome::Unauthenticated { clear_cookie: false }
        );
        assert_eq!(
            evaluate(Access::Authenticated, &Presented::Missing),
            Outcome::Unauthenticated { clear_cookie: false }
        );
    }

    #[test]
    fn invalid_session_redirects_and_clears() {
        assert_eq!(
            evaluate(Access::Role(Role::Student), &Presented::Invalid),
            Outcome::Unauthenticated { clear_cookie: true }
        );
    }

    #[test]
    fn non_admin_roles_are_confined() {
        for role in [Role::Student, Role::Teacher, Role::Parent] {
            for required in Role::ALL {
                let outcome = evaluate(Access::Role(required), &Presented::Valid(claims(role)));
                if role == required {
                    assert_eq!(outcome, Outcome::Authorized);
                } else {
                    assert_eq!(outcome, Outcome::WrongRole { home: role });
                }
            }
        }
    }

    #[test]
    fn admin_enters_every_namespace() {
        for required in Role::ALL {
            assert_eq!(
                evaluate(Access::Role(required), &Presented::Valid(claims(Role::Admin))),
                Outcome::Authorized
            );
        }
    }

    #[test]
    fn any_role_may_use_shared_prefixes() {
        for role in Role::ALL {
            assert_eq!(
                evaluate(Access::Authenticated, &Presented::Valid(claims(role))),
                Outcome::Authorized
            );
        }
    }

    #[test]
    fn guest_pages_bounce_valid_sessions() {
        assert_eq!(
            evaluate(Access::GuestOnly, &Presented::Valid(claims(Role::Parent))),
            Outcome::AlreadyAuthenticated { home: Role::Parent }
        );
        assert_eq!(evaluate(Access::GuestOnly, &Presented::Missing), Outcome::Public);
        assert_eq!(evaluate(Access::GuestOnly, &Presented::Invalid), Outcome::Public);
    }

    #[test]
    fn public_ignores_session() {
        assert_eq!(evaluate(Access::Public, &Presented::Invalid), Outcome::Public);
        assert_eq!(
            evaluate(Access::Public, &Presented::Valid(claims(Role::Student))),
            Outcome::Public
        );
    }
}
