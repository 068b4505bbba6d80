use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use super::cookies;
use super::policy::{Access, Outcome, Presented, evaluate};
use super::state::GateState;

/// Query parameter carrying the originally requested path to the login page.
pub const RETURN_TO_PARAM: &str = "redirectTo";

/// Wrap `router` so every request passes through [`access_gate`].
pub fn with_access_gate(router: Router, state: GateState) -> Router {
    router.layer(from_fn_with_state(state, access_gate))
}

/// Request-time authorization gate.
///
/// Mount with `axum::middleware::from_fn_with_state(state, access_gate)`.
/// On success the verified [`SessionClaims`](crate::SessionClaims) are
/// available to handlers through request extensions.
pub async fn access_gate(
    State(state): State<GateState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let access = state.routes.access_for(&path);
    request
        .extensions_mut()
        .insert(LoginPath(state.settings.login_path.clone()));

    if access == Access::Public {
        return next.run(request).await;
    }

    let presented = match cookies::get_session_token(&jar, &state.settings.session_cookie_name) {
        None => Presented::Missing,
        Some(token) => match state.codec.decode(&token) {
            Ok(claims) => Presented::Valid(claims),
            Err(_) => Presented::Invalid,
        },
    };

    match evaluate(access, &presented) {
        Outcome::Public => next.run(request).await,
        Outcome::Authorized => {
            if let Presented::Valid(claims) = presented {
                tracing::debug!(
                    path = %path,
                    user_id = %claims.user_id(),
                    role = %claims.role(),
                    "Access granted"
                );
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        Outcome::Unauthenticated { clear_cookie } => {
            let return_to = request
                .uri()
                .path_and_query()
                .map_or(path.as_str(), |pq| pq.as_str());
            let target = login_redirect(&state.settings.login_path, return_to);
            tracing::debug!(path = %path, stale_cookie = clear_cookie, "Unauthenticated, redirecting to login");

            if clear_cookie {
                let jar = jar.add(cookies::clear_session_cookie(&state.settings.session_cookie_name));
                (jar, Redirect::to(&target)).into_response()
            } else {
                Redirect::to(&target).into_response()
            }
        }
        Outcome::WrongRole { home } => {
            tracing::debug!(path = %path, role = %home, "Role mismatch, redirecting home");
            Redirect::to(home.home_path()).into_response()
        }
        Outcome::AlreadyAuthenticated { home } => {
            tracing::debug!(path = %path, role = %home, "Already authenticated, skipping login");
            Redirect::to(home.home_path()).into_response()
        }
    }
}

/// Configured login page, left on every request for [`AuthSession`](super::AuthSession) rejections.
#[derive(Debug, Clone)]
pub(super) struct LoginPath(pub(super) String);

/// Login URL preserving the requested path as the return target.
pub(super) fn login_redirect(login_path: &str, return_to: &str) -> String {
    format!("{login_path}?{RETURN_TO_PARAM}={}", encode_return_target(return_to))
}

/// Percent-encodes a return target for a query string.
pub(super) fn encode_return_target(return_to: &str) -> String {
    // `/` is legal in a query component and keeps the target readable.
    urlencoding::encode(return_to).replace("%2F", "/")
}

/// Accepts only same-origin absolute paths as post-login targets.
///
/// Only visible ASCII is allowed: browsers drop tabs and newlines while
/// parsing a `Location`, turning `/\t/host` into `//host`, and anything
/// else is not a valid header value.
pub(super) fn is_safe_return_target(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && target.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect("/auth/login", "/teacher/quizzes"),
            "/auth/login?redirectTo=/teacher/quizzes"
        );
    }

    #[test]
    fn login_redirect_encodes_query() {
        assert_eq!(
            login_redirect("/auth/login", "/student/grades?term=2&x=y"),
            "/auth/login?redirectTo=/student/grades%3Fterm%3D2%26x%3Dy"
        );
    }

    #[test]
    fn return_target_must_be_local() {
        assert!(is_safe_return_target("/teacher/quizzes"));
        assert!(!is_safe_return_target("//evil.example"));
        assert!(!is_safe_return_target("https://evil.example"));
        assert!(!is_safe_return_target("/\\evil.example"));
        assert!(!is_safe_return_target(""));
    }

    #[test]
    fn return_target_rejects_whitespace_controls_and_non_ascii() {
        assert!(!is_safe_return_target("/\t/evil.example"));
        assert!(!is_safe_return_target("/teacher\nquizzes"));
        assert!(!is_safe_return_target("/teacher\rquizzes"));
        assert!(!is_safe_return_target("/teacher quizzes"));
        assert!(!is_safe_return_target("/teacher\u{7f}"));
        assert!(!is_safe_return_target("/teacher\u{85}"));
        assert!(!is_safe_return_target("/teacher/caf\u{e9}"));
    }
}
