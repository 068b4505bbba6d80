use std::sync::Arc;

use axum::{Form, Router};
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::cookies;
use super::gate::{RETURN_TO_PARAM, encode_return_target, is_safe_return_target};
use super::state::{GateState, LoginState};
use super::traits::CredentialVerifier;

/// Create the login/logout router.
///
/// Mounts `POST {login_path}` and `GET|POST /auth/logout`. Rendering the
/// login form itself is left to the application.
pub fn auth_routes<V>(state: GateState, verifier: V) -> Router
where
    V: CredentialVerifier,
{
    let login_path = state.settings.login_path.clone();

    let state = LoginState {
        gate: state,
        verifier: Arc::new(verifier),
    };

    Router::new()
        .route(&login_path, post(login::<V>))
        .route(
            super::LOGOUT_PATH,
            get(logout::<V>).post(logout::<V>),
        )
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

async fn login<V: CredentialVerifier>(
    State(state): State<LoginState<V>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), Response> {
    let settings = &state.gate.settings;

    let session = state
        .verifier
        .verify(&form.email, &form.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Login verification failed");
            login_error(&settings.login_path, "server_error", None)
        })?;

    let Some(session) = session else {
        tracing::info!(email = %form.email, "Login rejected: invalid credentials");
        return Err(login_error(
            &settings.login_path,
            "invalid_credentials",
            form.redirect_to.as_deref(),
        ));
    };

    let token = state.gate.codec.encode(&session).map_err(|e| {
        tracing::error!(error = %e, "Session encoding failed");
        login_error(&settings.login_path, "server_error", None)
    })?;

    let session_cookie = cookies::session_cookie(
        &settings.session_cookie_name,
        &token,
        settings.session_ttl_days,
        settings.secure_cookies,
    );

    let target = form
        .redirect_to
        .as_deref()
        .filter(|t| is_safe_return_target(t))
        .unwrap_or(session.role.home_path());

    tracing::info!(
        user_id = %session.user_id,
        role = %session.role,
        "Login successful"
    );

    Ok((jar.add(session_cookie), Redirect::to(target)))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<V: CredentialVerifier>(
    State(state): State<LoginState<V>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let settings = &state.gate.settings;
    let clear_cookie = cookies::clear_session_cookie(&settings.session_cookie_name);
    tracing::info!("Logout");
    (jar.add(clear_cookie), Redirect::to(settings.logout_redirect()))
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(login_path: &str, code: &str, return_to: Option<&str>) -> Response {
    let encoded = urlencoding::encode(code);
    let mut target = format!("{login_path}?error={encoded}");
    if let Some(return_to) = return_to.filter(|t| is_safe_return_target(t)) {
        target.push_str(&format!("&{RETURN_TO_PARAM}={}", encode_return_target(return_to)));
    }
    Redirect::to(&target).into_response()
}
