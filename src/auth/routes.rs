//! Login/logout HTTP endpoints.

use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::auth::handler::LoginAction;
use crate::http::middleware::encoding::RequestEncoding;
use crate::http::response::{found, with_cookie, GatewayError};
use crate::http::server::AppState;

/// Submitted login form. Missing fields count as a failed attempt.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET {login.path}`
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    tracing::info!("Displaying login page");
    Html(render_login_page(&state.config.login.path, None))
}

/// `POST {login.path}`
pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    encoding: Option<Extension<RequestEncoding>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, GatewayError> {
    if let Some(Extension(encoding)) = encoding {
        if !encoding.is_supported() {
            return Err(GatewayError::MalformedInput(format!(
                "Unsupported charset: {}",
                encoding.charset
            )));
        }
    }
    let Form(form) = form.map_err(|e| GatewayError::MalformedInput(e.body_text()))?;
    let session_id = state.cookie.extract(&headers);

    let action = state
        .auth
        .login(session_id.as_deref(), &form.username, &form.password)?;

    let login_path = &state.config.login.path;
    let response = match action {
        LoginAction::Redirect {
            location,
            session_id,
        } => with_cookie(found(&location), state.cookie.issue(&session_id)),
        LoginAction::Retry {
            remaining,
            session_id,
            issued,
        } => {
            let message = format!(
                "Invalid username or password. {} attempt{} remaining.",
                remaining,
                if remaining == 1 { "" } else { "s" }
            );
            let page = Html(render_login_page(login_path, Some(&message))).into_response();
            if issued {
                with_cookie(page, state.cookie.issue(&session_id))
            } else {
                page
            }
        }
        LoginAction::LockedOut => with_cookie(
            Html(render_login_page(
                login_path,
                Some("Too many failed attempts. Please try again later."),
            ))
            .into_response(),
            state.cookie.clear(),
        ),
    };
    Ok(response)
}

/// `GET|POST {login.logout_path}`
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let session_id = state.cookie.extract(&headers);
    state.auth.logout(session_id.as_deref())?;
    Ok(with_cookie(
        found(&state.config.login.path),
        state.cookie.clear(),
    ))
}

fn render_login_page(action: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>\n", e))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Sign in</title></head>\n<body>\n<h1>Sign in</h1>\n{error}\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Username <input name=\"username\" autocomplete=\"username\"></label>\n\
         <label>Password <input name=\"password\" type=\"password\" autocomplete=\"current-password\"></label>\n\
         <button type=\"submit\">Sign in</button>\n</form>\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_login_page() {
        let page = render_login_page("/login", None);
        assert!(page.contains("action=\"/login\""));
        assert!(!page.contains("class=\"error\""));

        let page = render_login_page("/login", Some("2 attempts remaining"));
        assert!(page.contains("<p class=\"error\">2 attempts remaining</p>"));
    }
}
