//! Terminal handlers for the gateway's own pages.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::http::response::found;
use crate::http::server::AppState;
use crate::security::gate::Principal;

/// `GET /`: send the caller on to the post-login landing page.
pub async fn home(State(state): State<AppState>) -> Response {
    found(&state.config.login.success_path)
}

/// Landing page after login.
pub async fn dashboard(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> Html<String> {
    let principal = principal.map(|Extension(p)| p);
    Html(render_dashboard(principal.as_ref(), &state.config.login.logout_path))
}

fn render_dashboard(principal: Option<&Principal>, logout_path: &str) -> String {
    let greeting = match principal {
        Some(principal) => format!(
            "Signed in as {} ({})",
            escape_html(&principal.username),
            principal.role
        ),
        None => "Not signed in".to_string(),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Dashboard</title></head>\n<body>\n\
         <h1>Dashboard</h1>\n<p>{greeting}</p>\n\
         <form method=\"post\" action=\"{logout_path}\"><button type=\"submit\">Sign out</button></form>\n\
         </body>\n</html>\n"
    )
}

/// `GET /api/public/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::Role;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
        assert_eq!(escape_html("alice"), "alice");
    }

    #[test]
    fn test_dashboard_greets_principal() {
        let principal = Principal {
            session_id: "abc".into(),
            username: "alice".into(),
            role: Role::Admin,
        };
        let page = render_dashboard(Some(&principal), "/logout");
        assert!(page.contains("Signed in as alice (admin)"));
        assert!(page.contains("action=\"/logout\""));

        let page = render_dashboard(None, "/signout");
        assert!(page.contains("Not signed in"));
        assert!(page.contains("action=\"/signout\""));
    }
}
