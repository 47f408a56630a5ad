//! services/api/src/web/middleware.rs
//!
//! Session middleware for the HTML pages.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::web::state::{AppState, SessionHandle};

pub const SESSION_COOKIE: &str = "explainer_session";

/// Reads the session id from the `Cookie` header, if present and well-formed.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// Middleware that resolves the browser's session.
///
/// The `SessionHandle` is inserted into request extensions for handlers to use.
/// Sessions are only created by form posts; a read without a live session gets a
/// detached, empty shell and no cookie. A cookie is set on the response whenever a
/// new session was created.
pub async fn ensure_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = match session_id_from_headers(req.headers()) {
        Some(id) => state.sessions.get(id).await,
        None => None,
    };
    let (handle, created) = match existing {
        Some(handle) => (handle, false),
        None if req.method() == Method::POST => (state.sessions.create().await, true),
        None => (SessionHandle::detached(), false),
    };
    let session_id = handle.id;
    if created {
        debug!("Created session {}", session_id);
    }

    req.extensions_mut().insert(handle);
    let mut response = next.run(req).await;

    if created {
        let cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE,
            session_id,
            state.config.session_ttl.as_secs()
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn rejects_missing_or_garbled_cookies() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("explainer_session=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("explainer_session_old=abc"));
        assert_eq!(session_id_from_headers(&headers), None);
    }
}
