use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::info;

use crate::models::WsError;

/// Claims carried by the bearer tokens the auth collaborator issues
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
}

// Get the bearer token offered at handshake time, if any.
//
// Browser WebSocket clients cannot set headers, so the token query
// parameter is checked first, then the Authorization header, then the
// auth_token cookie.
pub fn extract_token(headers: &HeaderMap, query_token: Option<String>) -> Option<String> {
    // 1. Token from the query string
    if let Some(token) = query_token {
        if !token.is_empty() {
            return Some(token);
        }
    }

    // 2. Token from the Authorization header
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            return Some(
                auth_str
                    .strip_prefix("Bearer ")
                    .unwrap_or(auth_str)
                    .to_string(),
            );
        }
    }

    // 3. Token from cookies
    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie::Cookie::split_parse(cookie_str).flatten() {
                if cookie.name() == "auth_token" {
                    return Some(cookie.value().to_string());
                }
            }
        }
    }

    None
}

// Validate a bearer token and return the identity it carries.
pub fn verify_credential(token: &str, secret: &str) -> Result<i64, WsError> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(token_data) => {
            info!("JWT token validated successfully for user: {}", token_data.claims.user_id);
            Ok(token_data.claims.user_id)
        }
        Err(_) => Err(WsError::AuthenticationInvalid),
    }
}
