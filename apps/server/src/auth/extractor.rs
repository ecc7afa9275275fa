//! Actix-web extractor for session authentication.
//!
//! # Security
//! - The bearer token is wrapped in `SecretString` immediately
//! - Token values are never logged or exposed in debug output
//! - Verification is delegated to the identity provider's JWKS; the
//!   server never mints or stores session tokens

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;
use secrecy::SecretString;

use crate::error::ErrorResponse;
use crate::models::AuthenticatedUser;
use crate::services::session::SessionVerifier;

/// Extract the bearer token from the Authorization header, wrapping it in
/// SecretString. Returns None if the header is missing or malformed.
fn extract_bearer_token(req: &HttpRequest) -> Option<SecretString> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| SecretString::from(s.to_string()))
}

/// Authentication error for the extractor.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid identity-provider session.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: SessionAuth) -> impl Responder {
///     // auth.user contains the authenticated caller info
/// }
/// ```
pub struct SessionAuth {
    pub user: AuthenticatedUser,
}

impl FromRequest for SessionAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Get the verifier from app data
            let verifier = match req.app_data::<web::Data<SessionVerifier>>() {
                Some(v) => v.clone(),
                None => {
                    return Err(AuthError {
                        message: "Internal configuration error".to_string(),
                    });
                }
            };

            // Extract the token - immediately wrapped in SecretString
            let token = match extract_bearer_token(&req) {
                Some(t) => t,
                None => {
                    return Err(AuthError {
                        message: "Missing session. Provide an Authorization: Bearer header."
                            .to_string(),
                    });
                }
            };

            match verifier.verify_token(&token).await {
                Ok(user) => Ok(SessionAuth { user }),
                Err(message) => Err(AuthError { message }),
            }
            // Note: token is dropped here, memory zeroized
        })
    }
}
