//! End-to-end tests for identity-provider session verification.
//!
//! Runs a mock identity provider (in-process JWKS endpoint + RS256 token
//! signing) and drives the session extractor through a real actix app.
//! No database is required.

mod mock_identity_provider;
mod test_session_auth;
