//! Session extractor tests against the mock identity provider.

use actix_web::{test, web, App, HttpResponse};
use codegenesis_lib::auth::SessionAuth;
use codegenesis_lib::config::SessionSettings;
use codegenesis_lib::services::session::SessionVerifier;
use secrecy::SecretString;

use super::mock_identity_provider::{MockIdentityProvider, TestKeyPair, TestSessionClaims};

/// Minimal protected handler echoing the authenticated user id.
async fn whoami(auth: SessionAuth) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "user_id": auth.user.user_id }))
}

async fn start_provider() -> (MockIdentityProvider, TestKeyPair) {
    let key = TestKeyPair::generate("test-key-1");
    let provider = MockIdentityProvider::start(key.clone()).await;
    (provider, key)
}

fn verifier_for(provider: &MockIdentityProvider) -> SessionVerifier {
    SessionVerifier::new(&SessionSettings {
        issuer: provider.issuer_url.clone(),
        audience: None,
    })
}

macro_rules! test_app {
    ($verifier:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($verifier))
                .route("/whoami", web::get().to(whoami)),
        )
        .await
    };
}

#[actix_web::test]
async fn valid_token_authenticates() {
    let (provider, key) = start_provider().await;
    let app = test_app!(verifier_for(&provider));

    let claims = TestSessionClaims::default_for(&provider.issuer_url).with_subject("user_alpha");
    let token = provider.issue_token(&claims, &key);

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], "user_alpha");
}

#[actix_web::test]
async fn missing_header_is_unauthorized() {
    let (provider, _key) = start_provider().await;
    let app = test_app!(verifier_for(&provider));

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn expired_token_is_rejected() {
    let (provider, key) = start_provider().await;
    let app = test_app!(verifier_for(&provider));

    let claims = TestSessionClaims::default_for(&provider.issuer_url).expired();
    let token = provider.issue_token(&claims, &key);

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn wrong_issuer_is_rejected() {
    let (provider, key) = start_provider().await;
    let app = test_app!(verifier_for(&provider));

    let claims = TestSessionClaims::default_for(&provider.issuer_url)
        .with_issuer("https://evil.example.com");
    let token = provider.issue_token(&claims, &key);

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn token_signed_with_unknown_key_is_rejected() {
    let (provider, _key) = start_provider().await;
    let app = test_app!(verifier_for(&provider));

    // Signed by a key pair the provider never published
    let rogue = TestKeyPair::generate("rogue-key");
    let claims = TestSessionClaims::default_for(&provider.issuer_url);
    let token = provider.issue_token(&claims, &rogue);

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn key_rotation_is_picked_up_on_kid_miss() {
    let (provider, key) = start_provider().await;
    let verifier = verifier_for(&provider);

    // Warm the JWKS cache with the original key
    let claims = TestSessionClaims::default_for(&provider.issuer_url);
    let token = provider.issue_token(&claims, &key);
    verifier
        .verify_token(&SecretString::from(token))
        .await
        .expect("original key should verify");

    // Rotate to a new key; the cached JWKS no longer contains its kid
    let new_key = TestKeyPair::generate("test-key-2");
    provider.rotate_keys(new_key.clone());

    let token = provider.issue_token(&claims, &new_key);
    let user = verifier
        .verify_token(&SecretString::from(token))
        .await
        .expect("rotated key should verify after forced JWKS refresh");

    assert_eq!(user.user_id, claims.sub);
}

#[actix_web::test]
async fn profile_claims_flow_through() {
    let (provider, key) = start_provider().await;
    let verifier = verifier_for(&provider);

    let claims = TestSessionClaims::default_for(&provider.issuer_url);
    let token = provider.issue_token(&claims, &key);

    let user = verifier
        .verify_token(&SecretString::from(token))
        .await
        .unwrap();

    assert_eq!(user.email.as_deref(), Some("test@example.com"));
    assert_eq!(user.name.as_deref(), Some("Test User"));
    assert!(user.avatar_url.is_none());
}
