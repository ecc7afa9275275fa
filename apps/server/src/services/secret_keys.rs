//! Secrets helper: encrypted storage of provider API keys.
//!
//! Encryption and decryption are delegated to PostgreSQL's pgcrypto
//! functions (`pgp_sym_encrypt`/`pgp_sym_decrypt`); no cipher is
//! implemented here and there is no client-side fallback. The database is
//! a hard dependency for this flow.

use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use secrecy::{ExposeSecret, SecretString};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Provider, StoredKeySummary};

/// Store a provider API key for a user.
///
/// Deactivates any prior active row for the (user, provider) pair before
/// inserting the new ciphertext row; old rows are kept, never deleted.
pub async fn store_key(
    pool: &DbPool,
    encryption_secret: &SecretString,
    user_id: &str,
    provider: Provider,
    api_key: &SecretString,
    key_name: Option<String>,
) -> AppResult<()> {
    pool.deactivate_keys(user_id, provider).await?;

    let ciphertext = encrypt(pool, encryption_secret, api_key).await?;

    pool.insert_encrypted_key(user_id, provider, ciphertext, key_name)
        .await?;

    Ok(())
}

/// Retrieve and decrypt the active API key for a (user, provider) pair.
///
/// Returns None when no active key is stored. Updates the row's
/// last-used timestamp on success (best-effort).
pub async fn retrieve_key(
    pool: &DbPool,
    encryption_secret: &SecretString,
    user_id: &str,
    provider: Provider,
) -> AppResult<Option<SecretString>> {
    let row = match pool.find_active_key(user_id, provider).await? {
        Some(row) => row,
        None => return Ok(None),
    };

    let plaintext = decrypt(pool, encryption_secret, &row.encrypted_key).await?;

    if let Err(e) = pool.touch_key(row.id).await {
        tracing::warn!("Failed to update key last_used_at: {}", e);
    }

    Ok(Some(plaintext))
}

/// Delete every key row for a (user, provider) pair.
pub async fn delete_keys(pool: &DbPool, user_id: &str, provider: Provider) -> AppResult<u64> {
    pool.delete_keys(user_id, provider).await
}

/// List the user's configured providers, without any key material.
pub async fn list_configured(pool: &DbPool, user_id: &str) -> AppResult<Vec<StoredKeySummary>> {
    let rows = pool.list_active_keys(user_id).await?;
    Ok(rows.into_iter().map(StoredKeySummary::from).collect())
}

/// Encrypt plaintext via the database-side function.
async fn encrypt(
    pool: &DbPool,
    encryption_secret: &SecretString,
    plaintext: &SecretString,
) -> AppResult<Vec<u8>> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT pgp_sym_encrypt($1, $2) AS ciphertext",
        [
            plaintext.expose_secret().into(),
            encryption_secret.expose_secret().into(),
        ],
    );

    let row = pool
        .connection()
        .query_one(stmt)
        .await
        .map_err(|e| AppError::Database(format!("Key encryption failed: {}", e)))?
        .ok_or_else(|| AppError::Database("Key encryption returned no row".to_string()))?;

    let ciphertext: Vec<u8> = row
        .try_get("", "ciphertext")
        .map_err(|e| AppError::Database(format!("Key encryption failed: {}", e)))?;

    Ok(ciphertext)
}

/// Decrypt ciphertext via the database-side function.
async fn decrypt(
    pool: &DbPool,
    encryption_secret: &SecretString,
    ciphertext: &[u8],
) -> AppResult<SecretString> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT pgp_sym_decrypt($1, $2) AS plaintext",
        [
            ciphertext.to_vec().into(),
            encryption_secret.expose_secret().into(),
        ],
    );

    let row = pool
        .connection()
        .query_one(stmt)
        .await
        .map_err(|e| AppError::Database(format!("Key decryption failed: {}", e)))?
        .ok_or_else(|| AppError::Database("Key decryption returned no row".to_string()))?;

    let plaintext: String = row
        .try_get("", "plaintext")
        .map_err(|e| AppError::Database(format!("Key decryption failed: {}", e)))?;

    Ok(SecretString::from(plaintext))
}
