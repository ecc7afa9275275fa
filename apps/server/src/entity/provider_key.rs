//! Encrypted provider API key entity.
//!
//! The ciphertext is produced and consumed by PostgreSQL's pgcrypto
//! functions; the application never sees or implements the cipher.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "provider_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub provider: String,
    /// pgp_sym_encrypt output (bytea).
    pub encrypted_key: Vec<u8>,
    pub key_name: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
