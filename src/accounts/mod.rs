//! Accounts: the identity record and the collaborators that store and verify it.

mod model;
mod password;
mod postgres;
mod store;
pub mod validation;

pub use model::Identity;
pub use password::{
    hash_password, verify_password, Argon2Verifier, PasswordError, PasswordVerifier,
};
pub use postgres::PgAccountStore;
pub use store::{grant_admin, AccountField, AccountStore, AccountStoreError, MemoryAccountStore};
