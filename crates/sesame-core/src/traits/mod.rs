//! Seam traits for the remote API and credential persistence.

mod identity;
mod store;

pub use identity::IdentityApi;
pub use store::{CredentialStore, StoredAuth};
