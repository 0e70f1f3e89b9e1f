//! Session state: the persisted credential and its decoded projection.

pub mod claims;
mod token_store;

pub use claims::{DecodeError, Session, SubjectId, decode, try_decode};
pub use token_store::{CredentialStorage, FileStorage, MemoryStorage, SessionContext, TokenStore};
