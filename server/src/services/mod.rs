//! Auth domain services: credential hashing, the account directory, session
//! proofs, and the orchestrating auth service.

pub mod auth;
pub mod directory;
pub mod password;
pub mod session;
