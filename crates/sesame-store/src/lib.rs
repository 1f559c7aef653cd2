//! sesame-store - Credential storage scopes for the sesame toolkit.
//!
//! Two scopes back the persisted session: a durable file-backed scope that
//! survives restarts ([`FileStore`]) and a process-lifetime in-memory scope
//! ([`MemoryStore`]). [`ScopedStore`] composes the two behind the durable
//! remember marker, which is consulted before every read.

mod file;
mod memory;
mod scope;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use scope::ScopedStore;
