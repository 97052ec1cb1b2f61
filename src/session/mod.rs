//! Signing sessions: the store and the chunk reassembler

pub mod reassembler;
pub mod store;

pub use reassembler::Reassembler;
pub use store::{SessionState, SessionStore, SigningSession};
