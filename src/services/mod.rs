//! External collaborators the store's effects talk to.
//!
//! ARCHITECTURE
//! ============
//! Each collaborator is a trait with interchangeable implementations chosen
//! by the composition root, so effects never know whether they are talking
//! to a mock or to the network.

pub mod auth;
