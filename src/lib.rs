//! TaskFlow client session layer.
//!
//! ARCHITECTURE
//! ============
//! - `store`: root state, actions, reducers, effects, selectors, runtime.
//! - `services`: backend collaborators (`AuthApi` mock and HTTP clients).
//! - `storage`: durable key-value persistence for the session tokens.
//! - `navigation`: route changes requested by effects.
//! - `models`: DTOs shared by every layer.
//! - `config`, `clock`: environment-driven settings and injectable time/ids.

pub mod clock;
pub mod config;
pub mod models;
pub mod navigation;
pub mod services;
pub mod storage;
pub mod store;
