//! Authentication feature: state, actions, reducer, effects, selectors.

mod actions;
mod effects;
mod reducer;
pub mod selectors;
mod state;

pub use actions::{AuthAction, Session};
pub use effects::{AuthEffects, failure_message};
pub use reducer::reduce;
pub use state::AuthState;
