//! Parchment - contract lifecycle service
//!
//! Users define reusable blueprints (named sets of positioned form fields)
//! and materialize contracts from them. A contract carries its own copy of
//! the blueprint's fields plus mutable values, and advances through a fixed
//! approval pipeline enforced by the state machine in [`lifecycle`]:
//!
//! ```text
//! created -> approved -> sent -> signed -> locked
//!    \          \         \
//!     `----------`---------`--> revoked
//! ```
//!
//! Field values may only be edited while the contract is in a non-terminal
//! state. Everything around the state machine is conventional plumbing:
//! hyper routes over a MongoDB store.

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod routes;
pub mod server;
pub mod types;
pub mod validate;

pub use config::Args;
pub use lifecycle::{ContractFilter, ContractState, EditabilityError, TransitionError};
pub use server::{run, AppState};
pub use types::{ParchmentError, Result};
