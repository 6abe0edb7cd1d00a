// === PUBLIC CONTRACT ===
// Models, the record store port and its errors
pub mod contract;

pub use contract::{client, error, model};

// === MODULE WIRING ===
pub mod module;
pub use module::UserRecords;

// === CONTROLLERS AND ADAPTERS ===
pub mod domain;
pub mod infra;
