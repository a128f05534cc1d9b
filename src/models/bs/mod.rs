//! Black-Scholes-Merton pricing kernel: characteristic terms, the closed-form
//! engine and its result types.

pub mod engine;
pub mod terms;
pub mod types;

pub use engine::BsmEngine;
pub use terms::CharacteristicTerms;
pub use types::{DeltaConvention, ExpiryBranch, GreeksResult};
