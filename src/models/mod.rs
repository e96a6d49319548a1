pub mod generation;
pub mod provider;

pub use generation::*;
pub use provider::*;
