//! Domain types for battle state

mod chakra;
mod effect;
mod side;

pub use chakra::ChakraPool;
pub use effect::{ActiveEffect, Ledger, Lifetime};
pub use side::SideState;
