//! Core types for the Copper State Foods storefront.

pub mod cart;
pub mod money;
pub mod product;

pub use cart::*;
pub use money::Money;
pub use product::*;
