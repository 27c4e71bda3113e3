//! Request handlers.

pub mod health;
pub mod pages;
pub mod predict;

pub use health::*;
pub use pages::*;
pub use predict::*;
