pub mod auth;
pub mod common;
pub mod drawing;

pub use auth::*;
pub use common::*;
pub use drawing::*;
