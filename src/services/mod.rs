pub mod auth_service;
pub mod drawing_service;
pub mod events;

pub use auth_service::*;
pub use drawing_service::*;
pub use events::*;
