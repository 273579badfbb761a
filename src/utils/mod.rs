pub mod drawing_id;
pub mod jwt;
pub mod password;

pub use drawing_id::*;
pub use jwt::*;
pub use password::*;
