pub mod extract;
pub mod jwt;

pub use extract::AuthUser;
pub use jwt::{Claims, JwtKeys};
