pub mod claims;
pub mod jwt;
pub mod middleware;

pub use claims::Claims;
pub use jwt::{TokenError, TokenService};
pub use middleware::{AuthMiddleware, AuthenticatedUser};
