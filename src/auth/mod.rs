pub mod claims;
pub mod context;
pub mod jwks;
pub mod middleware;

pub use claims::Claims;
pub use context::{AuthContext, Papel};
pub use jwks::JwksCache;
pub use middleware::RequireAuth;
