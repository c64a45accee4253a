//! Authentication module: password hashing, access tokens, bearer middleware

pub mod clock;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use clock::{Clock, ManualClock, SystemClock};
pub use jwt::{AccessToken, Claims, TokenService};
pub use middleware::{bearer_auth_middleware, extract_token, AuthContext};
pub use password::PasswordHasher;
