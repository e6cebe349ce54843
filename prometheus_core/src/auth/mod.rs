pub mod service;
pub mod session;

pub use service::{AdminAccess, AuthService, ADMIN_KEY_HEADER};
pub use session::{
    create_token, create_token_at, verify_token, verify_token_at, AdminSession, InvalidSession,
    SessionClaims,
};
