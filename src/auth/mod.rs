pub mod password;
pub mod service;
pub mod token;
pub mod validation;

pub use service::{AuthService, SigninOutcome, SignupOutcome};
pub use token::{Claims, TokenKeys};
