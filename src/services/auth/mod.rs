pub mod authenticator;
pub mod claims;
pub mod clock;
pub mod factory;
pub mod principal;
pub mod token_service;

pub use authenticator::{AnonymousReason, AuthOutcome, Authenticator};
pub use claims::ClaimSet;
pub use factory::{build_authenticator, build_identity_lookup};
pub use principal::Principal;
pub use token_service::{TokenError, TokenService};
