//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod flow;
pub mod login;
pub mod logout;
pub mod orchestrator;
pub mod refresh;
pub mod token_issuer;
pub mod token_signer;

// Re-exports
pub use authenticate::{AuthenticateUseCase, AuthenticatedUser};
pub use config::AuthConfig;
pub use flow::{AuthFlow, FlowStage};
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use orchestrator::AuthOrchestrator;
pub use refresh::RefreshUseCase;
pub use token_issuer::{TokenIssuer, TokenPair};
pub use token_signer::{HmacSigningKey, SigningKey, TokenError, TokenSigner};
