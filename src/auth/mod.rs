//! Authentication module
//!
//! Supports the two credential forms the HubSpot API accepts: private app
//! access tokens (bearer header) and legacy API keys (`hapikey` query
//! parameter). The `TokenRefresher` talks to the external credential
//! service for installations where tokens are managed out of process.

mod credential;
mod refresher;

pub use credential::Credential;
pub use refresher::{OAuthInfo, TokenRefresher};
