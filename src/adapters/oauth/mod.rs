//! OAuth token endpoint adapters.

mod http_token_client;

pub use http_token_client::{HttpOAuthTokenClient, OAuthClientCredentials};
