//! Generation service clients and prompt construction

pub mod chat_client;
pub mod credentials;
pub mod endpoint_client;
pub mod http_client;
pub mod json_parser;
pub mod prompts;
pub mod service;

pub use chat_client::ChatCompletionClient;
pub use credentials::CredentialManager;
pub use endpoint_client::EndpointClient;
pub use service::DeckService;
