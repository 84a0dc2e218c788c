pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, EndpointConfig, SimklConfig, StatusMapping, default_simkl_status_mapping};
pub use credentials::{CredentialStore, ServiceTokens};
pub use paths::{PathManager, container_base_path};
