//! Plugin factory pattern for creating list plugins from configuration
//!
//! Each list service registers a factory that knows how to wire its plugin
//! together with the HTTP-backed collaborators it needs.

use anyhow::Result;
use async_trait::async_trait;
use list_sync_config::{Config, CredentialStore};
use std::collections::HashMap;

use crate::traits::ListPlugin;

/// Factory trait for creating list plugins from configuration
#[async_trait]
pub trait PluginFactory: Send + Sync {
    /// The name of the service this factory creates a plugin for
    fn service_name(&self) -> &str;

    /// Create a plugin instance from configuration.
    /// Returns None if the service is not enabled or not configured
    async fn create_plugin(
        &self,
        config: &Config,
        credentials: &CredentialStore,
    ) -> Result<Option<Box<dyn ListPlugin>>>;

    /// Validate that the service configuration is usable
    fn validate_config(&self, config: &Config) -> Result<()>;
}

/// Registry of plugin factories
pub struct ListPluginRegistry {
    factories: HashMap<String, Box<dyn PluginFactory>>,
}

impl ListPluginRegistry {
    /// Create a new registry with all built-in factories registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register(Box::new(simkl::SimklPluginFactory));

        registry
    }

    pub fn register(&mut self, factory: Box<dyn PluginFactory>) {
        self.factories.insert(factory.service_name().to_string(), factory);
    }

    /// Create a specific plugin by service name
    pub async fn create_plugin_by_name(
        &self,
        name: &str,
        config: &Config,
        credentials: &CredentialStore,
    ) -> Result<Option<Box<dyn ListPlugin>>> {
        match self.factories.get(name) {
            Some(factory) => factory.create_plugin(config, credentials).await,
            None => Ok(None),
        }
    }

    pub fn validate_all_configs(&self, config: &Config) -> Result<()> {
        for factory in self.factories.values() {
            factory.validate_config(config)?;
        }
        Ok(())
    }

}

impl Default for ListPluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

mod simkl {
    use super::*;
    use crate::anilist::{AniListGraph, GraphqlClient};
    use crate::arm::ArmClient;
    use crate::http::create_http_client;
    use crate::session::CredentialSession;
    use crate::simkl::{SimklClient, SimklListPlugin};
    use std::sync::Arc;
    use tracing::debug;

    pub struct SimklPluginFactory;

    #[async_trait]
    impl PluginFactory for SimklPluginFactory {
        fn service_name(&self) -> &str {
            SimklListPlugin::SERVICE
        }

        async fn create_plugin(
            &self,
            config: &Config,
            credentials: &CredentialStore,
        ) -> Result<Option<Box<dyn ListPlugin>>> {
            let Some(simkl_config) = config.simkl.as_ref().filter(|simkl| simkl.enabled) else {
                return Ok(None);
            };

            let http = Arc::new(create_http_client());
            let endpoints = &config.endpoints;

            let simkl = SimklClient::new(http.clone(), &endpoints.simkl_api, simkl_config.client_id.clone())
                .with_access_token(credentials.access_token(SimklListPlugin::SERVICE).map(str::to_string))
                .with_status_mapping(simkl_config.status_mapping.clone());
            let arm = ArmClient::new(http.clone(), &endpoints.arm_api);
            let graphql = Arc::new(GraphqlClient::new(http, &endpoints.anilist_graphql));

            debug!(
                "Creating Simkl plugin (api: {}, arm: {}, graphql: {})",
                endpoints.simkl_api, endpoints.arm_api, endpoints.anilist_graphql
            );

            Ok(Some(Box::new(SimklListPlugin::new(
                Arc::new(simkl),
                Arc::new(arm),
                Arc::new(AniListGraph::new(graphql)),
                Arc::new(CredentialSession::new(credentials.clone())),
            ))))
        }

        fn validate_config(&self, config: &Config) -> Result<()> {
            match config.simkl.as_ref().filter(|simkl| simkl.enabled) {
                Some(simkl_config) => simkl_config.validate_credentials(),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use list_sync_config::{default_simkl_status_mapping, ServiceTokens, SimklConfig};
    use tempfile::NamedTempFile;

    fn simkl_config(enabled: bool, client_id: &str) -> Config {
        Config {
            simkl: Some(SimklConfig {
                enabled,
                client_id: client_id.to_string(),
                client_secret: "secret".to_string(),
                status_mapping: default_simkl_status_mapping(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_placeholder_client_id() {
        let registry = ListPluginRegistry::default();
        assert!(registry.validate_all_configs(&simkl_config(true, "YOUR_CLIENT_ID")).is_err());
        assert!(registry.validate_all_configs(&simkl_config(false, "YOUR_CLIENT_ID")).is_ok());
        assert!(registry.validate_all_configs(&simkl_config(true, "abc")).is_ok());

        let mut no_secret = simkl_config(true, "abc");
        if let Some(simkl) = no_secret.simkl.as_mut() {
            simkl.client_secret = "YOUR_CLIENT_SECRET".to_string();
        }
        let error = registry.validate_all_configs(&no_secret).unwrap_err();
        assert_eq!(error.to_string(), "Simkl is enabled but client_secret is not configured");
    }

    #[tokio::test]
    async fn test_disabled_or_unknown_service_creates_nothing() {
        let file = NamedTempFile::new().unwrap();
        let credentials = CredentialStore::new(file.path().to_path_buf());
        let registry = ListPluginRegistry::new();

        let disabled = registry
            .create_plugin_by_name("simkl", &simkl_config(false, "abc"), &credentials)
            .await
            .unwrap();
        assert!(disabled.is_none());

        let unknown = registry
            .create_plugin_by_name("anilist", &simkl_config(true, "abc"), &credentials)
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_plugin_availability_follows_credentials() {
        let file = NamedTempFile::new().unwrap();
        let mut credentials = CredentialStore::new(file.path().to_path_buf());
        let registry = ListPluginRegistry::new();
        let config = simkl_config(true, "abc");

        let plugin = registry
            .create_plugin_by_name("simkl", &config, &credentials)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plugin.service(), "simkl");
        assert!(!plugin.is_available());

        credentials.set_tokens("simkl", ServiceTokens::new("token"));
        let plugin = registry
            .create_plugin_by_name("simkl", &config, &credentials)
            .await
            .unwrap()
            .unwrap();
        assert!(plugin.is_available());
    }
}
