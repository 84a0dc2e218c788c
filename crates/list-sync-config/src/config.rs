use list_sync_models::ListStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simkl: Option<SimklConfig>,
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Status mapping configuration for converting between service-native and client statuses
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusMapping {
    /// Map service-native status → client status (for reads)
    #[serde(default)]
    pub to_client: HashMap<String, ListStatus>,

    /// Map client status → service-native status (for writes)
    #[serde(default)]
    pub from_client: HashMap<ListStatus, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimklConfig {
    pub enabled: bool,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_simkl_status_mapping")]
    pub status_mapping: StatusMapping,
}

impl SimklConfig {
    /// Reject empty or placeholder app credentials
    pub fn validate_credentials(&self) -> anyhow::Result<()> {
        if self.client_id.is_empty() || self.client_id == "YOUR_CLIENT_ID" {
            return Err(anyhow::anyhow!("Simkl is enabled but client_id is not configured"));
        }
        if self.client_secret.is_empty() || self.client_secret == "YOUR_CLIENT_SECRET" {
            return Err(anyhow::anyhow!("Simkl is enabled but client_secret is not configured"));
        }
        Ok(())
    }
}

/// Base URLs of the remote services a list plugin talks to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EndpointConfig {
    #[serde(default = "default_simkl_api")]
    pub simkl_api: String,
    #[serde(default = "default_arm_api")]
    pub arm_api: String,
    #[serde(default = "default_anilist_graphql")]
    pub anilist_graphql: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            simkl_api: default_simkl_api(),
            arm_api: default_arm_api(),
            anilist_graphql: default_anilist_graphql(),
        }
    }
}

fn default_simkl_api() -> String {
    "https://api.simkl.com".to_string()
}

fn default_arm_api() -> String {
    "https://arm.haglund.dev".to_string()
}

fn default_anilist_graphql() -> String {
    "https://graphql.anilist.co".to_string()
}

pub fn default_simkl_status_mapping() -> StatusMapping {
    use ListStatus::*;

    let mut to_client = HashMap::new();
    to_client.insert("watching".to_string(), Current);
    to_client.insert("plantowatch".to_string(), Planning);
    to_client.insert("completed".to_string(), Completed);
    to_client.insert("dropped".to_string(), Dropped);
    to_client.insert("hold".to_string(), Paused);
    to_client.insert("notinteresting".to_string(), Dropped);

    let mut from_client = HashMap::new();
    from_client.insert(Current, "watching".to_string());
    from_client.insert(Planning, "plantowatch".to_string());
    from_client.insert(Completed, "completed".to_string());
    from_client.insert(Dropped, "dropped".to_string());
    from_client.insert(Paused, "hold".to_string());
    // Simkl has no rewatching status
    from_client.insert(Repeating, "watching".to_string());

    StatusMapping { to_client, from_client }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(simkl) = self.simkl.as_ref().filter(|simkl| simkl.enabled) {
            simkl.validate_credentials()?;
        }

        for (name, url) in [
            ("simkl_api", &self.endpoints.simkl_api),
            ("arm_api", &self.endpoints.arm_api),
            ("anilist_graphql", &self.endpoints.anilist_graphql),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("Endpoint {} must be an http(s) URL, got '{}'", name, url));
            }
        }

        Ok(())
    }

    pub fn is_simkl_configured(&self) -> bool {
        self.simkl
            .as_ref()
            .is_some_and(|simkl| simkl.enabled && simkl.validate_credentials().is_ok())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simkl: None,
            endpoints: EndpointConfig::default(),
        }
    }
}
