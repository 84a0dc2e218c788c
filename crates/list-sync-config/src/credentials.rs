use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Tokens obtained from one service's sign-in flow
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ServiceTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }
}

/// `credentials.toml`: one table of tokens per service
///
/// ```toml
/// [simkl]
/// access_token = "..."
/// ```
#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    services: BTreeMap<String, ServiceTokens>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            services: BTreeMap::new(),
        }
    }

    /// Replace the in-memory tokens with the file's; a missing file leaves the store empty
    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            self.services = toml::from_str(&content)?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.services)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn tokens(&self, service: &str) -> Option<&ServiceTokens> {
        self.services.get(service)
    }

    pub fn set_tokens(&mut self, service: &str, tokens: ServiceTokens) {
        self.services.insert(service.to_string(), tokens);
    }

    /// Stored access token, ignoring empty ones
    pub fn access_token(&self, service: &str) -> Option<&str> {
        self.tokens(service)
            .map(|tokens| tokens.access_token.as_str())
            .filter(|token| !token.is_empty())
    }

    pub fn refresh_token(&self, service: &str) -> Option<&str> {
        self.tokens(service)
            .and_then(|tokens| tokens.refresh_token.as_deref())
            .filter(|token| !token.is_empty())
    }

    pub fn has_access_token(&self, service: &str) -> bool {
        self.access_token(service).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_tokens_survive_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let expires = Utc::now() + chrono::Duration::hours(1);

        let mut store = CredentialStore::new(path.clone());
        store.set_tokens(
            "simkl",
            ServiceTokens {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_at: Some(expires),
            },
        );
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.access_token("simkl"), Some("access"));
        assert_eq!(loaded.refresh_token("simkl"), Some("refresh"));
        let loaded_expires = loaded.tokens("simkl").and_then(|t| t.expires_at).unwrap();
        assert!((loaded_expires - expires).num_seconds().abs() < 2);
    }

    #[test]
    fn test_file_layout_is_one_table_per_service() {
        let file = NamedTempFile::new().unwrap();
        let mut store = CredentialStore::new(file.path().to_path_buf());
        store.set_tokens("simkl", ServiceTokens::new("abc"));
        store.save().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("[simkl]"));
        assert!(content.contains("access_token = \"abc\""));
        assert!(!content.contains("refresh_token"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert!(store.tokens("simkl").is_none());
    }

    #[test]
    fn test_has_access_token() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/listsync-credentials-test"));
        assert!(!store.has_access_token("simkl"));

        store.set_tokens("simkl", ServiceTokens::new(""));
        assert!(!store.has_access_token("simkl"));

        store.set_tokens("simkl", ServiceTokens::new("token"));
        assert!(store.has_access_token("simkl"));
        assert!(!store.has_access_token("anilist"));
    }
}
