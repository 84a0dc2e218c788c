use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use list_sync_config::{Config, CredentialStore, PathManager};
use list_sync_models::{CatalogId, EditListEntryOptions, ListEntriesQuery, ListEntry, ListStatus};
use list_sync_plugins::{ListPlugin, ListPluginRegistry, ListSyncError};
use tracing::debug;

const SERVICE: &str = "simkl";

/// One list operation requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    Entry(CatalogId),
    List(ListEntriesQuery),
    Add(CatalogId),
    Remove(CatalogId),
    Rewatch(CatalogId),
    Progress(CatalogId, u32),
    Score(CatalogId, u32),
    Status(CatalogId, ListStatus),
    Edit(CatalogId, EditListEntryOptions),
}

#[derive(Debug, PartialEq)]
pub enum ActionOutcome {
    Entry(Option<ListEntry>),
    Entries(Vec<ListEntry>),
    Updated(ListEntry),
    Removed(bool),
}

pub async fn perform(plugin: &dyn ListPlugin, action: ListAction) -> Result<ActionOutcome, ListSyncError> {
    debug!("Running {:?} against {}", action, plugin.service());

    let outcome = match action {
        ListAction::Entry(id) => ActionOutcome::Entry(plugin.get_list_entry(id).await?),
        ListAction::List(query) => ActionOutcome::Entries(plugin.get_list_entries(&query).await?),
        ListAction::Add(id) => ActionOutcome::Updated(plugin.add_to_list(id).await?),
        ListAction::Remove(id) => ActionOutcome::Removed(plugin.delete_from_list(id).await?),
        ListAction::Rewatch(id) => ActionOutcome::Updated(plugin.start_rewatching(id).await?),
        ListAction::Progress(id, progress) => ActionOutcome::Updated(plugin.update_progress(id, progress).await?),
        ListAction::Score(id, score) => ActionOutcome::Updated(plugin.update_score(id, score).await?),
        ListAction::Status(id, status) => ActionOutcome::Updated(plugin.update_status(id, status).await?),
        ListAction::Edit(id, options) => ActionOutcome::Updated(plugin.edit_list_entry(id, &options).await?),
    };
    Ok(outcome)
}

pub async fn run_list_action(action: ListAction, output: &Output) -> Result<()> {
    let plugin = load_plugin().await?;

    if !plugin.is_available() {
        return Err(color_eyre::eyre::eyre!(
            "Not signed in to Simkl. Run 'listsync config simkl' to authenticate"
        ));
    }

    let outcome = perform(plugin.as_ref(), action)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{} failed: {}", e.operation(), e))?;

    render(outcome, output);
    Ok(())
}

async fn load_plugin() -> Result<Box<dyn ListPlugin>> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'listsync config simkl' first",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let registry = ListPluginRegistry::new();
    registry
        .validate_all_configs(&config)
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;

    let credentials_file = path_manager.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    registry
        .create_plugin_by_name(SERVICE, &config, &credentials)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create {} plugin: {}", SERVICE, e))?
        .ok_or_else(|| color_eyre::eyre::eyre!("Simkl is not enabled. Run 'listsync config simkl' first"))
}

fn render(outcome: ActionOutcome, output: &Output) {
    match outcome {
        ActionOutcome::Entry(entry) => output.entry(entry.as_ref()),
        ActionOutcome::Entries(entries) => output.entries(&entries),
        ActionOutcome::Updated(entry) => {
            if output.format() == OutputFormat::Human {
                output.success(format!("Updated AniList {}", entry.media_id));
            }
            output.entry(Some(&entry));
        }
        ActionOutcome::Removed(true) => output.success("Removed from list"),
        ActionOutcome::Removed(false) => output.warn("Simkl did not confirm the removal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use list_sync_plugins::{ListPluginType, Operation};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlugin {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingPlugin {
        fn record(&self, call: String) -> ListEntry {
            self.calls.lock().unwrap().push(call);
            ListEntry { id: 1, media_id: 21, progress: 0, rewatched: 0, score: 0, status: ListStatus::Current }
        }
    }

    #[async_trait]
    impl ListPlugin for RecordingPlugin {
        fn service(&self) -> &str {
            "recording"
        }

        fn plugin_type(&self) -> ListPluginType {
            ListPluginType::Full
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn get_list_entry(&self, catalog_id: CatalogId) -> Result<Option<ListEntry>, ListSyncError> {
            self.record(format!("get {}", catalog_id));
            Ok(None)
        }

        async fn get_list_entries(&self, query: &ListEntriesQuery) -> Result<Vec<ListEntry>, ListSyncError> {
            Ok(vec![self.record(format!("list {:?} {:?}", query.page, query.per_page))])
        }

        async fn add_to_list(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError> {
            Ok(self.record(format!("add {}", catalog_id)))
        }

        async fn delete_from_list(&self, catalog_id: CatalogId) -> Result<bool, ListSyncError> {
            self.record(format!("delete {}", catalog_id));
            Ok(true)
        }

        async fn start_rewatching(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError> {
            Ok(self.record(format!("rewatch {}", catalog_id)))
        }

        async fn update_progress(&self, catalog_id: CatalogId, progress: u32) -> Result<ListEntry, ListSyncError> {
            Ok(self.record(format!("progress {} {}", catalog_id, progress)))
        }

        async fn update_score(&self, _catalog_id: CatalogId, _score: u32) -> Result<ListEntry, ListSyncError> {
            Err(ListSyncError::IdentifierUnresolved { operation: Operation::UpdateScore })
        }

        async fn update_status(&self, catalog_id: CatalogId, status: ListStatus) -> Result<ListEntry, ListSyncError> {
            Ok(self.record(format!("status {} {}", catalog_id, status)))
        }

        async fn edit_list_entry(
            &self,
            catalog_id: CatalogId,
            options: &EditListEntryOptions,
        ) -> Result<ListEntry, ListSyncError> {
            Ok(self.record(format!("edit {} {} {} {:?}", catalog_id, options.status, options.progress, options.score)))
        }
    }

    #[tokio::test]
    async fn test_actions_dispatch_to_plugin() {
        let plugin = RecordingPlugin::default();

        let actions = vec![
            ListAction::Entry(5),
            ListAction::List(ListEntriesQuery::new(Some(2), Some(10))),
            ListAction::Add(5),
            ListAction::Remove(5),
            ListAction::Rewatch(5),
            ListAction::Progress(5, 3),
            ListAction::Status(5, ListStatus::Paused),
            ListAction::Edit(5, EditListEntryOptions { score: Some(70), progress: 2, status: ListStatus::Current }),
        ];
        for action in actions {
            perform(&plugin, action).await.unwrap();
        }

        assert_eq!(
            *plugin.calls.lock().unwrap(),
            vec![
                "get 5",
                "list Some(2) Some(10)",
                "add 5",
                "delete 5",
                "rewatch 5",
                "progress 5 3",
                "status 5 PAUSED",
                "edit 5 CURRENT 2 Some(70)",
            ]
        );
    }

    #[tokio::test]
    async fn test_outcomes() {
        let plugin = RecordingPlugin::default();

        assert_eq!(perform(&plugin, ListAction::Entry(1)).await.unwrap(), ActionOutcome::Entry(None));
        assert_eq!(perform(&plugin, ListAction::Remove(1)).await.unwrap(), ActionOutcome::Removed(true));
        assert!(matches!(
            perform(&plugin, ListAction::List(ListEntriesQuery::default())).await.unwrap(),
            ActionOutcome::Entries(entries) if entries.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_plugin_errors_pass_through() {
        let plugin = RecordingPlugin::default();

        let err = perform(&plugin, ListAction::Score(1, 50)).await.unwrap_err();
        assert_eq!(err.operation(), Operation::UpdateScore);
        assert_eq!(err.to_string(), "Could not find necessary data to add item to list.");
    }
}
