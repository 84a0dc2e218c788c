use std::fmt;
use thiserror::Error;

/// The list operation an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ResolveExternalId,
    GetListEntry,
    GetListEntries,
    AddToList,
    DeleteFromList,
    StartRewatching,
    UpdateProgress,
    UpdateScore,
    UpdateStatus,
    EditListEntry,
}

impl Operation {
    /// User-facing message for a write whose result could not be read back
    pub fn read_back_message(&self) -> &'static str {
        match self {
            Operation::UpdateStatus | Operation::AddToList => "Failed to update list entry on Simkl.",
            Operation::EditListEntry => "Failed to save list entry on Simkl.",
            _ => "Failed to update item.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ResolveExternalId => "ResolveExternalId",
            Operation::GetListEntry => "GetListEntry",
            Operation::GetListEntries => "GetListEntries",
            Operation::AddToList => "AddToList",
            Operation::DeleteFromList => "DeleteFromList",
            Operation::StartRewatching => "StartRewatching",
            Operation::UpdateProgress => "UpdateProgress",
            Operation::UpdateScore => "UpdateScore",
            Operation::UpdateStatus => "UpdateStatus",
            Operation::EditListEntry => "EditListEntry",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ListSyncError {
    /// No external id could be found for the catalog id
    #[error("Could not find necessary data to add item to list.")]
    IdentifierUnresolved { operation: Operation },

    /// A write went through but reading the record back returned nothing
    #[error("{}", .operation.read_back_message())]
    ReadBackEmpty { operation: Operation },

    /// A collaborator (HTTP, GraphQL, id mapping) failed; its message is kept as is
    #[error("{source}")]
    UpstreamFailure {
        operation: Operation,
        #[source]
        source: anyhow::Error,
    },
}

impl ListSyncError {
    pub fn operation(&self) -> Operation {
        match self {
            ListSyncError::IdentifierUnresolved { operation }
            | ListSyncError::ReadBackEmpty { operation }
            | ListSyncError::UpstreamFailure { operation, .. } => *operation,
        }
    }
}

/// Tags collaborator failures with the operation that issued the call
pub(crate) trait UpstreamExt<T> {
    fn upstream(self, operation: Operation) -> Result<T, ListSyncError>;
}

impl<T> UpstreamExt<T> for anyhow::Result<T> {
    fn upstream(self, operation: Operation) -> Result<T, ListSyncError> {
        self.map_err(|source| ListSyncError::UpstreamFailure { operation, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_back_messages_by_call_site() {
        let message = |operation| ListSyncError::ReadBackEmpty { operation }.to_string();
        assert_eq!(message(Operation::UpdateProgress), "Failed to update item.");
        assert_eq!(message(Operation::UpdateScore), "Failed to update item.");
        assert_eq!(message(Operation::UpdateStatus), "Failed to update list entry on Simkl.");
        assert_eq!(message(Operation::AddToList), "Failed to update list entry on Simkl.");
        assert_eq!(message(Operation::StartRewatching), "Failed to update item.");
        assert_eq!(message(Operation::EditListEntry), "Failed to save list entry on Simkl.");
    }

    #[test]
    fn test_upstream_message_is_unchanged() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("Failed to fetch list: 500 - boom"));
        let err = result.upstream(Operation::GetListEntries).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch list: 500 - boom");
        assert_eq!(err.operation(), Operation::GetListEntries);
    }

    #[test]
    fn test_unresolved_message() {
        let err = ListSyncError::IdentifierUnresolved { operation: Operation::UpdateScore };
        assert_eq!(err.to_string(), "Could not find necessary data to add item to list.");
        assert_eq!(err.operation(), Operation::UpdateScore);
    }
}
