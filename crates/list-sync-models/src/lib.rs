pub mod ids;
pub mod list_entry;
pub mod query;
pub mod status;

pub use ids::{CatalogId, ExternalId, IdSource};
pub use list_entry::ListEntry;
pub use query::{EditListEntryOptions, ListEntriesQuery};
pub use status::ListStatus;
