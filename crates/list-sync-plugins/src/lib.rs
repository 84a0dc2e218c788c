pub mod anilist;
pub mod arm;
pub mod capabilities;
pub mod error;
pub mod factory;
pub mod http;
pub mod session;
pub mod simkl;
pub mod traits;

pub use anilist::{AniListGraph, GraphqlClient};
pub use arm::ArmClient;
pub use capabilities::{IdMappingService, MediaGraph, MediaIdPair, RelatedIds, SessionState};
pub use error::{ListSyncError, Operation};
pub use factory::{ListPluginRegistry, PluginFactory};
pub use session::CredentialSession;
pub use simkl::{simkl_authenticate, SimklClient, SimklListPlugin};
pub use traits::{ListPlugin, ListPluginType};
