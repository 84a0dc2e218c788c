pub mod api;
pub mod auth;
pub mod client;
pub mod plugin;

pub use api::{SimklApi, SimklListEntry, SimklStatus};
pub use auth::authenticate as simkl_authenticate;
pub use client::SimklClient;
pub use plugin::SimklListPlugin;
