pub mod graphql;
pub mod queries;

pub use graphql::GraphqlClient;
pub use queries::AniListGraph;
