use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("listsync/", env!("CARGO_PKG_VERSION"));

/// Create the reqwest Client shared by every service client
pub fn create_http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Strip a trailing slash so paths can be appended with `format!("{}/...")`
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("https://api.simkl.com/"), "https://api.simkl.com");
        assert_eq!(trim_base_url("https://api.simkl.com"), "https://api.simkl.com");
    }
}
