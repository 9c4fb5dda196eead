//! Where requests go and which credentials they carry.

/// Path appended to the base URL for every action call.
pub const ACTION_API_PATH: &str = "/data/api/3/action";

/// Path prefix used to probe which API versions a site serves.
pub const API_ROOT_PATH: &str = "/data/api";

/// Connection settings for one CKAN site.
///
/// An empty `base_url` means "the current origin": generated URLs are
/// origin-relative (`/data/api/...`) and the transport resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    api_key: Option<String>,
}

impl Endpoint {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attach an API key. An empty key leaves the endpoint unauthenticated.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() { None } else { Some(api_key) };
        self
    }

    /// Same site, no credentials.
    pub fn anonymous(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            api_key: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_origin_relative(&self) -> bool {
        self.base_url.is_empty()
    }

    pub fn action_url(&self, action: &str) -> String {
        format!("{}{ACTION_API_PATH}/{action}", self.base_url)
    }

    pub fn api_version_url(&self, version: u32) -> String {
        format!("{}{API_ROOT_PATH}/{version}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let endpoint = Endpoint::new("https://beta.avoindata.fi/");
        assert_eq!(endpoint.base_url(), "https://beta.avoindata.fi");
        assert_eq!(
            endpoint.action_url("organization_list"),
            "https://beta.avoindata.fi/data/api/3/action/organization_list"
        );
    }

    #[test]
    fn empty_base_url_yields_origin_relative_urls() {
        let endpoint = Endpoint::new("");
        assert!(endpoint.is_origin_relative());
        assert_eq!(endpoint.action_url("organization_list"), "/data/api/3/action/organization_list");
        assert_eq!(endpoint.api_version_url(3), "/data/api/3");
    }

    #[test]
    fn empty_api_key_is_treated_as_absent() {
        let endpoint = Endpoint::new("http://localhost:3000").with_api_key("");
        assert_eq!(endpoint.api_key(), None);
    }

    #[test]
    fn anonymous_drops_the_key_but_keeps_the_site() {
        let endpoint = Endpoint::new("http://localhost:3000").with_api_key("secret");
        let anonymous = endpoint.anonymous();
        assert_eq!(anonymous.base_url(), "http://localhost:3000");
        assert_eq!(anonymous.api_key(), None);
        assert_eq!(endpoint.api_key(), Some("secret"));
    }
}
