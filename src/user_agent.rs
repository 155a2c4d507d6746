//! User-Agent string for outbound service traffic.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/aetherload";

/// Default User-Agent for resolver requests.
#[must_use]
pub(crate) fn default_resolver_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("aetherload/{version} (media-metadata-tool; +{PROJECT_UA_URL})")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_ua_carries_version_and_project_url() {
        let ua = default_resolver_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("aetherload/")
                .and_then(|s| s.split(' ').next())
                .expect("UA has version"),
        );
    }

    #[test]
    fn test_resolver_ua_identifies_tool_kind() {
        assert!(default_resolver_user_agent().contains("media-metadata-tool"));
    }
}
