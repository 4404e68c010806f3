//! Path rewriting — transforms the inbound path before forwarding
//!
//! Different deployments rewrite differently, so the rewrite step is a
//! trait seam rather than a fixed rule. The default forwards the inbound
//! path unchanged; a strip-prefix rewrite is available from route config.

/// A pluggable path rewrite applied before forwarding to an upstream
pub trait PathRewrite: Send + Sync {
    /// Map an inbound path to the upstream path for the given service
    fn rewrite(&self, path: &str, service: &str) -> String;
}

/// Forwards the inbound path unchanged
pub struct IdentityRewrite;

impl PathRewrite for IdentityRewrite {
    fn rewrite(&self, path: &str, _service: &str) -> String {
        path.to_string()
    }
}

/// Removes a fixed prefix from the inbound path.
///
/// The result always starts with '/'; stripping the whole path yields "/".
pub struct StripPrefixRewrite {
    prefix: String,
}

impl StripPrefixRewrite {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathRewrite for StripPrefixRewrite {
    fn rewrite(&self, path: &str, _service: &str) -> String {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            Some(rest) => format!("/{}", rest),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let rw = IdentityRewrite;
        assert_eq!(rw.rewrite("/v1/users/42", "user-service"), "/v1/users/42");
    }

    #[test]
    fn test_strip_prefix() {
        let rw = StripPrefixRewrite::new("/v1");
        assert_eq!(rw.rewrite("/v1/users/42", "user-service"), "/users/42");
    }

    #[test]
    fn test_strip_prefix_exact() {
        let rw = StripPrefixRewrite::new("/v1/users");
        assert_eq!(rw.rewrite("/v1/users", "user-service"), "/");
    }

    #[test]
    fn test_strip_prefix_no_match() {
        let rw = StripPrefixRewrite::new("/v2");
        assert_eq!(rw.rewrite("/v1/users", "user-service"), "/v1/users");
    }
}
