//! Environment lookup for proxy credentials

use std::collections::HashMap;
use std::env;

/// Proxy API key, sent as `x-proxy-api-key`
pub const PROXY_API_KEY: &str = "PROXY_API_KEY";

/// Proxy-issued virtual key, used as the bearer credential
pub const PROXY_VIRTUAL_KEY: &str = "PROXY_VIRTUAL_KEY";

/// Fallback gateway base URL when the config has no `proxy_url`
pub const PROXY_BASE_URL: &str = "PROXY_BASE_URL";

/// Read-only source of environment variables.
///
/// The process environment is the normal source; tests pass a `HashMap`.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_environment_lookup() {
        let mut vars = HashMap::new();
        vars.insert(PROXY_API_KEY.to_string(), "k1".to_string());

        assert_eq!(vars.var(PROXY_API_KEY).as_deref(), Some("k1"));
        assert_eq!(vars.var(PROXY_VIRTUAL_KEY), None);
    }

    #[test]
    fn test_reference_forwards_lookup() {
        let mut vars = HashMap::new();
        vars.insert(PROXY_BASE_URL.to_string(), "https://gw".to_string());
        let by_ref = &vars;

        assert_eq!(by_ref.var(PROXY_BASE_URL).as_deref(), Some("https://gw"));
    }
}
