//! Base scope and relative locator resolution.
//!
//! The scope is derived once from configuration and never mutated. All cache
//! keys and core asset locators are produced by [`Scope::resolve`].

use url::{Origin, Url};

use crate::Error;

/// The base URL the worker governs, e.g. `https://user.github.io/repo/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    base: Url,
}

impl Scope {
    /// Parse a scope URL.
    ///
    /// Only `http` and `https` scopes are accepted. The path is normalized to
    /// end in `/` so that relative paths resolve beneath it rather than next
    /// to its last segment.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPath("empty scope".into()));
        }

        let mut base = Url::parse(trimmed).map_err(|e| Error::InvalidPath(format!("{trimmed}: {e}")))?;

        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidPath(format!("unsupported scope scheme: {scheme}"))),
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    /// The scope URL itself.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The scope's scheme + host + port.
    pub fn origin(&self) -> Origin {
        self.base.origin()
    }

    /// Whether `url` shares the scope's origin.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }

    /// Resolve a path relative to the scope into a canonical absolute URL.
    ///
    /// Fragments are dropped. An absolute URL resolves to itself, so
    /// resolving an already-resolved locator is a no-op.
    pub fn resolve(&self, relative: &str) -> Result<Url, Error> {
        let mut url = self
            .base
            .join(relative.trim())
            .map_err(|e| Error::InvalidPath(format!("{relative}: {e}")))?;
        url.set_fragment(None);
        Ok(url)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::parse("https://user.github.io/repo/").unwrap()
    }

    #[test]
    fn test_resolve_relative() {
        let url = scope().resolve("index.html").unwrap();
        assert_eq!(url.as_str(), "https://user.github.io/repo/index.html");
    }

    #[test]
    fn test_resolve_dot_relative() {
        let url = scope().resolve("./icons/icon-192x192.png").unwrap();
        assert_eq!(url.as_str(), "https://user.github.io/repo/icons/icon-192x192.png");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let s = scope();
        let once = s.resolve("assets/app.js?v=3").unwrap();
        let twice = s.resolve(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_drops_fragment() {
        let url = scope().resolve("index.html#top").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.as_str(), "https://user.github.io/repo/index.html");
    }

    #[test]
    fn test_resolve_invalid() {
        let result = scope().resolve("http://[::1");
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_scope_gets_trailing_slash() {
        let s = Scope::parse("https://user.github.io/repo").unwrap();
        assert_eq!(s.base().as_str(), "https://user.github.io/repo/");
        assert_eq!(s.resolve("sw.js").unwrap().as_str(), "https://user.github.io/repo/sw.js");
    }

    #[test]
    fn test_scope_rejects_other_schemes() {
        assert!(matches!(Scope::parse("file:///srv/site/"), Err(Error::InvalidPath(_))));
        assert!(matches!(Scope::parse("  "), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_same_origin() {
        let s = scope();
        assert!(s.is_same_origin(&Url::parse("https://user.github.io/other/x.css").unwrap()));
        assert!(!s.is_same_origin(&Url::parse("https://cdn.example.com/x.css").unwrap()));
        assert!(!s.is_same_origin(&Url::parse("http://user.github.io/repo/").unwrap()));
    }
}
