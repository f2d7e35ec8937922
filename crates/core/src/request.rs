//! Intercepted request descriptors and classification.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Scope};

/// Declared request mode, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// A read-only descriptor of one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    /// Header pairs; names are matched case-insensitively.
    pub headers: Vec<(String, String)>,
}

impl InterceptedRequest {
    /// A `GET` request with no headers.
    pub fn get(url: Url, mode: RequestMode) -> Self {
        Self { method: "GET".into(), url, mode, headers: Vec::new() }
    }

    /// Resolve `locator` against `scope` and build a `GET` request for it.
    pub fn for_locator(scope: &Scope, locator: &str, mode: RequestMode) -> Result<Self, Error> {
        Ok(Self::get(scope.resolve(locator)?, mode))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// What the request is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Navigation,
    StaticAsset,
}

/// Whether the request targets the scope's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    SameOrigin,
    CrossOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Classification {
    pub kind: RequestKind,
    pub origin: OriginClass,
}

/// Classify a request relative to the scope.
///
/// A request is a navigation if its mode is `navigate` or its `Accept`
/// header asks for `text/html`. Everything else is a static asset.
pub fn classify(request: &InterceptedRequest, scope: &Scope) -> Classification {
    let wants_html = request
        .header("accept")
        .is_some_and(|accept| accept.contains("text/html"));

    let kind = if request.mode == RequestMode::Navigate || wants_html {
        RequestKind::Navigation
    } else {
        RequestKind::StaticAsset
    };

    let origin = if scope.is_same_origin(&request.url) { OriginClass::SameOrigin } else { OriginClass::CrossOrigin };

    Classification { kind, origin }
}
