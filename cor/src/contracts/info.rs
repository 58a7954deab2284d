//! Human-readable contract descriptions.

use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
enum Source {
    Fixed(String),
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

/// Description of what a conversion accepts.
///
/// Either a fixed string or a closure evaluated every time the description is
/// rendered, so descriptions composed from other operations stay cheap to build.
#[derive(Clone)]
pub struct ContractInfo(Source);

impl ContractInfo {
    /// Creates a fixed description.
    #[must_use]
    pub fn new(info: impl Into<String>) -> Self {
        Self(Source::Fixed(info.into()))
    }

    /// Creates a lazily rendered description.
    #[must_use]
    pub fn lazy(info: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Source::Lazy(Arc::new(info)))
    }

    /// Renders the description.
    #[must_use]
    pub fn contract(&self) -> String {
        match &self.0 {
            Source::Fixed(s) => s.clone(),
            Source::Lazy(f) => f(),
        }
    }
}

impl fmt::Display for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.contract())
    }
}

impl fmt::Debug for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContractInfo").field(&self.contract()).finish()
    }
}

impl From<&str> for ContractInfo {
    fn from(info: &str) -> Self {
        Self::new(info)
    }
}

impl From<String> for ContractInfo {
    fn from(info: String) -> Self {
        Self::new(info)
    }
}
