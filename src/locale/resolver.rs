use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Maps a client network address to a locale code.
pub trait LocaleResolver: Send + Sync {
    /// `None` when the address cannot be placed.
    fn resolve_locale(&self, address: IpAddr) -> Option<String>;
}

/// Resolver that places every address in the same locale.
#[derive(Clone, Debug)]
pub struct FixedLocaleResolver {
    locale: String,
}

impl FixedLocaleResolver {
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

impl LocaleResolver for FixedLocaleResolver {
    fn resolve_locale(&self, _address: IpAddr) -> Option<String> {
        Some(self.locale.clone())
    }
}

/// Per-address cache in front of a [`LocaleResolver`].
///
/// The lock is never held while the resolver runs.
pub struct LocaleCache {
    resolver: Arc<dyn LocaleResolver>,
    default_locale: String,
    entries: Mutex<HashMap<IpAddr, String>>,
}

impl LocaleCache {
    #[must_use]
    pub fn new(resolver: Arc<dyn LocaleResolver>, default_locale: impl Into<String>) -> Self {
        Self {
            resolver,
            default_locale: default_locale.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Locale for a request coming from `address`.
    ///
    /// Missing, loopback and unspecified addresses get the default locale
    /// without a lookup. Failed lookups cache the default.
    pub async fn locale_for(&self, address: Option<IpAddr>) -> String {
        let Some(address) = address.filter(|ip| !ip.is_loopback() && !ip.is_unspecified()) else {
            return self.default_locale.clone();
        };

        if let Some(cached) = self.entries.lock().await.get(&address) {
            return cached.clone();
        }

        let locale = self.resolver.resolve_locale(address).unwrap_or_else(|| {
            debug!("No locale found for {address}, using {}", self.default_locale);
            self.default_locale.clone()
        });

        self.entries.lock().await.insert(address, locale.clone());
        locale
    }

    /// Record the locale of a freshly signed-in identity for its address.
    pub async fn remember(&self, address: Option<IpAddr>, locale: &str) {
        let Some(address) = address else {
            return;
        };
        if locale.is_empty() {
            return;
        }
        self.entries
            .lock()
            .await
            .insert(address, locale.to_string());
    }
}
