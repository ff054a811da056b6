use std::collections::HashMap;

/// Locale every lookup falls back to before giving up and returning the key.
pub const FALLBACK_LOCALE: &str = "US";

const EMBEDDED_CATALOGS: [(&str, &str); 4] = [
    ("US", include_str!("catalogs/US.yml")),
    ("GB", include_str!("catalogs/GB.yml")),
    ("FR", include_str!("catalogs/FR.yml")),
    ("DE", include_str!("catalogs/DE.yml")),
];

pub trait Translator: Send + Sync {
    /// Text for `key` in `locale`. Never fails: unknown keys come back verbatim.
    fn translate(&self, locale: &str, key: &str) -> String;
}

/// Flat `key: text` catalogs indexed by upper-case locale code.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Load the catalogs compiled into the binary.
    ///
    /// # Errors
    /// Returns an error if an embedded catalog is not valid YAML.
    pub fn embedded() -> Result<Self, serde_yaml::Error> {
        Self::from_sources(EMBEDDED_CATALOGS)
    }

    /// Build a catalog from `(locale, yaml)` pairs.
    ///
    /// # Errors
    /// Returns an error if a source is not a flat YAML mapping of strings.
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, serde_yaml::Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = HashMap::new();
        for (locale, source) in sources {
            let table: HashMap<String, String> = serde_yaml::from_str(source)?;
            entries.insert(locale.to_uppercase(), table);
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&String> {
        self.entries
            .get(&locale.to_uppercase())
            .and_then(|table| table.get(key))
    }
}

impl Translator for Catalog {
    fn translate(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(FALLBACK_LOCALE, key))
            .cloned()
            .unwrap_or_else(|| {
                tracing::debug!("missing translation for {key} in {locale}");
                key.to_string()
            })
    }
}
