//! Country lookup against a MaxMind GeoLite2/GeoIP2 country database.

use anyhow::{Context, Result};
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use tracing::debug;

use super::LocaleResolver;

/// Resolves an address to the upper-case ISO country code of its origin.
///
/// Countries without a catalog of their own still translate through the
/// fallback chain.
pub struct GeoIpResolver {
    reader: Reader<Vec<u8>>,
}

impl GeoIpResolver {
    /// Load the database at `path` into memory.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a MaxMind database.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = Reader::open_readfile(path)
            .with_context(|| format!("Failed to open GeoIP database: {}", path.display()))?;

        debug!(
            "GeoIP database {} loaded, built {}",
            reader.metadata.database_type, reader.metadata.build_epoch
        );

        Ok(Self { reader })
    }
}

impl LocaleResolver for GeoIpResolver {
    fn resolve_locale(&self, address: IpAddr) -> Option<String> {
        match self.reader.lookup::<geoip2::Country>(address) {
            Ok(record) => locale_from_iso_code(record.country.and_then(|country| country.iso_code)),
            Err(err) => {
                debug!("GeoIP lookup failed for {address}: {err}");
                None
            }
        }
    }
}

/// Catalogs are keyed by country code, so the code is the locale.
fn locale_from_iso_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_uppercase)
}
