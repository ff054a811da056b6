//! Request locale resolution and message translation.

mod geoip;
mod resolver;
mod translator;

pub use geoip::GeoIpResolver;
pub use resolver::{FixedLocaleResolver, LocaleCache, LocaleResolver};
pub use translator::{Catalog, Translator, FALLBACK_LOCALE};
