use crate::accounts::{
    grant_admin, AccountStore, Argon2Verifier, MemoryAccountStore, PgAccountStore,
};
use crate::api::{self, AppState};
use crate::cli::telemetry;
use crate::locale::{Catalog, FixedLocaleResolver, GeoIpResolver, LocaleCache, LocaleResolver};
use crate::session::CookiePolicy;
use anyhow::{anyhow, Context, Result};
use axum_extra::extract::cookie::Key;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{error, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub cookie_key_file: Option<PathBuf>,
    pub cookie_secure: bool,
    pub resources_dir: PathBuf,
    pub default_locale: String,
    pub geoip_db: Option<PathBuf>,
    pub admin: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the account store, the cookie key or the locale catalogs
/// cannot be loaded, or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    let accounts: Arc<dyn AccountStore> = match &args.dsn {
        Some(dsn) => {
            info!("Connecting to database at {}", dsn_host(dsn.expose_secret()));
            Arc::new(PgAccountStore::connect(dsn.expose_secret()).await?)
        }
        None => {
            warn!("No DSN given, accounts are kept in memory");
            Arc::new(MemoryAccountStore::new())
        }
    };

    if let Some(username) = &args.admin {
        match grant_admin(accounts.as_ref(), username).await? {
            Some(_) => info!("{username} is an administrator"),
            None => warn!("No account named {username}, no administrator granted"),
        }
    }

    let cookie_key = match &args.cookie_key_file {
        Some(path) => load_cookie_key(path)?,
        None => {
            warn!("No cookie key file given, sessions end on restart");
            Key::generate()
        }
    };

    let catalog = Catalog::embedded().context("Failed to load message catalogs")?;

    let resolver = locale_resolver(args.geoip_db.as_deref(), &args.default_locale);
    let locales = LocaleCache::new(resolver, args.default_locale);

    let state = AppState::new(
        accounts,
        Arc::new(Argon2Verifier::new()),
        Arc::new(catalog),
        Arc::new(locales),
        cookie_key,
    )
    .with_cookie_policy(CookiePolicy {
        secure: args.cookie_secure,
    });

    let result = api::new(args.port, state, &args.resources_dir).await;

    telemetry::shutdown_tracer();

    result
}

/// Country lookup when a database is configured and loads, otherwise every
/// visitor gets the default locale.
fn locale_resolver(geoip_db: Option<&Path>, default_locale: &str) -> Arc<dyn LocaleResolver> {
    match geoip_db.map(GeoIpResolver::open) {
        Some(Ok(resolver)) => {
            info!("Resolving visitor locales by country");
            Arc::new(resolver)
        }
        Some(Err(err)) => {
            error!("{err:#}, visitors get the {default_locale} locale");
            Arc::new(FixedLocaleResolver::new(default_locale))
        }
        None => {
            warn!("No GeoIP database given, visitors get the {default_locale} locale");
            Arc::new(FixedLocaleResolver::new(default_locale))
        }
    }
}

/// Host and database of a DSN, without credentials.
fn dsn_host(dsn: &str) -> String {
    Url::parse(dsn).map_or_else(
        |_| "<unparsable dsn>".to_string(),
        |url| format!("{}{}", url.host_str().unwrap_or("localhost"), url.path()),
    )
}

fn load_cookie_key(path: &Path) -> Result<Key> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read cookie key file: {}", path.display()))?;

    Key::try_from(bytes.as_slice())
        .map_err(|err| anyhow!("Invalid cookie key in {}: {err:?}", path.display()))
}
