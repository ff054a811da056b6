//! Maps validated arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    ARG_ADMIN, ARG_COOKIE_KEY_FILE, ARG_COOKIE_SECURE, ARG_DEFAULT_LOCALE, ARG_DSN, ARG_GEOIP_DB,
    ARG_PORT, ARG_RESOURCES_DIR,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an argument with a default is somehow missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .map(|dsn| SecretString::from(dsn.clone()));

    let cookie_key_file = matches
        .get_one::<String>(ARG_COOKIE_KEY_FILE)
        .map(PathBuf::from);

    let resources_dir = matches
        .get_one::<String>(ARG_RESOURCES_DIR)
        .map(PathBuf::from)
        .context("missing required argument: --resources-dir")?;

    let default_locale = matches
        .get_one::<String>(ARG_DEFAULT_LOCALE)
        .map(|locale| locale.trim().to_uppercase())
        .context("missing required argument: --default-locale")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        cookie_key_file,
        cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        resources_dir,
        default_locale,
        geoip_db: matches.get_one::<String>(ARG_GEOIP_DB).map(PathBuf::from),
        admin: matches
            .get_one::<String>(ARG_ADMIN)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
    }))
}
