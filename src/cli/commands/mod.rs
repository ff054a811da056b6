pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_COOKIE_KEY_FILE: &str = "cookie-key-file";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_RESOURCES_DIR: &str = "resources-dir";
pub const ARG_DEFAULT_LOCALE: &str = "default-locale";
pub const ARG_GEOIP_DB: &str = "geoip-db";
pub const ARG_ADMIN: &str = "admin";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("smark")
        .about("Accounts web application with cookie sessions")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("SMARK_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .long_help(
                    "Database connection string. Without it accounts are kept in memory and lost on restart.",
                )
                .env("SMARK_DSN"),
        )
        .arg(
            Arg::new(ARG_COOKIE_KEY_FILE)
                .long("cookie-key-file")
                .help("File holding at least 64 bytes used to sign cookies")
                .long_help(
                    "File holding at least 64 bytes used to sign cookies. Without it a random key is generated and sessions do not survive a restart.",
                )
                .env("SMARK_COOKIE_KEY_FILE"),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long("cookie-secure")
                .help("Mark cookies Secure (serve behind HTTPS)")
                .env("SMARK_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_RESOURCES_DIR)
                .long("resources-dir")
                .help("Directory served under /res")
                .default_value("templates/res")
                .env("SMARK_RESOURCES_DIR"),
        )
        .arg(
            Arg::new(ARG_DEFAULT_LOCALE)
                .long("default-locale")
                .help("Locale used when a client's locale cannot be resolved")
                .default_value("US")
                .env("SMARK_DEFAULT_LOCALE"),
        )
        .arg(
            Arg::new(ARG_GEOIP_DB)
                .long("geoip-db")
                .help("MaxMind country database used to pick a visitor's locale")
                .long_help(
                    "MaxMind GeoLite2/GeoIP2 country database (.mmdb). Anonymous visitors get the locale of their country of origin; without it everyone gets the default locale.",
                )
                .env("SMARK_GEOIP_DB"),
        )
        .arg(
            Arg::new(ARG_ADMIN)
                .long("admin")
                .help("Username granted administrator rights at startup")
                .env("SMARK_ADMIN"),
        );

    logging::with_args(command)
}
