//! # Smark
//!
//! A small accounts web application: visitors sign up, log in, see a dashboard
//! and look at each other's profiles.
//!
//! ## Sessions
//!
//! A successful login or signup creates a session identified by a random,
//! URL-safe token carried in the signed `session-id` cookie. Sessions live in
//! the server process and end on logout; logging out also records the account
//! as offline with a last-seen timestamp.
//!
//! ## Flash messages
//!
//! Handlers that redirect queue short messages in the signed `flash-data`
//! cookie. The next rendered page shows them once and clears the queue. Data
//! flashes carry the email or username a failed form was submitted with, so
//! the form can be refilled.
//!
//! ## Access gate
//!
//! Every page except `/login`, `/signup` and `/404` requires a live session.
//! Anonymous requests are redirected to `/login` before the page handler runs.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod locale;
pub mod session;
pub mod views;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
