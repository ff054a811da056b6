use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use std::fmt;

use super::SessionError;

/// Raw token length in bytes before encoding.
pub const TOKEN_BYTES: usize = 32;

/// Opaque session token handed to the client inside the signed session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Generate a 256-bit session token from the OS CSPRNG, URL-safe base64 encoded.
///
/// # Errors
/// Returns [`SessionError::RandomnessUnavailable`] when the OS cannot supply
/// random bytes.
pub fn generate_session_token() -> Result<SessionToken, SessionError> {
    generate_with_rng(&mut OsRng)
}

pub(crate) fn generate_with_rng<R: RngCore + ?Sized>(
    rng: &mut R,
) -> Result<SessionToken, SessionError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(SessionToken(
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("entropy source gone")))
        }
    }

    #[test]
    fn generate_session_token_decodes_to_32_bytes() {
        let token = generate_session_token().unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(token.as_str()).unwrap();
        assert_eq!(decoded.len(), TOKEN_BYTES);
        assert!(!token.as_str().contains('='));
    }

    #[test]
    fn generate_session_token_is_not_repeated() {
        let first = generate_session_token().unwrap();
        let second = generate_session_token().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn broken_rng_yields_no_token() {
        let result = generate_with_rng(&mut BrokenRng);
        assert!(matches!(result, Err(SessionError::RandomnessUnavailable(_))));
    }

    #[test]
    fn debug_redacts_token() {
        let token = SessionToken::from("secret".to_string());
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }
}
