//! Sessions: token lifecycle, the signed cookie carrier, flash messages and the
//! access gate.

mod cookies;
mod error;
pub mod flash;
mod gate;
mod store;
mod token;

pub use cookies::{CookieCarrier, CookiePolicy, FLASH_COOKIE_NAME, SESSION_COOKIE_NAME};
pub use error::{AuthError, CredentialFailure, SessionError};
pub use flash::{FlashField, FlashKind, FlashMessage, FlashView};
pub use gate::{check_access, resolve_access, AccessState, GateDecision, Page};
pub use store::{MemorySessionBackend, SessionBackend, SessionStore};
pub use token::{generate_session_token, SessionToken, TOKEN_BYTES};
