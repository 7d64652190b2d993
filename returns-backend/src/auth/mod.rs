//! Sign-in, session cookies and the request gate

pub mod cookies;
pub mod gate;
pub mod identity;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod session;

pub use gate::{GateMode, auth_gate, is_public_path};
pub use identity::{FirebaseIdentity, IdentityError, IdentityProvider};
pub use session::{SessionError, SessionSigner};
