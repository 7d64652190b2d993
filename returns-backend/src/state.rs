use std::sync::Arc;

use crate::auth::cookies::CookieJar;
use crate::auth::gate::GateMode;
use crate::auth::identity::IdentityProvider;
use crate::auth::session::SessionSigner;
use crate::carrier::{CarrierClient, Clock, system_clock};
use crate::config::AppConfig;

/// Shared by every handler behind an `Arc`
pub struct AppState {
    pub carrier: CarrierClient,
    pub identity: Arc<dyn IdentityProvider>,
    pub signer: SessionSigner,
    pub cookies: CookieJar,
    pub gate_mode: GateMode,
    pub session_ttl_days: i64,
    pub diagnostics: bool,
    pub clock: Clock,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: &AppConfig,
        carrier: CarrierClient,
        identity: Arc<dyn IdentityProvider>,
        signer: SessionSigner,
    ) -> SharedState {
        Arc::new(Self {
            carrier,
            identity,
            signer,
            cookies: CookieJar::new(config.auth.secure_cookies, config.auth.session_ttl_days),
            gate_mode: config.auth.gate_mode,
            session_ttl_days: config.auth.session_ttl_days,
            diagnostics: config.diagnostics.enabled,
            clock: system_clock(),
        })
    }

    /// Unix seconds
    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    /// Expiry of a session minted now.
    pub fn session_expiry(&self) -> i64 {
        self.now() + self.session_ttl_days * 24 * 60 * 60
    }
}
