//! In-process identity provider for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use returns_common::UserData;

use super::identity::{IdentityError, IdentityProvider, IdentitySession, RefreshedTokens};

struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

/// Accounts keyed by email; refresh tokens are `refresh-<uid>`.
#[derive(Default)]
pub struct MockIdentity {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        self.insert(email, password, display_name);
        self
    }

    fn insert(&self, email: &str, password: &str, display_name: Option<&str>) -> String {
        let mut accounts = self.accounts.lock().unwrap_or_else(|p| p.into_inner());
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: display_name.map(str::to_string),
            },
        );
        uid
    }

    fn session(email: &str, uid: &str, display_name: Option<String>) -> IdentitySession {
        IdentitySession {
            user: UserData {
                uid: uid.to_string(),
                display_name,
                email: Some(email.to_string()),
                email_verified: false,
            },
            id_token: format!("id-{}", uid),
            refresh_token: format!("refresh-{}", uid),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, IdentityError> {
        let accounts = self.accounts.lock().unwrap_or_else(|p| p.into_inner());
        match accounts.get(email) {
            Some(account) if account.password == password => {
                Ok(Self::session(email, &account.uid, account.display_name.clone()))
            }
            _ => Err(IdentityError::Provider("INVALID_LOGIN_CREDENTIALS".to_string())),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<IdentitySession, IdentityError> {
        if !email.contains('@') {
            return Err(IdentityError::Provider("INVALID_EMAIL".to_string()));
        }
        if password.len() < 6 {
            return Err(IdentityError::Provider("WEAK_PASSWORD".to_string()));
        }
        let exists = self
            .accounts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(email);
        if exists {
            return Err(IdentityError::Provider("EMAIL_EXISTS".to_string()));
        }

        let uid = self.insert(email, password, display_name);
        Ok(Self::session(email, &uid, display_name.map(str::to_string)))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError> {
        let uid = refresh_token
            .strip_prefix("refresh-")
            .ok_or_else(|| IdentityError::Provider("INVALID_REFRESH_TOKEN".to_string()))?;
        Ok(RefreshedTokens {
            uid: uid.to_string(),
            id_token: format!("id-{}-refreshed", uid),
            refresh_token: refresh_token.to_string(),
        })
    }
}
