use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::Token;

/// Storage for the single carrier bearer token
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self) -> Option<Token>;
    async fn set(&self, token: Token);
    async fn clear(&self);
}

/// Process-local token cache
#[derive(Default)]
pub struct MemoryTokenCache {
    token: RwLock<Option<Token>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    async fn set(&self, token: Token) {
        *self.token.write().await = Some(token);
    }

    async fn clear(&self) {
        *self.token.write().await = None;
    }
}
