//! Search backend trait.

use crate::{AccountInfo, FofaApiResult, FofaClient, SearchRequest, SearchResult};
use async_trait::async_trait;

/// Remote search capability used by the command dispatcher.
///
/// [`FofaClient`] is the production implementation. Tests substitute an
/// in-memory backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search.
    async fn search(&self, request: &SearchRequest) -> FofaApiResult<SearchResult>;

    /// Account details of the configured key.
    async fn account_info(&self) -> FofaApiResult<AccountInfo>;
}

#[async_trait]
impl SearchBackend for FofaClient {
    async fn search(&self, request: &SearchRequest) -> FofaApiResult<SearchResult> {
        FofaClient::search(self, request).await
    }

    async fn account_info(&self) -> FofaApiResult<AccountInfo> {
        FofaClient::account_info(self).await
    }
}
