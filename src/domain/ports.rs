use crate::domain::model::{ApiRequest, RawPayload};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Performs one API call and hands back the undecoded body.
///
/// Non-2xx statuses and network failures come back as transport errors;
/// decoding is left entirely to the parser.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &ApiRequest) -> Result<RawPayload>;
}

/// Small string key-value store (the persisted state selection lives here).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
