use async_trait::async_trait;

use crate::error::LookupError;
use crate::types::Property;

/// Answers a query from local data only. Never touches the network.
pub trait PropertySearch: Send + Sync {
    fn find(&self, query: &str) -> Vec<Property>;
}

/// Remote fallback that synthesizes listings for a free-text request.
#[async_trait]
pub trait GenerativeLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Vec<Property>, LookupError>;
}

#[async_trait]
impl<T: GenerativeLookup + ?Sized> GenerativeLookup for std::sync::Arc<T> {
    async fn lookup(&self, query: &str) -> Result<Vec<Property>, LookupError> {
        (**self).lookup(query).await
    }
}

#[async_trait]
impl<T: GenerativeLookup + ?Sized> GenerativeLookup for &T {
    async fn lookup(&self, query: &str) -> Result<Vec<Property>, LookupError> {
        (**self).lookup(query).await
    }
}
