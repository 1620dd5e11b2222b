use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use url::Url;

use crate::Router;

#[async_trait]
pub trait RebuildApp: Send + Sync {
    fn name(&self) -> &str;
    fn router_opts(&self) -> BTreeMap<String, String>;
    fn cnames(&self) -> Vec<String>;

    async fn router(&self) -> anyhow::Result<Arc<dyn Router>>;

    /// Computed on every call, never cached.
    async fn routable_addresses(&self) -> anyhow::Result<Vec<Url>>;

    /// Refreshes the externally visible address record of the application.
    async fn update_addr(&self) -> anyhow::Result<()>;

    async fn internal_lock(&self, reason: &str) -> anyhow::Result<bool>;
    async fn unlock(&self);
}
