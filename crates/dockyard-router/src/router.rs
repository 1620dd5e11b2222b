use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Backend already exists.")]
    BackendExists,

    #[error("Backend not found.")]
    BackendNotFound,

    #[error("Route not found.")]
    RouteNotFound,

    #[error("CName already exists.")]
    CNameExists,

    #[error("CName not found.")]
    CNameNotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait Router: Send + Sync {
    async fn add_backend(&self, name: &str) -> Result<(), RouterError>;
    async fn remove_backend(&self, name: &str) -> Result<(), RouterError>;

    async fn add_route(&self, name: &str, address: &Url) -> Result<(), RouterError>;
    async fn remove_route(&self, name: &str, address: &Url) -> Result<(), RouterError>;
    async fn routes(&self, name: &str) -> Result<Vec<Url>, RouterError>;

    fn as_opts_router(&self) -> Option<&dyn OptsRouter> {
        None
    }

    fn as_cname_router(&self) -> Option<&dyn CNameRouter> {
        None
    }
}

#[async_trait]
pub trait OptsRouter: Send + Sync {
    async fn add_backend_opts(
        &self,
        name: &str,
        opts: &BTreeMap<String, String>,
    ) -> Result<(), RouterError>;
}

#[async_trait]
pub trait CNameRouter: Send + Sync {
    async fn set_cname(&self, cname: &str, name: &str) -> Result<(), RouterError>;
    async fn unset_cname(&self, cname: &str, name: &str) -> Result<(), RouterError>;
    async fn cnames(&self, name: &str) -> Result<Vec<Url>, RouterError>;
}

/// Routes are compared by host and port only. Default ports are spelled out, so
/// `http://a` and `https://a` stay distinct.
pub fn route_key(address: &Url) -> String {
    let host = address.host_str().unwrap_or_default();

    match address.port_or_known_default() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}
