use k8s_openapi::api::core::v1::Service;
use tracing::{Level, instrument};

use crate::{Cluster, ClusterError};

/// Node port of the first port of the named service, `0` when there is none to route to.
#[instrument(skip(cluster), ret(level = Level::DEBUG), err(level = Level::WARN))]
pub async fn service_port<C: Cluster>(cluster: &C, name: &str) -> Result<i32, ClusterError> {
    let Some(service) = cluster.get::<Service>(name).await? else {
        return Ok(0);
    };

    let port = service
        .spec
        .and_then(|spec| spec.ports)
        .and_then(|ports| ports.into_iter().next())
        .and_then(|port| port.node_port)
        .unwrap_or_default();

    Ok(port)
}
