use dockyard_provision::{LabelSet, ServiceLabels};
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment, ReplicaSet},
    core::v1::Pod,
};
use kube::core::Selector;
use tracing::{Level, info, instrument};

use crate::{
    Cluster, DeleteError, DeleteExt as _, PROVISIONER_NAME, daemon_set_name,
    deployment_name_for_app,
};

#[instrument(skip(cluster), err(level = Level::WARN))]
pub async fn cleanup_pod<C: Cluster>(cluster: &C, name: &str) -> Result<(), DeleteError> {
    cluster.delete_object::<Pod>(name).await?;
    Ok(())
}

pub async fn cleanup_pods<C: Cluster>(cluster: &C, selector: &Selector) -> Result<(), DeleteError> {
    let deleted = cluster.delete_matching::<Pod>(selector).await?;
    info!("Removed {} pod(s) matching {}.", deleted, selector);
    Ok(())
}

/// Pods go first, so nothing is left running once the replica sets are gone.
#[instrument(skip(cluster, selector), fields(selector = %selector), err(level = Level::WARN))]
pub async fn cleanup_replicas<C: Cluster>(
    cluster: &C,
    selector: &Selector,
) -> Result<(), DeleteError> {
    cleanup_pods(cluster, selector).await?;

    let deleted = cluster.delete_matching::<ReplicaSet>(selector).await?;
    info!("Removed {} replica set(s) matching {}.", deleted, selector);

    Ok(())
}

#[instrument(skip(cluster), err(level = Level::WARN))]
pub async fn cleanup_deployment<C: Cluster>(
    cluster: &C,
    app_name: &str,
    process: &str,
) -> Result<(), DeleteError> {
    let labels = LabelSet::for_service(ServiceLabels {
        app_name: app_name.to_owned(),
        process: process.to_owned(),
        provisioner: PROVISIONER_NAME.to_owned(),
        ..Default::default()
    });

    let selector: Selector = labels.app_process_match_labels().into_iter().collect();
    cleanup_replicas(cluster, &selector).await?;

    cluster
        .delete_object::<Deployment>(&deployment_name_for_app(app_name, process))
        .await?;

    Ok(())
}

#[instrument(skip(cluster), err(level = Level::WARN))]
pub async fn cleanup_daemon_set<C: Cluster>(
    cluster: &C,
    name: &str,
    pool: &str,
) -> Result<(), DeleteError> {
    let labels = LabelSet::for_node_container(name, pool, PROVISIONER_NAME);

    let selector: Selector = labels.node_container_match_labels().into_iter().collect();
    cleanup_pods(cluster, &selector).await?;

    cluster
        .delete_object::<DaemonSet>(&daemon_set_name(name, pool))
        .await?;

    Ok(())
}
