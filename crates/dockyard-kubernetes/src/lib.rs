mod cleanup;
mod config;
mod k8s;
mod naming;
mod pod;
mod provisioner;
mod service;
mod wait;

#[cfg(test)]
mod testing;

pub use cleanup::{
    cleanup_daemon_set, cleanup_deployment, cleanup_pod, cleanup_pods, cleanup_replicas,
};
pub use config::Config;
pub use k8s::{
    cluster::{Cluster, ClusterError, ClusterObject, KubeCluster},
    delete_ext::{DeleteError, DeleteExt},
    meta_ext::MetaLabelsExt,
};
pub use naming::{
    daemon_set_name, deploy_pod_name_for_app, deployment_name_for_app,
    exec_command_pod_name_for_app,
};
pub use pod::{
    ContainerSummary, PodError, PodPhase, PodState, Readiness, ReadinessOutcome, check_pod,
    wait_for_pod, wait_for_pod_containers_running,
};
pub use provisioner::Provisioner;
pub use service::service_port;
pub use wait::{POLL_INTERVAL, Poll, WaitError, wait_for};

pub const PROVISIONER_NAME: &str = "kubernetes";
