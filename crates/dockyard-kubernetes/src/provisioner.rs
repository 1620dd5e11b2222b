use dockyard_provision::LabelSet;
use log::debug;

use crate::{
    Cluster, ClusterError, ClusterObject, Config, DeleteError, MetaLabelsExt as _, Poll, PodError,
    Readiness, WaitError, cleanup, pod, service,
};

pub struct Provisioner<C> {
    cluster: C,
    poll: Poll,
}

impl<C> From<(C, &Config)> for Provisioner<C> {
    fn from((cluster, config): (C, &Config)) -> Self {
        Self {
            cluster,
            poll: config.poll(),
        }
    }
}

impl<C: Cluster> Provisioner<C> {
    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    pub fn poll(&self) -> Poll {
        self.poll
    }

    /// Creates `object` with `labels` merged over whatever labels it already carries.
    pub async fn create_tagged<K: ClusterObject>(
        &self,
        mut object: K,
        labels: &LabelSet,
    ) -> Result<K, ClusterError> {
        object.meta_mut().add_labels(labels);
        self.cluster.create(&object).await
    }

    /// `None` when the object does not exist.
    pub async fn labels_of<K: ClusterObject>(
        &self,
        name: &str,
    ) -> Result<Option<LabelSet>, ClusterError> {
        let object = self.cluster.get::<K>(name).await?;
        Ok(object.map(|object| object.meta().label_set()))
    }

    pub async fn wait_pod(&self, name: &str, readiness: Readiness) -> Result<(), WaitError<PodError>> {
        debug!("Waiting up to {:?} for pod {}.", self.poll.timeout(), name);
        pod::wait_for_pod(&self.cluster, name, readiness, self.poll).await
    }

    pub async fn wait_pod_containers_running(&self, name: &str) -> Result<(), WaitError<PodError>> {
        pod::wait_for_pod_containers_running(&self.cluster, name, self.poll).await
    }

    pub async fn remove_pod(&self, name: &str) -> Result<(), DeleteError> {
        cleanup::cleanup_pod(&self.cluster, name).await
    }

    pub async fn remove_process(&self, app_name: &str, process: &str) -> Result<(), DeleteError> {
        cleanup::cleanup_deployment(&self.cluster, app_name, process).await
    }

    pub async fn remove_node_container(&self, name: &str, pool: &str) -> Result<(), DeleteError> {
        cleanup::cleanup_daemon_set(&self.cluster, name, pool).await
    }

    pub async fn service_port(&self, name: &str) -> Result<i32, ClusterError> {
        service::service_port(&self.cluster, name).await
    }
}
