use std::fmt::Debug;

use k8s_openapi::{NamespaceResourceScope, api::core::v1::Event};
use kube::{
    Api, Client, Error, Resource,
    api::{DeleteParams, ListParams, PostParams},
    core::Selector,
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{Level, debug, instrument};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("{kind} {name:?} not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} {name:?} already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("Missing resource name.")]
    ResourceName,

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub trait ClusterObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> ClusterObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

pub(crate) fn kind_of<K: ClusterObject>() -> String {
    K::kind(&()).into_owned()
}

/// Every call is scoped to [`Cluster::namespace`].
pub trait Cluster {
    fn namespace(&self) -> &str;

    async fn get<K: ClusterObject>(&self, name: &str) -> Result<Option<K>, ClusterError>;

    async fn list<K: ClusterObject>(&self, selector: &Selector) -> Result<Vec<K>, ClusterError>;

    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError>;

    /// Fails with [`ClusterError::NotFound`] when the object is absent.
    async fn delete<K: ClusterObject>(&self, name: &str) -> Result<(), ClusterError>;

    /// Events whose involved object is the named object of kind `K`.
    async fn events_for<K: ClusterObject>(&self, name: &str) -> Result<Vec<Event>, ClusterError>;
}

#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    namespace: String,
}

impl From<(Client, &Config)> for KubeCluster {
    fn from((client, config): (Client, &Config)) -> Self {
        Self {
            client,
            namespace: config.namespace.clone(),
        }
    }
}

impl KubeCluster {
    pub async fn try_default(config: &Config) -> Result<Self, ClusterError> {
        let client = Client::try_default().await?;
        Ok(Self::from((client, config)))
    }

    fn api<K: ClusterObject>(&self) -> Api<K> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

fn classify<K: ClusterObject>(name: &str, error: Error) -> ClusterError {
    match error {
        Error::Api(status) if status.code == 404 => ClusterError::NotFound {
            kind: kind_of::<K>(),
            name: name.to_owned(),
        },
        Error::Api(status) if status.code == 409 => ClusterError::AlreadyExists {
            kind: kind_of::<K>(),
            name: name.to_owned(),
        },
        error => ClusterError::Kube(error),
    }
}

impl Cluster for KubeCluster {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    #[instrument(skip(self), err(level = Level::WARN))]
    async fn get<K: ClusterObject>(&self, name: &str) -> Result<Option<K>, ClusterError> {
        self.api::<K>()
            .get_opt(name)
            .await
            .map_err(|error| classify::<K>(name, error))
    }

    #[instrument(skip(self, selector), fields(selector = %selector), err(level = Level::WARN))]
    async fn list<K: ClusterObject>(&self, selector: &Selector) -> Result<Vec<K>, ClusterError> {
        let params = ListParams::default().labels_from(selector);
        let objects = self.api::<K>().list(&params).await?;
        Ok(objects.items)
    }

    #[instrument(skip_all, err(level = Level::WARN))]
    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        let name = object.meta().name.clone().ok_or(ClusterError::ResourceName)?;
        let params = PostParams::default();

        self.api::<K>()
            .create(&params, object)
            .await
            .map_err(|error| classify::<K>(&name, error))
    }

    #[instrument(skip(self), err(level = Level::DEBUG))]
    async fn delete<K: ClusterObject>(&self, name: &str) -> Result<(), ClusterError> {
        let params = DeleteParams::default();

        self.api::<K>()
            .delete(name, &params)
            .await
            .map_err(|error| classify::<K>(name, error))?;

        debug!("Deletion of {} {} accepted.", kind_of::<K>(), name);
        Ok(())
    }

    #[instrument(skip(self), err(level = Level::WARN))]
    async fn events_for<K: ClusterObject>(&self, name: &str) -> Result<Vec<Event>, ClusterError> {
        let events: Api<Event> = Api::namespaced(self.client.clone(), &self.namespace);
        let fields = format!(
            "involvedObject.kind={},involvedObject.name={},involvedObject.namespace={}",
            kind_of::<K>(),
            name,
            self.namespace,
        );

        let events = events.list(&ListParams::default().fields(&fields)).await?;
        Ok(events.items)
    }
}
