use kube::{ResourceExt as _, core::Selector};
use tracing::{Level, debug, instrument};

use crate::k8s::cluster::{Cluster, ClusterError, ClusterObject, kind_of};

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("Could not delete {kind} {name:?} in namespace {namespace:?}: {source}")]
    Delete {
        kind: String,
        name: String,
        namespace: String,
        #[source]
        source: ClusterError,
    },

    #[error("Could not list {kind} matching {selector:?} in namespace {namespace:?}: {source}")]
    List {
        kind: String,
        selector: String,
        namespace: String,
        #[source]
        source: ClusterError,
    },
}

pub trait DeleteExt {
    /// Absent objects count as deleted. Returns whether something was removed.
    async fn delete_object<K: ClusterObject>(&self, name: &str) -> Result<bool, DeleteError>;

    async fn delete_matching<K: ClusterObject>(
        &self,
        selector: &Selector,
    ) -> Result<usize, DeleteError>;
}

impl<C> DeleteExt for C
where
    C: Cluster,
{
    #[instrument(skip(self), err(level = Level::WARN))]
    async fn delete_object<K: ClusterObject>(&self, name: &str) -> Result<bool, DeleteError> {
        match self.delete::<K>(name).await {
            Ok(()) => Ok(true),
            Err(error) if error.is_not_found() => {
                debug!("{} {} already absent.", kind_of::<K>(), name);
                Ok(false)
            }
            Err(source) => Err(DeleteError::Delete {
                kind: kind_of::<K>(),
                name: name.to_owned(),
                namespace: self.namespace().to_owned(),
                source,
            }),
        }
    }

    #[instrument(skip(self, selector), fields(selector = %selector), ret(level = Level::DEBUG), err(level = Level::WARN))]
    async fn delete_matching<K: ClusterObject>(
        &self,
        selector: &Selector,
    ) -> Result<usize, DeleteError> {
        let objects = self
            .list::<K>(selector)
            .await
            .map_err(|source| DeleteError::List {
                kind: kind_of::<K>(),
                selector: selector.to_string(),
                namespace: self.namespace().to_owned(),
                source,
            })?;

        let mut deleted = 0;
        for object in objects {
            if self.delete_object::<K>(&object.name_any()).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}
