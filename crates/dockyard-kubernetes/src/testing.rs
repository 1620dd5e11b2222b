use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::api::core::v1::Event;
use kube::{
    ResourceExt as _,
    core::{Selector, SelectorExt as _},
};
use parking_lot::Mutex;
use serde::de::Error as _;
use serde_json::Value;

use crate::{
    Cluster, ClusterError, ClusterObject,
    k8s::cluster::kind_of,
};

fn serde_error(error: serde_json::Error) -> ClusterError {
    ClusterError::Kube(kube::Error::SerdeError(error))
}

#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<BTreeMap<(String, String), Value>>,
    failing_deletes: Mutex<BTreeSet<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn with<K: ClusterObject>(object: K) -> Self {
        let cluster = Self::default();
        cluster.insert(object);
        cluster
    }

    pub fn insert<K: ClusterObject>(&self, object: K) {
        let key = (kind_of::<K>(), object.name_any());
        let value = serde_json::to_value(&object).unwrap();
        self.objects.lock().insert(key, value);
    }

    pub fn names<K: ClusterObject>(&self) -> Vec<String> {
        let kind = kind_of::<K>();
        self.objects
            .lock()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn fail_delete(&self, name: &str) {
        self.failing_deletes.lock().insert(name.to_owned());
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    fn all<K: ClusterObject>(&self) -> Result<Vec<K>, ClusterError> {
        let kind = kind_of::<K>();
        self.objects
            .lock()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, value)| serde_json::from_value(value.clone()).map_err(serde_error))
            .collect()
    }
}

impl Cluster for FakeCluster {
    fn namespace(&self) -> &str {
        "default"
    }

    async fn get<K: ClusterObject>(&self, name: &str) -> Result<Option<K>, ClusterError> {
        let key = (kind_of::<K>(), name.to_owned());
        let value = self.objects.lock().get(&key).cloned();

        value
            .map(|value| serde_json::from_value(value).map_err(serde_error))
            .transpose()
    }

    async fn list<K: ClusterObject>(&self, selector: &Selector) -> Result<Vec<K>, ClusterError> {
        let objects = self.all::<K>()?;

        Ok(objects
            .into_iter()
            .filter(|object| selector.matches(object.labels()))
            .collect())
    }

    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        let key = (kind_of::<K>(), object.name_any());
        let mut objects = self.objects.lock();

        if objects.contains_key(&key) {
            return Err(ClusterError::AlreadyExists {
                kind: key.0,
                name: key.1,
            });
        }

        objects.insert(key, serde_json::to_value(object).map_err(serde_error)?);
        Ok(object.clone())
    }

    async fn delete<K: ClusterObject>(&self, name: &str) -> Result<(), ClusterError> {
        if self.failing_deletes.lock().contains(name) {
            return Err(serde_error(serde_json::Error::custom(format!(
                "Forced failure for {name}."
            ))));
        }

        let key = (kind_of::<K>(), name.to_owned());
        if self.objects.lock().remove(&key).is_none() {
            return Err(ClusterError::NotFound {
                kind: key.0,
                name: key.1,
            });
        }

        self.deleted.lock().push(format!("{}/{}", key.0, key.1));
        Ok(())
    }

    async fn events_for<K: ClusterObject>(&self, name: &str) -> Result<Vec<Event>, ClusterError> {
        let kind = kind_of::<K>();
        let events = self.all::<Event>()?;

        Ok(events
            .into_iter()
            .filter(|event| {
                event.involved_object.kind.as_deref() == Some(kind.as_str())
                    && event.involved_object.name.as_deref() == Some(name)
            })
            .collect())
    }
}
