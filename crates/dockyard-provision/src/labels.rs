use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every key carrying this prefix is platform managed metadata.
pub const LABEL_PREFIX: &str = "dockyard.io/";

pub mod keys {
    pub const IS_DOCKYARD: &str = "is-dockyard";
    pub const IS_SERVICE: &str = "is-service";
    pub const IS_BUILD: &str = "is-build";
    pub const IS_STOPPED: &str = "is-stopped";
    pub const IS_DEPLOY: &str = "is-deploy";
    pub const IS_ISOLATED_RUN: &str = "is-isolated-run";
    pub const IS_NODE_CONTAINER: &str = "is-node-container";
    pub const RESTARTS: &str = "restarts";
    pub const APP_NAME: &str = "app-name";
    pub const APP_PROCESS: &str = "app-process";
    pub const APP_PROCESS_REPLICAS: &str = "app-process-replicas";
    pub const APP_PLATFORM: &str = "app-platform";
    pub const APP_POOL: &str = "app-pool";
    pub const ROUTER_NAME: &str = "router-name";
    pub const ROUTER_TYPE: &str = "router-type";
    pub const PROVISIONER: &str = "provisioner";
    pub const NODE_CONTAINER_NAME: &str = "node-container-name";
    pub const NODE_CONTAINER_POOL: &str = "node-container-pool";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    pub labels: BTreeMap<String, String>,
    pub prefix: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceLabels {
    pub app_name: String,
    pub process: String,
    pub replicas: u32,
    pub restarts: u32,
    pub platform: String,
    pub pool: String,
    pub router_name: String,
    pub router_type: String,
    pub provisioner: String,
    pub is_stopped: bool,
    pub is_deploy: bool,
    pub is_build: bool,
    pub is_isolated_run: bool,
}

impl LabelSet {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            labels: BTreeMap::new(),
            prefix: prefix.into(),
        }
    }

    /// Union of labels and annotations. Annotations win on colliding keys.
    #[must_use]
    pub fn from_parts<L, A>(prefix: impl Into<String>, labels: L, annotations: A) -> Self
    where
        L: IntoIterator<Item = (String, String)>,
        A: IntoIterator<Item = (String, String)>,
    {
        Self {
            labels: labels.into_iter().chain(annotations).collect(),
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn for_service(opts: ServiceLabels) -> Self {
        let mut set = Self::new(LABEL_PREFIX);

        set.set_bool(keys::IS_DOCKYARD, true);
        set.set_bool(keys::IS_SERVICE, true);
        set.set_bool(keys::IS_BUILD, opts.is_build);
        set.set_bool(keys::IS_STOPPED, opts.is_stopped);
        set.set_bool(keys::IS_DEPLOY, opts.is_deploy);
        set.set_bool(keys::IS_ISOLATED_RUN, opts.is_isolated_run);
        set.set(keys::RESTARTS, opts.restarts.to_string());
        set.set(keys::APP_NAME, opts.app_name);
        set.set(keys::APP_PROCESS, opts.process);
        set.set(keys::APP_PROCESS_REPLICAS, opts.replicas.to_string());
        set.set(keys::APP_PLATFORM, opts.platform);
        set.set(keys::APP_POOL, opts.pool);
        set.set(keys::ROUTER_NAME, opts.router_name);
        set.set(keys::ROUTER_TYPE, opts.router_type);
        set.set(keys::PROVISIONER, opts.provisioner);

        set
    }

    #[must_use]
    pub fn for_node_container(name: &str, pool: &str, provisioner: &str) -> Self {
        let mut set = Self::new(LABEL_PREFIX);

        set.set_bool(keys::IS_DOCKYARD, true);
        set.set_bool(keys::IS_NODE_CONTAINER, true);
        set.set(keys::PROVISIONER, provisioner);
        set.set(keys::NODE_CONTAINER_NAME, name);
        set.set(keys::NODE_CONTAINER_POOL, pool);

        set
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels.get(&self.key(name)).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.labels.insert(self.key(name), value.into());
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set(name, value.to_string());
    }

    fn get_bool(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    fn get_number(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(|value| value.parse().ok())
    }

    #[must_use]
    pub fn to_labels(&self) -> BTreeMap<String, String> {
        self.labels.clone()
    }

    pub fn is_managed(&self) -> bool {
        self.get_bool(keys::IS_DOCKYARD)
    }

    pub fn is_service(&self) -> bool {
        self.get_bool(keys::IS_SERVICE)
    }

    pub fn is_build(&self) -> bool {
        self.get_bool(keys::IS_BUILD)
    }

    pub fn is_stopped(&self) -> bool {
        self.get_bool(keys::IS_STOPPED)
    }

    pub fn is_deploy(&self) -> bool {
        self.get_bool(keys::IS_DEPLOY)
    }

    pub fn is_isolated_run(&self) -> bool {
        self.get_bool(keys::IS_ISOLATED_RUN)
    }

    pub fn is_node_container(&self) -> bool {
        self.get_bool(keys::IS_NODE_CONTAINER)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.get(keys::APP_NAME)
    }

    pub fn app_process(&self) -> Option<&str> {
        self.get(keys::APP_PROCESS)
    }

    pub fn app_platform(&self) -> Option<&str> {
        self.get(keys::APP_PLATFORM)
    }

    pub fn app_pool(&self) -> Option<&str> {
        self.get(keys::APP_POOL)
    }

    pub fn app_replicas(&self) -> Option<u32> {
        self.get_number(keys::APP_PROCESS_REPLICAS)
    }

    pub fn restarts(&self) -> Option<u32> {
        self.get_number(keys::RESTARTS)
    }

    pub fn router_name(&self) -> Option<&str> {
        self.get(keys::ROUTER_NAME)
    }

    pub fn router_type(&self) -> Option<&str> {
        self.get(keys::ROUTER_TYPE)
    }

    pub fn provisioner(&self) -> Option<&str> {
        self.get(keys::PROVISIONER)
    }

    pub fn node_container_name(&self) -> Option<&str> {
        self.get(keys::NODE_CONTAINER_NAME)
    }

    pub fn node_container_pool(&self) -> Option<&str> {
        self.get(keys::NODE_CONTAINER_POOL)
    }

    /// Equality requirements scoping list and delete calls to the pods and replica sets of one process.
    #[must_use]
    pub fn app_process_match_labels(&self) -> BTreeMap<String, String> {
        self.match_labels_of(&[keys::APP_NAME, keys::APP_PROCESS])
    }

    #[must_use]
    pub fn node_container_match_labels(&self) -> BTreeMap<String, String> {
        self.match_labels_of(&[
            keys::IS_NODE_CONTAINER,
            keys::NODE_CONTAINER_NAME,
            keys::NODE_CONTAINER_POOL,
        ])
    }

    fn match_labels_of(&self, names: &[&str]) -> BTreeMap<String, String> {
        names
            .iter()
            .filter_map(|name| {
                let key = self.key(name);
                self.labels.get(&key).map(|value| (key, value.clone()))
            })
            .collect()
    }
}
