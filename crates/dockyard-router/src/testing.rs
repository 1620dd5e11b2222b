use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::{CNameRouter, OptsRouter, RebuildApp, Router, RouterError, route_key};

#[derive(Default)]
pub struct FakeRouter {
    backends: Mutex<BTreeMap<String, Vec<Url>>>,
    opts: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    cnames: Mutex<BTreeMap<String, String>>,
    failing_routes: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<String>>,
    supports_opts: bool,
    supports_cnames: bool,
}

impl FakeRouter {
    pub fn with_opts(mut self) -> Self {
        self.supports_opts = true;
        self
    }

    pub fn with_cnames(mut self) -> Self {
        self.supports_cnames = true;
        self
    }

    pub fn seed(&self, name: &str, routes: &[Url]) {
        self.backends
            .lock()
            .insert(name.to_owned(), routes.to_vec());
    }

    pub fn bind_cname(&self, cname: &str, name: &str) {
        self.cnames.lock().insert(cname.to_owned(), name.to_owned());
    }

    pub fn fail_route(&self, key: &str) {
        self.failing_routes.lock().insert(key.to_owned());
    }

    pub fn routes_of(&self, name: &str) -> Vec<Url> {
        self.backends.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn opts_of(&self, name: &str) -> BTreeMap<String, String> {
        self.opts.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn cname_target(&self, cname: &str) -> Option<String> {
        self.cnames.lock().get(cname).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn check_route(&self, address: &Url) -> Result<(), RouterError> {
        let key = route_key(address);
        if self.failing_routes.lock().contains(&key) {
            return Err(RouterError::Other(anyhow!("Forced failure for {key}.")));
        }

        Ok(())
    }

    fn insert_backend(&self, name: &str) -> Result<(), RouterError> {
        let mut backends = self.backends.lock();
        if backends.contains_key(name) {
            return Err(RouterError::BackendExists);
        }

        backends.insert(name.to_owned(), Vec::new());
        Ok(())
    }
}

#[async_trait]
impl Router for FakeRouter {
    async fn add_backend(&self, name: &str) -> Result<(), RouterError> {
        self.record(format!("add-backend {name}"));
        self.insert_backend(name)
    }

    async fn remove_backend(&self, name: &str) -> Result<(), RouterError> {
        self.record(format!("remove-backend {name}"));
        self.backends
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or(RouterError::BackendNotFound)
    }

    async fn add_route(&self, name: &str, address: &Url) -> Result<(), RouterError> {
        self.check_route(address)?;

        let mut backends = self.backends.lock();
        let routes = backends.get_mut(name).ok_or(RouterError::BackendNotFound)?;
        routes.push(address.clone());

        Ok(())
    }

    async fn remove_route(&self, name: &str, address: &Url) -> Result<(), RouterError> {
        self.check_route(address)?;

        let mut backends = self.backends.lock();
        let routes = backends.get_mut(name).ok_or(RouterError::BackendNotFound)?;
        let index = routes
            .iter()
            .position(|route| route == address)
            .ok_or(RouterError::RouteNotFound)?;
        routes.remove(index);

        Ok(())
    }

    async fn routes(&self, name: &str) -> Result<Vec<Url>, RouterError> {
        self.record(format!("routes {name}"));
        self.backends
            .lock()
            .get(name)
            .cloned()
            .ok_or(RouterError::BackendNotFound)
    }

    fn as_opts_router(&self) -> Option<&dyn OptsRouter> {
        self.supports_opts.then_some(self as &dyn OptsRouter)
    }

    fn as_cname_router(&self) -> Option<&dyn CNameRouter> {
        self.supports_cnames.then_some(self as &dyn CNameRouter)
    }
}

#[async_trait]
impl OptsRouter for FakeRouter {
    async fn add_backend_opts(
        &self,
        name: &str,
        opts: &BTreeMap<String, String>,
    ) -> Result<(), RouterError> {
        self.record(format!("add-backend-opts {name}"));
        self.opts.lock().insert(name.to_owned(), opts.clone());
        self.insert_backend(name)
    }
}

#[async_trait]
impl CNameRouter for FakeRouter {
    async fn set_cname(&self, cname: &str, name: &str) -> Result<(), RouterError> {
        self.record(format!("set-cname {cname}"));

        let mut cnames = self.cnames.lock();
        match cnames.get(cname) {
            Some(bound) if bound == name => Err(RouterError::CNameExists),
            Some(bound) => Err(RouterError::Other(anyhow!(
                "CName {cname} is bound to {bound}."
            ))),
            None => {
                cnames.insert(cname.to_owned(), name.to_owned());
                Ok(())
            }
        }
    }

    async fn unset_cname(&self, cname: &str, name: &str) -> Result<(), RouterError> {
        let mut cnames = self.cnames.lock();
        match cnames.get(cname) {
            Some(bound) if bound == name => {
                cnames.remove(cname);
                Ok(())
            }
            _ => Err(RouterError::CNameNotFound),
        }
    }

    async fn cnames(&self, name: &str) -> Result<Vec<Url>, RouterError> {
        self.cnames
            .lock()
            .iter()
            .filter(|(_, bound)| *bound == name)
            .map(|(cname, _)| {
                Url::parse(&format!("http://{cname}"))
                    .map_err(|err| RouterError::Other(anyhow!(err)))
            })
            .collect()
    }
}

pub struct FakeApp {
    name: String,
    router: Arc<FakeRouter>,
    addresses: Mutex<Vec<Url>>,
    cnames: Vec<String>,
    opts: BTreeMap<String, String>,
    addresses_fail: Mutex<bool>,
    locked: Mutex<bool>,
}

impl FakeApp {
    pub fn new(name: &str, router: Arc<FakeRouter>) -> Self {
        Self {
            name: name.to_owned(),
            router,
            addresses: Mutex::default(),
            cnames: Vec::new(),
            opts: BTreeMap::new(),
            addresses_fail: Mutex::new(false),
            locked: Mutex::new(false),
        }
    }

    pub fn with_cnames(mut self, cnames: &[&str]) -> Self {
        self.cnames = cnames.iter().map(|cname| (*cname).to_owned()).collect();
        self
    }

    pub fn with_opts(mut self, opts: &[(&str, &str)]) -> Self {
        self.opts = opts
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        self
    }

    pub fn set_addresses(&self, addresses: Vec<Url>) {
        *self.addresses.lock() = addresses;
    }

    pub fn fail_addresses(&self) {
        *self.addresses_fail.lock() = true;
    }

    pub fn hold_lock(&self) {
        *self.locked.lock() = true;
    }

    pub fn is_locked(&self) -> bool {
        *self.locked.lock()
    }
}

#[async_trait]
impl RebuildApp for FakeApp {
    fn name(&self) -> &str {
        &self.name
    }

    fn router_opts(&self) -> BTreeMap<String, String> {
        self.opts.clone()
    }

    fn cnames(&self) -> Vec<String> {
        self.cnames.clone()
    }

    async fn router(&self) -> anyhow::Result<Arc<dyn Router>> {
        Ok(self.router.clone())
    }

    async fn routable_addresses(&self) -> anyhow::Result<Vec<Url>> {
        if *self.addresses_fail.lock() {
            anyhow::bail!("No units available.");
        }

        Ok(self.addresses.lock().clone())
    }

    async fn update_addr(&self) -> anyhow::Result<()> {
        self.router.record(format!("update-addr {}", self.name));
        Ok(())
    }

    async fn internal_lock(&self, _reason: &str) -> anyhow::Result<bool> {
        let mut locked = self.locked.lock();
        if *locked {
            return Ok(false);
        }

        *locked = true;
        Ok(true)
    }

    async fn unlock(&self) {
        *self.locked.lock() = false;
    }
}
