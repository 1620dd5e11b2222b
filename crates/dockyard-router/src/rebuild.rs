use std::collections::BTreeMap;

use itertools::Itertools as _;
use tracing::{Level, debug, info, instrument};
use url::{Position, Url};

use crate::{RebuildApp, RouterError, route_key};

#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    #[error("Could not resolve router: {0}")]
    Router(#[source] anyhow::Error),

    #[error("Could not register backend: {0}")]
    AddBackend(#[source] RouterError),

    #[error("Could not update app address: {0}")]
    UpdateAddr(#[source] anyhow::Error),

    #[error("Could not set cname {cname}: {source}")]
    SetCName {
        cname: String,
        #[source]
        source: RouterError,
    },

    #[error("Could not list routes: {0}")]
    Routes(#[source] RouterError),

    #[error("Could not get routable addresses: {0}")]
    Addresses(#[source] anyhow::Error),

    #[error("Could not add route {route}: {source}")]
    AddRoute {
        route: String,
        #[source]
        source: RouterError,
    },

    #[error("Could not remove route {route}: {source}")]
    RemoveRoute {
        route: String,
        #[source]
        source: RouterError,
    },

    #[error("Could not lock app: {0}")]
    Lock(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RebuildResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoutePlan {
    pub add: Vec<Url>,
    pub remove: Vec<Url>,
}

impl RoutePlan {
    /// Existing routes whose host is still desired are kept, the rest are removed.
    /// Desired addresses without an existing route are added, ordered by host.
    pub fn diff(existing: &[Url], desired: Vec<Url>) -> Self {
        let mut expected: BTreeMap<String, Url> = desired
            .into_iter()
            .map(|address| (route_key(&address), address))
            .collect();

        let mut remove = Vec::new();
        for route in existing {
            if expected.remove(&route_key(route)).is_none() {
                remove.push(route.clone());
            }
        }

        Self {
            add: expected.into_values().collect(),
            remove,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// `url` serializes an empty path as `/`, which routable addresses never carry.
fn display_route(route: &Url) -> &str {
    if route.path() == "/" && route.query().is_none() && route.fragment().is_none() {
        &route[..Position::AfterPort]
    } else {
        route.as_str()
    }
}

#[instrument(
    skip_all,
    fields(app = app.name()),
    ret(level = Level::DEBUG),
    err(level = Level::WARN),
)]
pub async fn rebuild_routes<A>(app: &A) -> Result<RebuildResult, RebuildError>
where
    A: RebuildApp + ?Sized,
{
    let name = app.name();
    let router = app.router().await.map_err(RebuildError::Router)?;

    let registered = match router.as_opts_router() {
        Some(opts_router) => {
            opts_router
                .add_backend_opts(name, &app.router_opts())
                .await
        }
        None => router.add_backend(name).await,
    };

    match registered {
        Err(RouterError::BackendExists) => debug!("Backend already exists."),
        result => result.map_err(RebuildError::AddBackend)?,
    }

    app.update_addr().await.map_err(RebuildError::UpdateAddr)?;

    if let Some(cname_router) = router.as_cname_router() {
        for cname in app.cnames() {
            match cname_router.set_cname(&cname, name).await {
                Err(RouterError::CNameExists) => debug!("CName {} already set.", cname),
                result => result.map_err(|source| RebuildError::SetCName { cname, source })?,
            }
        }
    }

    let routes = router.routes(name).await.map_err(RebuildError::Routes)?;
    debug!("Old routes: {}", routes.iter().join(", "));

    let addresses = app
        .routable_addresses()
        .await
        .map_err(RebuildError::Addresses)?;
    debug!("Routable addresses: {}", addresses.iter().join(", "));

    let plan = RoutePlan::diff(&routes, addresses);
    let mut result = RebuildResult::default();

    if plan.is_empty() {
        debug!("Routes are up to date.");
        return Ok(result);
    }

    for route in plan.add {
        router
            .add_route(name, &route)
            .await
            .map_err(|source| RebuildError::AddRoute {
                route: display_route(&route).to_owned(),
                source,
            })?;

        result.added.push(display_route(&route).to_owned());
    }

    for route in plan.remove {
        router
            .remove_route(name, &route)
            .await
            .map_err(|source| RebuildError::RemoveRoute {
                route: display_route(&route).to_owned(),
                source,
            })?;

        result.removed.push(display_route(&route).to_owned());
    }

    debug!("Routes added: {}", result.added.join(", "));
    debug!("Routes removed: {}", result.removed.join(", "));

    Ok(result)
}

/// Rebuilds while holding the app's internal lock. `None` means somebody else holds it.
#[instrument(skip_all, fields(app = app.name()), err(level = Level::WARN))]
pub async fn rebuild_routes_locked<A>(app: &A) -> Result<Option<RebuildResult>, RebuildError>
where
    A: RebuildApp + ?Sized,
{
    let locked = app
        .internal_lock("rebuild-routes")
        .await
        .map_err(RebuildError::Lock)?;

    if !locked {
        info!("Skipping route rebuild, because the app is locked.");
        return Ok(None);
    }

    let result = rebuild_routes(app).await;
    app.unlock().await;

    result.map(Some)
}
