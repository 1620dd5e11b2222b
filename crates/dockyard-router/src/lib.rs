mod app;
mod rebuild;
mod router;

#[cfg(test)]
mod testing;

pub use app::RebuildApp;
pub use rebuild::{RebuildError, RebuildResult, RoutePlan, rebuild_routes, rebuild_routes_locked};
pub use router::{CNameRouter, OptsRouter, Router, RouterError, route_key};
