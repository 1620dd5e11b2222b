use std::time::Duration;

use envconfig::Envconfig;

use crate::Poll;

#[derive(Debug, Envconfig)]
pub struct Config {
    #[envconfig(from = "DOCKYARD__NAMESPACE", default = "default")]
    pub namespace: String,

    #[envconfig(from = "DOCKYARD__POD_READY_TIMEOUT_SECONDS", default = "600")]
    pub pod_ready_timeout_seconds: u64,

    #[envconfig(from = "DOCKYARD__POLL_INTERVAL_MILLIS", default = "500")]
    pub poll_interval_millis: u64,
}

impl Config {
    pub fn poll(&self) -> Poll {
        Poll::new(Duration::from_secs(self.pod_ready_timeout_seconds))
            .with_interval(Duration::from_millis(self.poll_interval_millis))
    }
}
