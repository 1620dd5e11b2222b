use k8s_openapi::api::core::v1::{ContainerStatus, Event, Pod};
use strum::{Display, EnumString};
use tracing::{Level, debug, instrument};

use crate::{Cluster, ClusterError, Poll, WaitError};

#[derive(Debug, thiserror::Error)]
pub enum PodError {
    #[error("Pod {name:?} not found")]
    NotFound { name: String },

    #[error("{reason}")]
    Fatal { name: String, reason: String },

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Readiness {
    #[default]
    Succeeded,

    Running,

    /// Every container of the pod reports running at the same time.
    ContainersRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerSummary {
    AllRunning,
    Incomplete,
    Terminated { reason: String },
}

impl ContainerSummary {
    pub fn of(pod: &Pod) -> Self {
        let declared = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.len())
            .unwrap_or_default();

        let statuses = pod
            .status
            .as_ref()
            .and_then(|status| status.container_statuses.as_deref())
            .unwrap_or_default();

        let mut all_running = statuses.len() >= declared;

        for status in statuses {
            if let Some(reason) = termination_reason(status) {
                return Self::Terminated { reason };
            }

            let running = status
                .state
                .as_ref()
                .is_some_and(|state| state.running.is_some());

            all_running &= running;
        }

        if all_running {
            Self::AllRunning
        } else {
            Self::Incomplete
        }
    }
}

fn termination_reason(status: &ContainerStatus) -> Option<String> {
    let terminated = status.state.as_ref()?.terminated.as_ref()?;

    Some(format!(
        "unexpected container {:?} termination: Exit {} - Reason: {:?} - Message: {:?}",
        status.name,
        terminated.exit_code,
        terminated.reason.as_deref().unwrap_or_default(),
        terminated.message.as_deref().unwrap_or_default(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodState {
    Pending,
    Running(ContainerSummary),
    Succeeded(ContainerSummary),
    Invalid {
        phase: PodPhase,
        message: Option<String>,
    },
}

impl PodState {
    pub fn of(pod: &Pod) -> Self {
        let status = pod.status.as_ref();

        let phase = match status.and_then(|status| status.phase.as_deref()) {
            None | Some("") => return Self::Pending,
            Some(phase) => phase.parse().unwrap_or(PodPhase::Unknown),
        };

        match phase {
            PodPhase::Pending => Self::Pending,
            PodPhase::Running => Self::Running(ContainerSummary::of(pod)),
            PodPhase::Succeeded => Self::Succeeded(ContainerSummary::of(pod)),
            PodPhase::Failed | PodPhase::Unknown => Self::Invalid {
                phase,
                message: status
                    .and_then(|status| status.message.clone())
                    .filter(|message| !message.is_empty()),
            },
        }
    }

    /// `event` is the latest cluster event about the pod, only consulted for invalid phases.
    pub fn outcome(&self, readiness: Readiness, event: Option<&str>) -> ReadinessOutcome {
        match (self, readiness) {
            (Self::Pending, _) => ReadinessOutcome::Pending,

            (Self::Running(_), Readiness::Succeeded) => ReadinessOutcome::Pending,
            (Self::Running(_) | Self::Succeeded(_), Readiness::Running) => ReadinessOutcome::Ready,
            (Self::Succeeded(_), Readiness::Succeeded) => ReadinessOutcome::Ready,

            (Self::Running(containers) | Self::Succeeded(containers), Readiness::ContainersRunning) => {
                match containers {
                    ContainerSummary::AllRunning => ReadinessOutcome::Ready,
                    ContainerSummary::Incomplete => ReadinessOutcome::Pending,
                    ContainerSummary::Terminated { reason } => ReadinessOutcome::Fatal {
                        reason: reason.clone(),
                    },
                }
            }

            (Self::Invalid { phase, message }, _) => {
                let mut reason = format!("invalid pod phase \"{phase}\"");

                if let Some(message) = message {
                    reason.push_str(&format!("({message:?})"));
                }

                if let Some(event) = event {
                    reason.push_str(&format!(": {event}"));
                }

                ReadinessOutcome::Fatal { reason }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Pending,
    Ready,
    Fatal { reason: String },
}

fn latest_event(events: Vec<Event>) -> Option<Event> {
    events.into_iter().max_by(|a, b| {
        let a = (a.last_timestamp.as_ref(), a.metadata.creation_timestamp.as_ref());
        let b = (b.last_timestamp.as_ref(), b.metadata.creation_timestamp.as_ref());
        a.cmp(&b)
    })
}

/// Best effort, a failed lookup only costs the explanation.
async fn explain<C: Cluster>(cluster: &C, name: &str) -> Option<String> {
    match cluster.events_for::<Pod>(name).await {
        Ok(events) => latest_event(events).and_then(|event| event.message),
        Err(err) => {
            debug!("Could not look up events for pod {}: {}", name, err);
            None
        }
    }
}

#[instrument(skip(cluster), ret(level = Level::DEBUG), err(level = Level::DEBUG))]
pub async fn check_pod<C: Cluster>(
    cluster: &C,
    name: &str,
    readiness: Readiness,
) -> Result<ReadinessOutcome, PodError> {
    let pod = cluster
        .get::<Pod>(name)
        .await?
        .ok_or_else(|| PodError::NotFound {
            name: name.to_owned(),
        })?;

    let state = PodState::of(&pod);
    let event = match state {
        PodState::Invalid { .. } => explain(cluster, name).await,
        _ => None,
    };

    Ok(state.outcome(readiness, event.as_deref()))
}

#[instrument(skip(cluster, poll), fields(timeout = ?poll.timeout()), err(level = Level::WARN))]
pub async fn wait_for_pod<C: Cluster>(
    cluster: &C,
    name: &str,
    readiness: Readiness,
    poll: Poll,
) -> Result<(), WaitError<PodError>> {
    poll.until(move || async move {
        match check_pod(cluster, name, readiness).await? {
            ReadinessOutcome::Ready => Ok(true),
            ReadinessOutcome::Pending => Ok(false),
            ReadinessOutcome::Fatal { reason } => Err(PodError::Fatal {
                name: name.to_owned(),
                reason,
            }),
        }
    })
    .await
}

pub async fn wait_for_pod_containers_running<C: Cluster>(
    cluster: &C,
    name: &str,
    poll: Poll,
) -> Result<(), WaitError<PodError>> {
    wait_for_pod(cluster, name, Readiness::ContainersRunning, poll).await
}
