//! Snapshot of the swarm objects a resolution looks at: services, their
//! virtual addresses, and the tasks running on their behalf.
//!
//! Every type deserializes straight from the Docker Engine JSON so that
//! [`DockerApi`](crate::DockerApi) needs no intermediate representation.

use serde::Deserialize;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque identifier the orchestrator assigns to a service.
    ServiceId
);

string_id!(
    /// Opaque identifier of an overlay network.
    NetworkId
);

/// A stable address assigned to a service as a whole on one network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VirtualAddress {
    #[serde(rename = "NetworkID")]
    pub network: NetworkId,
    /// Either a bare IP or a CIDR, depending on the engine version.
    #[serde(rename = "Addr")]
    pub address: String,
}

/// A swarm service as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "wire::Service")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub virtual_addresses: Vec<VirtualAddress>,
}

impl Service {
    /// Create a [`Service`] without any virtual address.
    pub fn new<I: Into<ServiceId>, N: ToString>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            virtual_addresses: Vec::new(),
        }
    }

    /// Attach a virtual address on `network`.
    pub fn with_virtual_address<N: Into<NetworkId>, A: ToString>(
        mut self,
        network: N,
        address: A,
    ) -> Self {
        self.virtual_addresses.push(VirtualAddress {
            network: network.into(),
            address: address.to_string(),
        });
        self
    }
}

/// Lifecycle states of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    New,
    Allocated,
    Pending,
    Assigned,
    Accepted,
    Preparing,
    Ready,
    Starting,
    Running,
    Complete,
    Shutdown,
    Failed,
    Rejected,
    Remove,
    Orphaned,
    /// Any state this crate does not know about yet.
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn is_running(self) -> bool {
        self == TaskState::Running
    }

    /// The name the engine uses for this state in filters and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::New => "new",
            TaskState::Allocated => "allocated",
            TaskState::Pending => "pending",
            TaskState::Assigned => "assigned",
            TaskState::Accepted => "accepted",
            TaskState::Preparing => "preparing",
            TaskState::Ready => "ready",
            TaskState::Starting => "starting",
            TaskState::Running => "running",
            TaskState::Complete => "complete",
            TaskState::Shutdown => "shutdown",
            TaskState::Failed => "failed",
            TaskState::Rejected => "rejected",
            TaskState::Remove => "remove",
            TaskState::Orphaned => "orphaned",
            TaskState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The addresses a task holds on one network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "wire::NetworkAttachment")]
pub struct NetworkAttachment {
    pub network: NetworkId,
    /// CIDR formatted, e.g. `10.0.1.2/24`.
    pub addresses: Vec<String>,
}

impl NetworkAttachment {
    pub fn new<N: Into<NetworkId>, A: ToString>(network: N, addresses: &[A]) -> Self {
        Self {
            network: network.into(),
            addresses: addresses.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One replica of a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "wire::Task")]
pub struct Task {
    pub id: String,
    pub service: ServiceId,
    /// The state the task was last observed in.
    pub state: TaskState,
    /// The state the orchestrator is driving the task towards.
    pub desired_state: TaskState,
    pub network_attachments: Vec<NetworkAttachment>,
}

impl Task {
    /// Create a task that is both desired and observed in `state`.
    pub fn new<I: ToString, S: Into<ServiceId>>(id: I, service: S, state: TaskState) -> Self {
        Self {
            id: id.to_string(),
            service: service.into(),
            state,
            desired_state: state,
            network_attachments: Vec::new(),
        }
    }

    pub fn with_desired_state(self, desired_state: TaskState) -> Self {
        Self {
            desired_state,
            ..self
        }
    }

    pub fn with_attachment(mut self, attachment: NetworkAttachment) -> Self {
        self.network_attachments.push(attachment);
        self
    }
}

/// Shapes of the engine payloads, flattened into the public types above.
mod wire {
    use super::{NetworkId, ServiceId, TaskState, VirtualAddress};
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct Service {
        #[serde(rename = "ID")]
        id: ServiceId,
        #[serde(rename = "Spec", default)]
        spec: ServiceSpec,
        #[serde(rename = "Endpoint", default)]
        endpoint: Endpoint,
    }

    #[derive(Deserialize, Default)]
    struct ServiceSpec {
        #[serde(rename = "Name", default)]
        name: String,
    }

    #[derive(Deserialize, Default)]
    struct Endpoint {
        #[serde(rename = "VirtualIPs", default)]
        virtual_ips: Vec<VirtualAddress>,
    }

    impl From<Service> for super::Service {
        fn from(service: Service) -> Self {
            Self {
                id: service.id,
                name: service.spec.name,
                virtual_addresses: service.endpoint.virtual_ips,
            }
        }
    }

    #[derive(Deserialize)]
    pub(super) struct Task {
        #[serde(rename = "ID")]
        id: String,
        #[serde(rename = "ServiceID")]
        service_id: ServiceId,
        #[serde(rename = "Status")]
        status: TaskStatus,
        #[serde(rename = "DesiredState")]
        desired_state: TaskState,
        #[serde(rename = "NetworksAttachments", default)]
        networks_attachments: Vec<super::NetworkAttachment>,
    }

    #[derive(Deserialize)]
    struct TaskStatus {
        #[serde(rename = "State")]
        state: TaskState,
    }

    impl From<Task> for super::Task {
        fn from(task: Task) -> Self {
            Self {
                id: task.id,
                service: task.service_id,
                state: task.status.state,
                desired_state: task.desired_state,
                network_attachments: task.networks_attachments,
            }
        }
    }

    #[derive(Deserialize)]
    pub(super) struct NetworkAttachment {
        #[serde(rename = "Network")]
        network: Network,
        #[serde(rename = "Addresses", default)]
        addresses: Vec<String>,
    }

    #[derive(Deserialize)]
    struct Network {
        #[serde(rename = "ID")]
        id: NetworkId,
    }

    impl From<NetworkAttachment> for super::NetworkAttachment {
        fn from(attachment: NetworkAttachment) -> Self {
            Self {
                network: attachment.network.id,
                addresses: attachment.addresses,
            }
        }
    }
}
