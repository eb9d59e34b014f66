//! Provides the builder and implementation of [`TargetResolver`] that turns a
//! service into the upstream targets a reverse proxy should route to.

use crate::{
    address::{host_of_cidr, parse_virtual_address},
    Diagnostics, DockerApi, IngressNetworks, Service, TaskFilter, TaskLookup, Warning,
};
use serde::Deserialize;

/// Enumerates the ways a service can be exposed to the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyStrategy {
    /// Route to the service name and let the orchestrator's own
    /// virtual ip load balancing fan out to the tasks.
    #[default]
    ServiceName,
    /// Route to every running task directly.
    TaskAddresses,
}

/// Error returned when a target resolution could not be carried out.
///
/// A service resolving to no target at all is not an error, see [`Warning`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The control plane call failed, e.g. connectivity loss or timeout.
    #[error(transparent)]
    OrchestrationQuery(anyhow::Error),
}

/// The outcome of resolving one service with its own [`Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub targets: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Resolves proxy targets for services, using a [`ProxyStrategy`] fixed at build time.
///
/// ```rust
/// use swarm_targets::{Diagnostics, DockerApi, IngressNetworks, NetworkId, Service, TargetResolver};
///
/// #[tokio::main]
/// async fn main() {
///     let engine = DockerApi::new("http://127.0.0.1:2375").expect("valid engine url");
///     let ingress: IngressNetworks = vec![NetworkId::from("ingress-net")].into_iter().collect();
///
///     let resolver = TargetResolver::builder(engine).ingress_networks(ingress).build();
///
///     let service = Service::new("svc-id", "web").with_virtual_address("ingress-net", "10.0.0.5/24");
///     let mut diagnostics = Diagnostics::new();
///     let targets = resolver
///         .resolve_targets(&service, &mut diagnostics, true)
///         .await
///         .expect("service name resolution does not query the engine");
///
///     assert_eq!(targets, vec!["web".to_string()]);
///     assert!(diagnostics.is_empty());
/// }
/// ```
#[derive(Debug)]
pub struct TargetResolver<T> {
    lookup: T,
    ingress_networks: IngressNetworks,
    strategy: ProxyStrategy,
}

impl<T: TaskLookup + Send + Sync> TargetResolver<T> {
    /// Start configuring a `TargetResolver` that lists tasks through `lookup`.
    pub fn builder(lookup: T) -> TargetResolverBuilder<T> {
        TargetResolverBuilder::new(lookup)
    }

    pub fn strategy(&self) -> ProxyStrategy {
        self.strategy
    }

    pub fn ingress_networks(&self) -> &IngressNetworks {
        &self.ingress_networks
    }

    /// Resolve the targets of `service`, collecting warnings into a fresh [`Diagnostics`].
    ///
    /// Only addresses on [`IngressNetworks`] are considered.
    pub async fn resolve(&self, service: &Service) -> Result<Resolution, ResolveError> {
        let mut diagnostics = Diagnostics::new();
        let targets = self.resolve_targets(service, &mut diagnostics, true).await?;

        Ok(Resolution {
            targets,
            diagnostics,
        })
    }

    /// Resolve the targets the proxy should route to for `service`.
    ///
    /// With [`ProxyStrategy::TaskAddresses`] these are the task addresses.
    /// With [`ProxyStrategy::ServiceName`] it is the service name alone, once the
    /// virtual addresses confirmed the service is reachable from the proxy. An
    /// unreachable service still resolves to its name, with a warning.
    #[tracing::instrument(level = "debug", skip(self, service, diagnostics), fields(service = %service.id))]
    pub async fn resolve_targets(
        &self,
        service: &Service,
        diagnostics: &mut Diagnostics,
        ingress_only: bool,
    ) -> Result<Vec<String>, ResolveError> {
        match self.strategy {
            ProxyStrategy::TaskAddresses => {
                self.resolve_task_addresses(service, diagnostics, ingress_only)
                    .await
            }
            ProxyStrategy::ServiceName => {
                self.resolve_virtual_addresses(service, diagnostics, ingress_only);
                Ok(vec![service.name.clone()])
            }
        }
    }

    /// Collect the virtual addresses of `service`, in declaration order.
    ///
    /// Unless `ingress_only` is false, only addresses on a network shared with
    /// the proxy are kept. Warns when nothing is left.
    pub fn resolve_virtual_addresses(
        &self,
        service: &Service,
        diagnostics: &mut Diagnostics,
        ingress_only: bool,
    ) -> Vec<String> {
        let addresses: Vec<String> = service
            .virtual_addresses
            .iter()
            .filter(|vip| !ingress_only || self.ingress_networks.contains(&vip.network))
            .filter(|vip| match parse_virtual_address(&vip.address) {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!(service = %service.id, network = %vip.network, "dropping virtual address: {}", err);
                    false
                }
            })
            .map(|vip| vip.address.clone())
            .collect();

        if addresses.is_empty() {
            diagnostics.push(Warning::NotInSameNetwork {
                service: service.id.clone(),
            });
        }

        addresses
    }

    /// Collect the host addresses of the running tasks of `service`.
    ///
    /// Order follows the tasks, then their attachments, then the addresses of
    /// each attachment. Duplicates are kept. Addresses that fail to parse are dropped.
    #[tracing::instrument(level = "debug", skip(self, service, diagnostics), fields(service = %service.id))]
    pub async fn resolve_task_addresses(
        &self,
        service: &Service,
        diagnostics: &mut Diagnostics,
        ingress_only: bool,
    ) -> Result<Vec<String>, ResolveError> {
        let tasks = self
            .lookup
            .list_tasks(&TaskFilter::running(service.id.clone()))
            .await
            .map_err(ResolveError::OrchestrationQuery)?;

        let mut has_running_tasks = false;
        let mut addresses = Vec::new();

        // The filter only matches the desired state, the observed one may lag behind.
        for task in tasks.iter().filter(|task| task.state.is_running()) {
            has_running_tasks = true;

            for attachment in &task.network_attachments {
                if ingress_only && !self.ingress_networks.contains(&attachment.network) {
                    continue;
                }

                for cidr in &attachment.addresses {
                    match host_of_cidr(cidr) {
                        Ok(ip) => {
                            tracing::debug!("result: task {} ip {}", task.id, ip);
                            addresses.push(ip.to_string());
                        }
                        Err(err) => {
                            tracing::warn!(task = %task.id, network = %attachment.network, "dropping task address: {}", err);
                        }
                    }
                }
            }
        }

        if !has_running_tasks {
            diagnostics.push(Warning::NoRunningTask {
                service: service.id.clone(),
            });
        } else if addresses.is_empty() {
            diagnostics.push(Warning::NotInSameNetwork {
                service: service.id.clone(),
            });
        }

        Ok(addresses)
    }
}

/// Builder to configure and create a [`TargetResolver`].
pub struct TargetResolverBuilder<T> {
    lookup: T,
    ingress_networks: IngressNetworks,
    strategy: ProxyStrategy,
}

impl<T: TaskLookup + Send + Sync> TargetResolverBuilder<T> {
    /// Defaults to [`ProxyStrategy::ServiceName`] and no ingress network.
    pub fn new(lookup: T) -> Self {
        Self {
            lookup,
            ingress_networks: IngressNetworks::default(),
            strategy: ProxyStrategy::default(),
        }
    }

    /// Set a custom [`TaskLookup`].
    pub fn task_lookup<U: TaskLookup + Send + Sync>(self, lookup: U) -> TargetResolverBuilder<U> {
        TargetResolverBuilder {
            lookup,
            ingress_networks: self.ingress_networks,
            strategy: self.strategy,
        }
    }

    /// Set the [`ProxyStrategy`].
    ///
    /// Default set to [`ProxyStrategy::ServiceName`].
    pub fn strategy(self, strategy: ProxyStrategy) -> Self {
        Self { strategy, ..self }
    }

    /// Set the networks the proxy shares with the services.
    ///
    /// Default set to none, so every ingress-only resolution comes back empty.
    pub fn ingress_networks(self, ingress_networks: IngressNetworks) -> Self {
        Self {
            ingress_networks,
            ..self
        }
    }

    /// Construct a [`TargetResolver`] from the [`TargetResolverBuilder`] instance.
    pub fn build(self) -> TargetResolver<T> {
        TargetResolver {
            lookup: self.lookup,
            ingress_networks: self.ingress_networks,
            strategy: self.strategy,
        }
    }
}

const _: () = {
    const fn assert_is_send<T: Send + Sync>() {}
    assert_is_send::<TargetResolverBuilder<DockerApi>>();
    assert_is_send::<TargetResolver<DockerApi>>();
};
