//! `swarm_targets` decides which network addresses a reverse proxy should route to
//! for a Docker Swarm service, right now.
//!
//! Two strategies are supported, picked once through [`ProxyStrategy`]:
//!
//! - [`ProxyStrategy::ServiceName`] routes to the service name and relies on the
//!   swarm's internal DNS and virtual ip load balancing. The virtual addresses are
//!   still checked, so that a service the proxy cannot reach is reported early.
//! - [`ProxyStrategy::TaskAddresses`] routes to every running task directly.
//!
//! # Simple example
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), anyhow::Error> {
//!     use swarm_targets::{DockerApi, IngressNetworks, NetworkId, ProxyStrategy, TargetResolver};
//!
//!     let engine = DockerApi::from_env()?;
//!     let services = engine.list_services().await?;
//!
//!     let resolver = TargetResolver::builder(engine)
//!         .strategy(ProxyStrategy::TaskAddresses)
//!         .ingress_networks(vec![NetworkId::from("proxy-net")].into_iter().collect::<IngressNetworks>())
//!         .build();
//!
//!     for service in &services {
//!         let resolution = resolver.resolve(service).await?;
//!         println!("{} -> {:?}", service.name, resolution.targets);
//!         print!("{}", resolution.diagnostics);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! [`TargetResolver`] also allows plugging in a different implementation of [`TaskLookup`].
//!
//! ```rust
//! use swarm_targets::{Task, TaskFilter, TaskLookup};
//!
//! // This knows no task at all
//! struct DummyTaskLookup;
//!
//! #[async_trait::async_trait]
//! impl TaskLookup for DummyTaskLookup {
//!     async fn list_tasks(&self, _filter: &TaskFilter) -> Result<Vec<Task>, anyhow::Error> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     use swarm_targets::{Diagnostics, ProxyStrategy, Service, TargetResolver};
//!
//!     let resolver = TargetResolver::builder(DummyTaskLookup)
//!         .strategy(ProxyStrategy::TaskAddresses)
//!         .build();
//!
//!     let mut diagnostics = Diagnostics::new();
//!     let targets = resolver
//!         .resolve_targets(&Service::new("s1", "web"), &mut diagnostics, true)
//!         .await
//!         .expect("the dummy lookup never fails");
//!
//!     assert!(targets.is_empty());
//!     assert_eq!(
//!         diagnostics.render(),
//!         "[WARNING] Service s1 doesn't have any task in running state\n"
//!     );
//! }
//! ```
//!
//! # Diagnostics
//! A service without targets never fails the resolution: the reason is recorded
//! as a [`Warning`] in [`Diagnostics`] and the proxy configuration of every other
//! service proceeds. Only a failing control plane call surfaces as [`ResolveError`].
//! Addresses that do not parse are dropped and logged.

pub mod address;
mod diagnostics;
mod docker;
mod ingress;
mod resolver;
mod service;
mod task_lookup;

pub use diagnostics::*;
pub use docker::*;
pub use ingress::*;
pub use resolver::*;
pub use service::*;
pub use task_lookup::*;
