use anyhow::Context;
use swarm_targets::{DockerApi, IngressNetworks, NetworkId, TargetResolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swarm_targets=debug,info")),
        )
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    // The networks the proxy container is attached to, e.g. `PROXY_NETWORKS=abc123,def456`.
    let ingress_networks: IngressNetworks = std::env::var("PROXY_NETWORKS")
        .unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
        .map(NetworkId::from)
        .collect();

    let engine = DockerApi::from_env()?;
    let services = engine
        .list_services()
        .await
        .context("failed to list swarm services")?;

    // Routes to service names, the default strategy.
    let resolver = TargetResolver::builder(engine)
        .ingress_networks(ingress_networks)
        .build();

    for service in &services {
        let resolution = resolver.resolve(service).await?;
        println!("{} -> {:?}", service.name, resolution.targets);
        print!("{}", resolution.diagnostics);
    }

    Ok(())
}
