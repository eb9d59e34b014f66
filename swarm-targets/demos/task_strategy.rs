use anyhow::Context;
use swarm_targets::{
    Diagnostics, DockerApi, IngressNetworks, NetworkId, ProxyStrategy, ServiceId, TargetResolver,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let service_id: ServiceId = args
        .next()
        .context("usage: task_strategy <service-id> [network-id...]")?
        .into();
    let ingress_networks: IngressNetworks = args.map(NetworkId::from).collect();
    let ingress_only = !ingress_networks.is_empty();

    let engine = DockerApi::from_env()?;
    let service = engine
        .inspect_service(&service_id)
        .await
        .context("failed to inspect service")?;

    // Every running task is routed to directly, bypassing the virtual ip.
    let resolver = TargetResolver::builder(engine)
        .strategy(ProxyStrategy::TaskAddresses)
        .ingress_networks(ingress_networks)
        .build();

    let mut diagnostics = Diagnostics::new();
    let targets = resolver
        .resolve_targets(&service, &mut diagnostics, ingress_only)
        .await?;

    println!("TARGETS={targets:?}");
    print!("{diagnostics}");

    Ok(())
}
