use crate::NetworkId;
use std::collections::HashSet;

/// The networks the proxy itself is attached to.
///
/// Computed once by the caller, e.g. from the proxy container's own network
/// settings, and only ever queried afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressNetworks {
    networks: HashSet<NetworkId>,
}

impl IngressNetworks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `network` is shared between the proxy and the services.
    pub fn contains(&self, network: &NetworkId) -> bool {
        self.networks.contains(network)
    }

    pub fn insert<N: Into<NetworkId>>(&mut self, network: N) -> bool {
        self.networks.insert(network.into())
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl FromIterator<NetworkId> for IngressNetworks {
    fn from_iter<I: IntoIterator<Item = NetworkId>>(iter: I) -> Self {
        Self {
            networks: iter.into_iter().collect(),
        }
    }
}

/// Accepts the `network -> is ingress` mapping, keeping only the members.
impl FromIterator<(NetworkId, bool)> for IngressNetworks {
    fn from_iter<I: IntoIterator<Item = (NetworkId, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .filter_map(|(network, member)| member.then(|| network))
            .collect()
    }
}
