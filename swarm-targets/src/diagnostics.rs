//! Advisory output of a resolution.
//!
//! A [`Warning`] never stops target generation; it tells the operator why a
//! service ended up without targets.

use crate::ServiceId;
use std::fmt;

/// A condition under which a service resolved to no usable target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// None of the service's tasks is observed running.
    NoRunningTask { service: ServiceId },
    /// The service is not reachable on any network shared with the proxy.
    NotInSameNetwork { service: ServiceId },
}

impl Warning {
    pub fn service(&self) -> &ServiceId {
        match self {
            Warning::NoRunningTask { service } | Warning::NotInSameNetwork { service } => service,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoRunningTask { service } => write!(
                f,
                "[WARNING] Service {} doesn't have any task in running state",
                service
            ),
            Warning::NotInSameNetwork { service } => write!(
                f,
                "[WARNING] Service {} and proxy are not in same network",
                service
            ),
        }
    }
}

/// Append-only sink of [`Warning`]s, kept in emission order.
///
/// Give each resolution its own sink and [`merge`](Diagnostics::merge) them
/// afterwards when resolving concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `warning` and log it.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(service = %warning.service(), "{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Append everything `other` collected, after what is already here.
    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// One line per warning, each terminated by `\n`.
    pub fn render(&self) -> String {
        self.warnings
            .iter()
            .map(|warning| format!("{}\n", warning))
            .collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
