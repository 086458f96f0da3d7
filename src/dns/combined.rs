//! Stacked resolution: hosts-file bindings in front of the network.
//!
//! The client's normal configuration consults the local hosts file first
//! so operators can pin or override individual endpoints, and only names
//! the file does not bind go out to the name servers. Same shape as an
//! overrides map wrapped around an inner resolver, expressed as a
//! [`Resolver`] so callers cannot tell it from a plain backend.

use std::io;

use super::failure::Failure;
use super::hickory::HickoryResolver;
use super::hostfile::HostfileResolver;
use super::resolver::{Resolver, Resolving};

/// Hostfile-then-network resolver.
///
/// Name-server configuration applies to the network half; search domains
/// apply to both halves so an override like `myhost` keeps working after
/// expansion.
pub struct CombinedResolver {
    hostfile: HostfileResolver,
    network: HickoryResolver,
}

impl CombinedResolver {
    /// Creates the stacked resolver. `hostfile_path` follows
    /// [`HostfileResolver::new`] semantics (empty selects `HOST_ALIASES`,
    /// then `/etc/hosts`); the network half is preloaded with the system
    /// configuration.
    pub fn new(
        hostfile_path: &str,
        ipv4_only: bool,
        retries: u32,
        timeout_ms: u64,
    ) -> io::Result<CombinedResolver> {
        let hostfile = HostfileResolver::new(hostfile_path, ipv4_only)?;
        let network = HickoryResolver::new(ipv4_only, retries, timeout_ms);
        let mut combined = CombinedResolver { hostfile, network };
        let domains = combined.network.domains().to_vec();
        combined.hostfile.set_search_domains(&domains);
        Ok(combined)
    }
}

impl Resolver for CombinedResolver {
    fn ipv4_only(&self) -> bool {
        self.network.ipv4_only()
    }

    fn retries(&self) -> u32 {
        self.network.retries()
    }

    fn timeout_ms(&self) -> u64 {
        self.network.timeout_ms()
    }

    fn resolvers(&self) -> &[String] {
        self.network.resolvers()
    }

    fn domains(&self) -> &[String] {
        self.network.domains()
    }

    fn set_resolvers(&mut self, resolvers: &[String]) -> bool {
        self.network.set_resolvers(resolvers)
    }

    fn set_search_domains(&mut self, domains: &[String]) -> bool {
        let stored = self.hostfile.set_search_domains(domains);
        self.network.set_search_domains(domains) && stored
    }

    fn set_system_resolvers(&mut self) -> bool {
        self.network.set_system_resolvers()
    }

    fn set_system_search_domains(&mut self) -> bool {
        let network = self.network.set_system_search_domains();
        let domains = self.network.domains().to_vec();
        self.hostfile.set_search_domains(&domains);
        network
    }

    fn do_resolve<'a>(&'a mut self, names: &'a [String], skip: &'a [bool]) -> Resolving<'a> {
        Box::pin(async move {
            let local = self.hostfile.do_resolve(names, skip).await;

            // Indices the hosts file answered stay answered; the rest go
            // to the name servers.
            let mut skip_network = skip.to_vec();
            let mut fully_answered = true;
            for (i, record) in local.iter().enumerate() {
                if skip[i] {
                    continue;
                }
                if record.failure == Failure::Ok {
                    skip_network[i] = true;
                } else {
                    fully_answered = false;
                }
            }
            if fully_answered {
                return local;
            }

            let remote = self.network.do_resolve(names, &skip_network).await;
            local
                .into_iter()
                .zip(remote)
                .enumerate()
                .map(|(i, (local_record, remote_record))| {
                    if !skip[i] && !skip_network[i] {
                        remote_record
                    } else {
                        local_record
                    }
                })
                .collect()
        })
    }
}
