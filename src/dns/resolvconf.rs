//! Minimal `/etc/resolv.conf` reader.
//!
//! Only `nameserver` and `search` directives matter to the resolution
//! layer; everything else (options, sortlist, domain) is ignored. Each
//! nameserver address becomes a port-53 endpoint string in the form the
//! network backend consumes.

use std::fs;
use std::io;
use std::net::IpAddr;

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

#[derive(Debug, Clone, Default)]
pub(crate) struct SystemConfig {
    /// `"addr:53"` endpoints, IPv6 addresses bracketed.
    pub nameservers: Vec<String>,
    pub domains: Vec<String>,
}

pub(crate) fn read_system_config() -> io::Result<SystemConfig> {
    let content = fs::read_to_string(RESOLV_CONF_PATH)?;
    Ok(parse(&content))
}

pub(crate) fn parse(content: &str) -> SystemConfig {
    let mut config = SystemConfig::default();
    for line in content.lines() {
        let line = match line.find(['#', ';']) {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("nameserver") => {
                let Some(address) = tokens.next() else {
                    continue;
                };
                match address.parse::<IpAddr>() {
                    Ok(IpAddr::V4(v4)) => config.nameservers.push(format!("{v4}:53")),
                    Ok(IpAddr::V6(v6)) => config.nameservers.push(format!("[{v6}]:53")),
                    Err(_) => {
                        tracing::debug!(address = %address, "ignoring bad nameserver entry");
                    }
                }
            }
            Some("search") => {
                config.domains.extend(tokens.map(str::to_string));
            }
            _ => {}
        }
    }
    config
}
