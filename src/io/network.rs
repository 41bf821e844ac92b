//! Network probe: connectivity, local address and Wi-Fi signal level.

use regex::Regex;
use std::net::UdpSocket;
use std::process::Command;
use std::sync::OnceLock;

use crate::render::Connectivity;

/// Network facts the control loop needs.
pub trait NetworkStatus {
    fn is_connected(&self) -> bool;

    /// Address of the interface that routes to the internet.
    fn local_ip(&self) -> Option<String>;

    /// Wi-Fi signal level in dBm, `None` when not on Wi-Fi or unknown.
    fn signal_strength(&self) -> Option<i32>;

    fn connectivity(&self) -> Connectivity {
        Connectivity {
            ip: self.local_ip(),
            signal_dbm: self.signal_strength(),
        }
    }
}

/// Probe backed by system tools.
///
/// Connected means `hostname -I` lists at least one address. The local IP is
/// the source address the kernel picks for a UDP "connection" to a public
/// resolver; nothing is sent. The signal level comes from `iwconfig`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNetwork;

impl NetworkStatus for SystemNetwork {
    fn is_connected(&self) -> bool {
        match Command::new("hostname").arg("-I").output() {
            Ok(output) => {
                output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
            }
            Err(_) => false,
        }
    }

    fn local_ip(&self) -> Option<String> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let addr = socket.local_addr().ok()?;
        (!addr.ip().is_unspecified()).then(|| addr.ip().to_string())
    }

    fn signal_strength(&self) -> Option<i32> {
        let output = Command::new("iwconfig").output().ok()?;
        parse_signal_level(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract `Signal level=-NN dBm` from `iwconfig` output.
pub fn parse_signal_level(iwconfig_output: &str) -> Option<i32> {
    static SIGNAL_LEVEL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = SIGNAL_LEVEL
        .get_or_init(|| Regex::new(r"Signal level=(-?\d+)\s*dBm").ok())
        .as_ref()?;

    re.captures(iwconfig_output)?.get(1)?.as_str().parse().ok()
}
