//! Wake-on-LAN for powered-off processors.
//!
//! The automation port is closed while the unit is off, so power-on goes out
//! of band as a UDP magic packet. The MAC is checked against the vendor
//! prefixes Altitude units ship with before anything is sent.

use crate::error::{AltitudeError, Result};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;

/// Organizationally unique identifiers found on Altitude network interfaces
pub const VALID_OUIS: [[u8; 3]; 3] = [[0xc8, 0x7f, 0x54], [0x64, 0x98, 0x9e], [0xd4, 0x5d, 0xdf]];

/// Standard discard port used for magic packets
pub const WOL_PORT: u16 = 9;

/// Parse `aa:bb:cc:dd:ee:ff` (or `-` separated) and check its vendor prefix
pub fn validate_mac(mac: &str) -> Result<[u8; 6]> {
    let malformed = || AltitudeError::MalformedMacAddress(mac.to_string());

    let parts: Vec<&str> = mac.trim().split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(malformed());
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        if part.len() != 2 {
            return Err(malformed());
        }
        *octet = u8::from_str_radix(part, 16).map_err(|_| malformed())?;
    }

    if !VALID_OUIS.iter().any(|oui| octets[..3] == oui[..]) {
        return Err(AltitudeError::InvalidMacAddressOui(mac.to_string()));
    }

    Ok(octets)
}

/// Six `0xFF` bytes followed by the MAC repeated sixteen times
pub fn magic_packet(mac: &[u8; 6]) -> [u8; 102] {
    let mut packet = [0xFFu8; 102];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(mac);
    }
    packet
}

/// Broadcast a magic packet for `mac` on the local network
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// trinnov_altitude::wake_on_lan("c8:7f:54:12:34:56").await?;
/// # Ok(())
/// # }
/// ```
pub async fn wake_on_lan(mac: &str) -> Result<()> {
    let target = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, WOL_PORT));
    wake_on_lan_to(mac, target).await
}

/// Send a magic packet for `mac` to an explicit address
pub async fn wake_on_lan_to(mac: &str, target: SocketAddr) -> Result<()> {
    let octets = validate_mac(mac)?;
    let packet = magic_packet(&octets);

    let socket = UdpSocket::bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))).await?;
    socket.set_broadcast(true)?;
    socket.send_to(&packet, target).await?;

    tracing::info!(mac = %mac, target = %target, "Sent Wake-on-LAN packet");
    Ok(())
}
