//! Print every broadcast message from an Altitude until Ctrl-C.
//!
//! Usage: `cargo run --example monitor -- <host> [mac]`
//!
//! When a MAC address is given, a Wake-on-LAN packet is sent first.

use std::time::Duration;
use trinnov_altitude::{wake_on_lan, AltitudeClient, ClientConfig, Timeout};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().ok_or("usage: monitor <host> [mac]")?;

    if let Some(mac) = args.next() {
        wake_on_lan(&mac).await?;
        // Give the processor time to boot its automation server
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    let client = AltitudeClient::new(ClientConfig::new(host).with_client_id("altitude-monitor"));
    client.register_callback(|message| match serde_json::to_string(message) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode message: {}", e),
    });

    client.connect(Timeout::Default).await?;
    tokio::signal::ctrl_c().await?;
    client.disconnect(Timeout::Default).await?;

    println!("{}", serde_json::to_string_pretty(&client.state())?);
    Ok(())
}
