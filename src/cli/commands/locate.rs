//! Locate command implementation - Find the device agent

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::AppConfig;
use crate::remote::{LocatorSettings, locate_agent};

pub async fn execute_locate_command(config: &AppConfig) -> Result<()> {
    let settings = LocatorSettings::from_config(&config.agent);
    println!(
        "🔍 Looking for the device agent on {}:{}..={}...",
        settings.host,
        settings.ports.start(),
        settings.ports.end()
    );

    let client = Client::builder().build()?;
    let info = locate_agent(&client, &settings)
        .await
        .context("Device agent not found. Is it running?")?;

    println!("✅ Device agent found");
    if let Some(version) = &info.version {
        println!("  Version: {}", version);
    }
    for (name, url) in [
        ("http", &info.http),
        ("https", &info.https),
        ("ws", &info.ws),
        ("wss", &info.wss),
    ] {
        if let Some(url) = url {
            println!("  {:<6} {}", name, url);
        }
    }
    Ok(())
}
