use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;

#[derive(Clone, Deserialize, Serialize)]
pub struct ContainerConfig {
    /// Local path or stream URL (rtsp/http/...)
    pub locator: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct PacketConfig {
    /// UDP port to bind on all interfaces
    pub port: u16,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    pub container: Option<ContainerConfig>,

    pub packet: Option<PacketConfig>,

    /// Where the host binary writes the captured audio
    pub output_wav: Option<String>,
}

pub async fn load() -> Result<Config> {
    let config = read_to_string("Config.toml").await?;
    let config: Config = toml::from_str(&config)?;

    Ok(config)
}
