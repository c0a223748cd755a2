use std::path::PathBuf;

use blocks_bridge::BridgeSettings;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

#[derive(Parser, Clone, Debug)]
#[command(name = "blocks-host", version, about = "Headless host for the Blocks instruction bridge", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        help = "JSON file with bridge settings. Missing fields keep their defaults."
    )]
    pub settings: Option<PathBuf>,

    #[arg(long, help = "Only accept messages posted to this channel.")]
    pub channel: Option<String>,

    #[arg(
        long,
        value_name = "BOOL",
        help = "Refuse instructions that target plain http:// URLs."
    )]
    pub https_only: Option<bool>,
}

impl Cli {
    /// Settings from the settings file, with command line flags applied on top.
    pub fn bridge_settings(&self) -> Result<BridgeSettings> {
        let mut settings = match &self.settings {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read settings from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .wrap_err_with(|| format!("Invalid settings in {}", path.display()))?
            }
            None => BridgeSettings::default(),
        };

        if let Some(channel) = &self.channel {
            settings.channel_name = channel.clone();
        }
        if let Some(https_only) = self.https_only {
            settings.https_only = https_only;
        }

        Ok(settings)
    }
}
