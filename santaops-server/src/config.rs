use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use santaops_core::Error;

#[derive(Parser, Debug, Clone)]
#[command(name = "santaops")]
#[command(author, version, about = "SantaOps - seasonal bounty board bot for Discord")]
pub struct Args {
    /// Bot token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Channel that receives registration and report artifacts.
    #[arg(long, env = "REPORT_CHANNEL_ID")]
    pub report_channel_id: Option<u64>,

    /// Postgres connection URL. Without it players live in memory only.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Quest catalog JSON. Falls back to the built-in list if missing.
    #[arg(long, env = "QUESTS_PATH", default_value = "data/quests.json")]
    pub quests_path: PathBuf,

    /// Liveness endpoint port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Run storage and liveness only.
    #[arg(long, default_value = "false")]
    pub no_discord: bool,
}

/// What the Discord runtime needs once `Args` has been validated.
#[derive(Debug, Clone)]
pub struct DiscordSettings {
    pub token: String,
    pub report_channel_id: u64,
}

impl Args {
    pub fn liveness_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// `None` with `--no-discord`; otherwise both token and channel are required.
    pub fn discord(&self) -> Result<Option<DiscordSettings>, Error> {
        if self.no_discord {
            return Ok(None);
        }
        let token = self
            .discord_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("DISCORD_TOKEN is not set".into()))?;
        let report_channel_id = self
            .report_channel_id
            .ok_or_else(|| Error::Config("REPORT_CHANNEL_ID is not set".into()))?;
        Ok(Some(DiscordSettings { token, report_channel_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("santaops").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--no-discord"]);
        assert_eq!(args.quests_path, PathBuf::from("data/quests.json"));
        assert!(args.discord().unwrap().is_none());
    }

    #[test]
    fn test_discord_requires_token_and_channel() {
        let args = parse(&["--discord-token", "abc"]);
        assert!(matches!(args.discord(), Err(Error::Config(_))));

        let args = parse(&["--discord-token", "abc", "--report-channel-id", "123"]);
        let settings = args.discord().unwrap().unwrap();
        assert_eq!(settings.token, "abc");
        assert_eq!(settings.report_channel_id, 123);
    }

    #[test]
    fn test_liveness_addr_uses_port() {
        let args = parse(&["--no-discord", "--port", "8080"]);
        assert_eq!(args.liveness_addr().port(), 8080);
    }
}
