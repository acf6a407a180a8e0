use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard, StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

use crate::Error;
use crate::platforms::discord::commands::register_global_slash_commands;
use crate::platforms::discord::interaction::InteractionRouter;
use crate::services::BountyService;

/// Reads interactions off one shard. Every interaction is handled on its own
/// task so a slow Discord round-trip never stalls the gateway.
async fn shard_runner(mut shard: Shard, router: Arc<InteractionRouter>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for interactions.");

    let wanted = EventTypeFlags::READY | EventTypeFlags::INTERACTION_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(Event::Ready(ready)) => {
                let data: &ReadyPayload = ready.as_ref();
                info!("Shard {shard_id} => READY as {} (ID={})", data.user.name, data.user.id);
            }
            Ok(Event::InteractionCreate(create)) => {
                let router = router.clone();
                tokio::spawn(async move {
                    let interaction = create.0;
                    let id = interaction.id;
                    if let Err(e) = router.handle(interaction).await {
                        error!(interaction = %id, "failed to answer interaction: {e}");
                    }
                });
            }
            Ok(other) => trace!("Shard {shard_id} => unhandled event: {:?}", other.kind()),
            Err(err) => error!("Shard {shard_id} => error receiving event: {err:?}"),
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

pub struct DiscordRuntime {
    token: String,
    review_channel: Id<ChannelMarker>,
    service: Arc<BountyService>,
    shard_senders: Vec<MessageSender>,
    shard_tasks: Vec<JoinHandle<()>>,
}

impl DiscordRuntime {
    pub fn new(token: String, review_channel_id: u64, service: Arc<BountyService>) -> Result<Self, Error> {
        let review_channel = Id::<ChannelMarker>::new_checked(review_channel_id)
            .ok_or_else(|| Error::Config("review channel id must be non-zero".into()))?;
        Ok(Self {
            token,
            review_channel,
            service,
            shard_senders: Vec::new(),
            shard_tasks: Vec::new(),
        })
    }

    /// Registers the slash commands and starts the recommended shards.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::Config("Discord token is empty".into()));
        }
        if !self.shard_tasks.is_empty() {
            info!("(DiscordRuntime) Already connected => skipping");
            return Ok(());
        }

        let http: Arc<HttpClient> = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );

        let application_id = http
            .current_user_application()
            .await
            .map_err(|e| Error::Platform(format!("Failed to fetch application: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Failed to parse application: {e}")))?
            .id;

        register_global_slash_commands(&http, application_id).await?;
        info!("Slash commands registered for application {application_id}");

        let router = Arc::new(InteractionRouter::new(
            http.clone(),
            application_id,
            self.service.clone(),
            self.review_channel,
        ));

        let config = Config::new(self.token.clone(), Intents::GUILDS);
        let shards = gateway::create_recommended(&http, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let router = router.clone();
            self.shard_tasks.push(tokio::spawn(shard_runner(shard, router)));
        }
        Ok(())
    }

    /// Resolves once every shard loop has ended. Safe to cancel and call again.
    pub async fn wait(&mut self) {
        while let Some(task) = self.shard_tasks.last_mut() {
            let result = task.await;
            self.shard_tasks.pop();
            if let Err(e) = result {
                error!("shard task panicked: {e}");
            }
        }
    }

    pub async fn disconnect(&mut self) {
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        self.wait().await;
        self.shard_senders.clear();
        info!("(DiscordRuntime) Disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::helpers::memory_service;

    #[test]
    fn test_zero_review_channel_is_rejected() {
        let result = DiscordRuntime::new("token".into(), 0, Arc::new(memory_service()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_token_fails_before_network() {
        let mut runtime = DiscordRuntime::new("  ".into(), 42, Arc::new(memory_service())).unwrap();
        assert!(matches!(runtime.connect().await, Err(Error::Config(_))));
    }
}
