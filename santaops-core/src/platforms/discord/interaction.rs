// File: santaops-core/src/platforms/discord/interaction.rs
//
// Turns Discord interactions into core trigger events and core results into
// interaction responses. Holds no state of its own.
//
// Discord drops an interaction that is not acknowledged within three seconds,
// so anything that touches storage or posts a message is deferred first and
// answered by editing the deferred response.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use twilight_http::Client as HttpClient;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::channel::message::MessageFlags;
use twilight_model::channel::message::component::Component;
use twilight_model::channel::message::embed::Embed;
use twilight_model::guild::Permissions;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker};

use santaops_common::models::{
    QuestId, RegisterRequest, ReportArtifact, ReportRequest, ReviewActivation, ReviewOutcome,
};

use crate::Error;
use crate::platforms::discord::commands;
use crate::platforms::discord::render;
use crate::review::token;
use crate::services::BountyService;

/// Immediate answers that need no storage round-trip.
#[derive(Debug)]
pub enum Reply {
    Ephemeral(String),
    Modal {
        custom_id: &'static str,
        title: &'static str,
        components: Vec<Component>,
    },
}

/// Result of a deferred interaction.
#[derive(Debug)]
pub enum Outcome {
    Notice(String),
    Embed(Embed),
    /// Edits the message the clicked component belongs to.
    Update {
        content: String,
        components: Vec<Component>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferral {
    /// Ephemeral "thinking" reply, later edited into the result.
    Message,
    /// Silent acknowledgement of a component click; the clicked message is
    /// edited later and notices go out as ephemeral follow-ups.
    Update,
}

/// What a component click leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRoute {
    OpenRegister,
    OpenReport,
    AlreadyDone,
    Review,
    Unknown,
}

impl ComponentRoute {
    /// Modals must be the first response, so only review clicks are deferred.
    pub fn deferral(self) -> Option<Deferral> {
        match self {
            ComponentRoute::Review => Some(Deferral::Update),
            _ => None,
        }
    }
}

pub fn component_route(custom_id: &str) -> ComponentRoute {
    match custom_id {
        render::START_REGISTER_ID => ComponentRoute::OpenRegister,
        render::START_REPORT_ID => ComponentRoute::OpenReport,
        render::REVIEW_DONE_ID => ComponentRoute::AlreadyDone,
        id if token::looks_like_token(id) => ComponentRoute::Review,
        _ => ComponentRoute::Unknown,
    }
}

pub fn deferred_response(deferral: Deferral) -> InteractionResponse {
    match deferral {
        Deferral::Message => InteractionResponse {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data: Some(InteractionResponseData {
                flags: Some(MessageFlags::EPHEMERAL),
                ..Default::default()
            }),
        },
        Deferral::Update => InteractionResponse {
            kind: InteractionResponseType::DeferredUpdateMessage,
            data: None,
        },
    }
}

/// Text shown to the user for a failed trigger. Infrastructure details stay in the logs.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::AlreadyRegistered(_) => "You are already registered.".to_string(),
        Error::PlayerNotFound(_) => {
            "You are not registered yet. Press **REGISTER** on the dashboard first.".to_string()
        }
        Error::MalformedToken(_) => "This button is no longer valid.".to_string(),
        Error::Unauthorized(_) => "Only administrators can do that.".to_string(),
        Error::InvalidInput(msg) => format!("Invalid input: {msg}"),
        e if e.is_transient() => {
            "Storage is temporarily unavailable, please try again in a minute.".to_string()
        }
        _ => "Something went wrong, please try again later.".to_string(),
    }
}

pub fn is_admin(interaction: &Interaction) -> bool {
    interaction
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.contains(Permissions::ADMINISTRATOR))
}

fn modal_value(data: &ModalInteractionData, field: &str) -> Option<String> {
    data.components
        .iter()
        .flat_map(|row| row.components.iter())
        .find(|c| c.custom_id == field)
        .and_then(|c| c.value.clone())
}

/// `(quest, attachment url)` from a `/report` invocation.
fn report_options(cmd: &CommandData) -> Option<(i64, String)> {
    let mut quest = None;
    let mut attachment = None;
    for opt in &cmd.options {
        match (opt.name.as_str(), &opt.value) {
            (commands::QUEST_OPTION, CommandOptionValue::Integer(n)) => quest = Some(*n),
            (commands::PROOF_OPTION, CommandOptionValue::Attachment(id)) => attachment = Some(*id),
            _ => {}
        }
    }
    let url = cmd.resolved.as_ref()?.attachments.get(&attachment?)?.url.clone();
    Some((quest?, url))
}

pub struct InteractionRouter {
    http: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
    service: Arc<BountyService>,
    review_channel: Id<ChannelMarker>,
}

impl InteractionRouter {
    pub fn new(
        http: Arc<HttpClient>,
        application_id: Id<ApplicationMarker>,
        service: Arc<BountyService>,
        review_channel: Id<ChannelMarker>,
    ) -> Self {
        Self { http, application_id, service, review_channel }
    }

    pub async fn handle(&self, interaction: Interaction) -> Result<(), Error> {
        let Some(user_id) = interaction.author_id() else {
            debug!("interaction {} without an author, ignoring", interaction.id);
            return Ok(());
        };
        let actor = user_id.to_string();

        match &interaction.data {
            Some(InteractionData::ApplicationCommand(cmd)) => {
                self.defer(&interaction, Deferral::Message).await?;
                let result = self.on_command(&interaction, &actor, cmd).await;
                self.finish(&interaction, Deferral::Message, &actor, result).await
            }
            Some(InteractionData::MessageComponent(data)) => {
                let route = component_route(&data.custom_id);
                match route {
                    ComponentRoute::OpenRegister => {
                        self.respond(&interaction, Reply::Modal {
                            custom_id: render::REGISTER_MODAL_ID,
                            title: "Registration",
                            components: render::register_modal(),
                        })
                        .await
                    }
                    ComponentRoute::OpenReport => {
                        self.respond(&interaction, Reply::Modal {
                            custom_id: render::REPORT_MODAL_ID,
                            title: "Quest report",
                            components: render::report_modal(),
                        })
                        .await
                    }
                    ComponentRoute::AlreadyDone => {
                        self.respond(&interaction, Reply::Ephemeral("Already handled.".into())).await
                    }
                    ComponentRoute::Review => {
                        let deferral = route.deferral().unwrap_or(Deferral::Update);
                        self.defer(&interaction, deferral).await?;
                        let activation = ReviewActivation {
                            token: data.custom_id.clone(),
                            actor_identity: actor.clone(),
                            actor_has_admin_capability: is_admin(&interaction),
                        };
                        let result = self.review(&activation).await;
                        self.finish(&interaction, deferral, &actor, result).await
                    }
                    ComponentRoute::Unknown => {
                        debug!("unknown component id '{}'", data.custom_id);
                        let msg = user_message(&Error::MalformedToken(data.custom_id.clone()));
                        self.respond(&interaction, Reply::Ephemeral(msg)).await
                    }
                }
            }
            Some(InteractionData::ModalSubmit(data)) => {
                self.defer(&interaction, Deferral::Message).await?;
                let result = self.on_modal(&actor, data).await;
                self.finish(&interaction, Deferral::Message, &actor, result).await
            }
            _ => Ok(()),
        }
    }

    async fn on_command(&self, interaction: &Interaction, actor: &str, cmd: &CommandData) -> Result<Outcome, Error> {
        match cmd.name.as_str() {
            commands::SETUP => {
                if !is_admin(interaction) {
                    return Err(Error::Unauthorized(actor.to_string()));
                }
                let channel_id = interaction
                    .channel
                    .as_ref()
                    .map(|c| c.id)
                    .ok_or_else(|| Error::InvalidInput("/setup must be used in a channel".into()))?;
                let embed = render::dashboard_embed(self.service.catalog());
                let components = render::dashboard_components();
                self.http
                    .create_message(channel_id)
                    .embeds(&[embed])
                    .components(&components)
                    .await
                    .map_err(|e| Error::Platform(format!("Failed to post dashboard: {e}")))?;
                info!(actor, channel = %channel_id, "dashboard posted");
                Ok(Outcome::Notice("Dashboard posted.".into()))
            }
            commands::REPORT => {
                let (quest, proof_url) = report_options(cmd)
                    .ok_or_else(|| Error::InvalidInput("quest number and screenshot are required".into()))?;
                let req = ReportRequest {
                    identity: actor.to_string(),
                    quest_id: QuestId::new(quest)?,
                    proof_url,
                };
                self.submit_report(&req).await
            }
            commands::MY_INFO => {
                let profile = self.service.profile(actor).await?;
                Ok(Outcome::Embed(render::profile_embed(&profile)))
            }
            other => Ok(Outcome::Notice(format!("Unrecognized command: {other}"))),
        }
    }

    async fn on_modal(&self, actor: &str, data: &ModalInteractionData) -> Result<Outcome, Error> {
        match data.custom_id.as_str() {
            render::REGISTER_MODAL_ID => {
                let req = RegisterRequest {
                    identity: actor.to_string(),
                    nickname: modal_value(data, render::NICK_FIELD_ID).unwrap_or_default(),
                    proof_url: modal_value(data, render::STATS_FIELD_ID).unwrap_or_default(),
                };
                let artifact = self
                    .service
                    .register_and_publish(&req, |artifact| async move {
                        let embed = render::registration_embed(&artifact);
                        let components = render::review_components(artifact.action.kind(), &artifact.token);
                        self.post_for_review(embed, components).await
                    })
                    .await?;
                Ok(Outcome::Notice(format!(
                    "✅ Registered as **{}**. Good luck, agent.",
                    artifact.nickname
                )))
            }
            render::REPORT_MODAL_ID => {
                let quest_id: QuestId = modal_value(data, render::QUEST_FIELD_ID)
                    .unwrap_or_default()
                    .parse()?;
                let req = ReportRequest {
                    identity: actor.to_string(),
                    quest_id,
                    proof_url: modal_value(data, render::PROOF_FIELD_ID).unwrap_or_default(),
                };
                self.submit_report(&req).await
            }
            other => Err(Error::MalformedToken(other.to_string())),
        }
    }

    async fn submit_report(&self, req: &ReportRequest) -> Result<Outcome, Error> {
        let artifact: ReportArtifact = self.service.report(req).await?;
        let embed = render::report_embed(&artifact);
        let components = render::review_components(artifact.action.kind(), &artifact.token);
        self.post_for_review(embed, components).await?;
        Ok(Outcome::Notice("✅ Report sent to the admins.".into()))
    }

    async fn review(&self, activation: &ReviewActivation) -> Result<Outcome, Error> {
        match self.service.review(activation).await? {
            ReviewOutcome::Performed { resolution, effect, .. } => Ok(Outcome::Update {
                content: render::resolved_content(&resolution),
                components: render::resolved_components(effect),
            }),
            ReviewOutcome::InProgress { resolution, .. } => Ok(Outcome::Notice(format!(
                "<@{}> is handling this right now. Try again in a moment.",
                resolution.resolved_by
            ))),
            // The message already shows the terminal state; only tell the late clicker.
            ReviewOutcome::AlreadyResolved { resolution, .. } => Ok(Outcome::Notice(format!(
                "Already handled by <@{}>.",
                resolution.resolved_by
            ))),
        }
    }

    async fn post_for_review(&self, embed: Embed, components: Vec<Component>) -> Result<(), Error> {
        self.http
            .create_message(self.review_channel)
            .embeds(&[embed])
            .components(&components)
            .await
            .map_err(|e| Error::Platform(format!("Failed to post to review channel: {e}")))?;
        Ok(())
    }

    async fn defer(&self, interaction: &Interaction, deferral: Deferral) -> Result<(), Error> {
        self.send_response(interaction, &deferred_response(deferral)).await
    }

    /// Delivers the result of a deferred interaction.
    async fn finish(
        &self,
        interaction: &Interaction,
        deferral: Deferral,
        actor: &str,
        result: Result<Outcome, Error>,
    ) -> Result<(), Error> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_user_facing() {
                    debug!(actor, "trigger rejected: {e}");
                } else if e.is_transient() {
                    warn!(actor, "trigger failed, storage unavailable: {e}");
                } else {
                    error!(actor, "trigger failed: {e}");
                }
                Outcome::Notice(user_message(&e))
            }
        };

        let client = self.http.interaction(self.application_id);
        let token = interaction.token.as_str();
        let sent = match outcome {
            Outcome::Update { content, components } => client
                .update_response(token)
                .content(Some(content.as_str()))
                .components(Some(components.as_slice()))
                .await
                .map(|_| ()),
            Outcome::Embed(embed) => {
                let embeds = [embed];
                client.update_response(token).embeds(Some(&embeds[..])).await.map(|_| ())
            }
            Outcome::Notice(content) if deferral == Deferral::Update => client
                .create_followup(token)
                .content(&content)
                .flags(MessageFlags::EPHEMERAL)
                .await
                .map(|_| ()),
            Outcome::Notice(content) => client
                .update_response(token)
                .content(Some(content.as_str()))
                .await
                .map(|_| ()),
        };
        sent.map_err(|e| Error::Platform(format!("Failed to deliver interaction result: {e}")))
    }

    async fn respond(&self, interaction: &Interaction, reply: Reply) -> Result<(), Error> {
        let response = match reply {
            Reply::Ephemeral(content) => InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(InteractionResponseData {
                    content: Some(content),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                }),
            },
            Reply::Modal { custom_id, title, components } => InteractionResponse {
                kind: InteractionResponseType::Modal,
                data: Some(InteractionResponseData {
                    custom_id: Some(custom_id.to_string()),
                    title: Some(title.to_string()),
                    components: Some(components),
                    ..Default::default()
                }),
            },
        };
        self.send_response(interaction, &response).await
    }

    async fn send_response(&self, interaction: &Interaction, response: &InteractionResponse) -> Result<(), Error> {
        self.http
            .interaction(self.application_id)
            .create_response(interaction.id, &interaction.token, response)
            .await
            .map_err(|e| Error::Platform(format!("Failed to respond to interaction: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_infrastructure_details() {
        let storage = Error::StorageUnavailable(sqlx::Error::PoolTimedOut);
        assert!(!user_message(&storage).contains("PoolTimedOut"));
        assert!(user_message(&storage).contains("try again in a minute"));
        let platform = Error::Platform("401 Unauthorized from gateway".into());
        assert!(!user_message(&platform).contains("401"));
    }

    #[test]
    fn test_user_message_distinguishes_expected_outcomes() {
        let unauthorized = user_message(&Error::Unauthorized("u2".into()));
        let malformed = user_message(&Error::MalformedToken("x".into()));
        assert_ne!(unauthorized, malformed);
        assert!(user_message(&Error::InvalidInput("nickname must not be empty".into()))
            .contains("nickname must not be empty"));
    }

    #[test]
    fn test_component_routes() {
        assert_eq!(component_route(render::START_REGISTER_ID), ComponentRoute::OpenRegister);
        assert_eq!(component_route(render::START_REPORT_ID), ComponentRoute::OpenReport);
        assert_eq!(component_route(render::REVIEW_DONE_ID), ComponentRoute::AlreadyDone);
        assert_eq!(component_route("registration-cancel:abc:u1"), ComponentRoute::Review);
        assert_eq!(component_route("something-else"), ComponentRoute::Unknown);
    }

    #[test]
    fn test_only_review_clicks_are_deferred() {
        assert_eq!(ComponentRoute::Review.deferral(), Some(Deferral::Update));
        for route in [ComponentRoute::OpenRegister, ComponentRoute::OpenReport, ComponentRoute::AlreadyDone] {
            assert_eq!(route.deferral(), None, "{route:?}");
        }
    }

    #[test]
    fn test_deferred_responses() {
        let message = deferred_response(Deferral::Message);
        assert_eq!(message.kind, InteractionResponseType::DeferredChannelMessageWithSource);
        assert_eq!(
            message.data.and_then(|d| d.flags),
            Some(MessageFlags::EPHEMERAL)
        );

        let update = deferred_response(Deferral::Update);
        assert_eq!(update.kind, InteractionResponseType::DeferredUpdateMessage);
        assert!(update.data.is_none());
    }
}
