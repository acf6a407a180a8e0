// File: santaops-core/src/platforms/discord/render.rs
//
// Embeds and components for everything the bot posts. Pure functions over
// core data; nothing here talks to Discord.

use twilight_model::channel::message::component::{
    ActionRow, Button, ButtonStyle, Component, TextInput, TextInputStyle,
};
use twilight_model::channel::message::embed::Embed;
use twilight_model::util::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource};

use santaops_common::models::{
    ActionKind, Profile, RegistrationArtifact, ReportArtifact, Resolution, ReviewEffect,
};

use crate::catalog::QuestCatalog;

pub const START_REGISTER_ID: &str = "start_register";
pub const START_REPORT_ID: &str = "start_report";
pub const REGISTER_MODAL_ID: &str = "register_modal";
pub const REPORT_MODAL_ID: &str = "report_modal";
pub const NICK_FIELD_ID: &str = "nick";
pub const STATS_FIELD_ID: &str = "stats_link";
pub const QUEST_FIELD_ID: &str = "quest_id";
pub const PROOF_FIELD_ID: &str = "proof_link";
/// Id of the disabled button left on a resolved artifact. Decodes to nothing.
pub const REVIEW_DONE_ID: &str = "review_done";

pub const CURRENCY: &str = "AZ";

const RED: u32 = 0xff0000;
const GREEN: u32 = 0x00ff00;
const BLUE: u32 = 0x3498db;
const GOLD: u32 = 0xf1c40f;

const FIELD_VALUE_MAX: usize = 1024;

fn clip(value: &str) -> String {
    if value.chars().count() <= FIELD_VALUE_MAX {
        return value.to_string();
    }
    let mut out: String = value.chars().take(FIELD_VALUE_MAX - 1).collect();
    out.push('…');
    out
}

fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Discord only previews direct image links.
pub fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or("").to_ascii_lowercase();
    [".jpeg", ".jpg", ".gif", ".png"].iter().any(|ext| path.ends_with(ext))
}

fn button(custom_id: &str, label: &str, style: ButtonStyle, disabled: bool) -> Component {
    Component::Button(Button {
        custom_id: Some(custom_id.to_string()),
        disabled,
        emoji: None,
        label: Some(label.to_string()),
        style,
        url: None,
        sku_id: None,
    })
}

fn row(components: Vec<Component>) -> Component {
    Component::ActionRow(ActionRow { components })
}

fn text_input(custom_id: &str, label: &str, placeholder: Option<&str>) -> Component {
    row(vec![Component::TextInput(TextInput {
        custom_id: custom_id.to_string(),
        label: label.to_string(),
        max_length: Some(200),
        min_length: Some(1),
        placeholder: placeholder.map(str::to_string),
        required: Some(true),
        style: TextInputStyle::Short,
        value: None,
    })])
}

pub fn dashboard_embed(catalog: &QuestCatalog) -> Embed {
    let quest_list = catalog
        .get_all()
        .iter()
        .map(|q| format!("**{}.** {} ({} {CURRENCY})", q.id, q.title, q.reward))
        .collect::<Vec<_>>()
        .join("\n");

    EmbedBuilder::new()
        .title("🎅 OPERATION: SAVE CHRISTMAS")
        .description(
            "**Status:** 🔴 CRITICAL\n**Location:** Los Santos\n\n\
             Registration is mandatory before taking part. Reports from unregistered agents are not accepted.",
        )
        .field(EmbedFieldBuilder::new(
            "🛠 HOW IT WORKS",
            "1. Press **Register** and enter your nickname and a stats screenshot link.\n\
             2. Complete quests from the list.\n\
             3. Press **Submit report** to send your proof.\n\
             4. Check your progress with `/myinfo`.",
        ))
        .field(EmbedFieldBuilder::new("💀 THREAT LIST (QUESTS)", clip(&quest_list)))
        .color(RED)
        .footer(EmbedFooterBuilder::new("Santa Ops | Classified"))
        .build()
}

pub fn dashboard_components() -> Vec<Component> {
    vec![row(vec![
        button(START_REGISTER_ID, "📝 REGISTER", ButtonStyle::Primary, false),
        button(START_REPORT_ID, "📤 SUBMIT REPORT", ButtonStyle::Success, false),
    ])]
}

pub fn register_modal() -> Vec<Component> {
    vec![
        text_input(NICK_FIELD_ID, "Your nickname", None),
        text_input(STATS_FIELD_ID, "Stats screenshot link", Some("https://imgur.com/...")),
    ]
}

pub fn report_modal() -> Vec<Component> {
    vec![
        text_input(QUEST_FIELD_ID, "Quest number", Some("1")),
        text_input(PROOF_FIELD_ID, "Screenshot link", Some("https://imgur.com/...")),
    ]
}

pub fn report_embed(artifact: &ReportArtifact) -> Embed {
    let quest_line = match &artifact.quest_title {
        Some(title) => format!("**{}.** {} ({} {CURRENCY})", artifact.quest_id, title, artifact.reward),
        None => format!("**{}.** ⚠️ not in the quest list (0 {CURRENCY})", artifact.quest_id),
    };
    let headline = artifact.quest_title.as_deref().unwrap_or("unknown quest");

    let mut builder = EmbedBuilder::new()
        .title(format!("📁 New report: {headline}"))
        .color(if artifact.first_completion { GREEN } else { GOLD })
        .field(EmbedFieldBuilder::new("👤 Nickname", clip(&artifact.nickname)).inline())
        .field(EmbedFieldBuilder::new("🆔 Discord", mention(&artifact.player_id)).inline())
        .field(EmbedFieldBuilder::new("📜 Quest", quest_line))
        .field(EmbedFieldBuilder::new("🔗 Proof", clip(&artifact.proof_url)))
        .field(EmbedFieldBuilder::new(
            "💸 Payout command",
            format!("```{}```", clip(&artifact.payout_command)),
        ))
        .footer(EmbedFooterBuilder::new("Santa Ops | Admin Panel"));

    if !artifact.first_completion {
        builder = builder.description("⚠️ This player already reported this quest before.");
    }
    if is_image_url(&artifact.proof_url) {
        if let Ok(source) = ImageSource::url(&artifact.proof_url) {
            builder = builder.image(source);
        }
    }
    if let Ok(ts) = Timestamp::from_secs(chrono::Utc::now().timestamp()) {
        builder = builder.timestamp(ts);
    }
    builder.build()
}

pub fn registration_embed(artifact: &RegistrationArtifact) -> Embed {
    let mut builder = EmbedBuilder::new()
        .title("🗂 New registration")
        .color(BLUE)
        .field(EmbedFieldBuilder::new("👤 Nickname", clip(&artifact.nickname)).inline())
        .field(EmbedFieldBuilder::new("🆔 Discord", mention(&artifact.player_id)).inline())
        .field(EmbedFieldBuilder::new("📊 Stats", clip(&artifact.proof_url)))
        .footer(EmbedFooterBuilder::new("Santa Ops | Admin Panel"));

    if is_image_url(&artifact.proof_url) {
        if let Ok(source) = ImageSource::url(&artifact.proof_url) {
            builder = builder.image(source);
        }
    }
    if let Ok(ts) = Timestamp::from_secs(artifact.joined_at.timestamp()) {
        builder = builder.timestamp(ts);
    }
    builder.build()
}

/// The single live control on a pending artifact.
pub fn review_components(kind: ActionKind, token: &str) -> Vec<Component> {
    let (label, style) = match kind {
        ActionKind::AcknowledgeReward => ("💸 Mark reward issued", ButtonStyle::Success),
        ActionKind::CancelRegistration => ("🗑 Cancel registration", ButtonStyle::Danger),
    };
    vec![row(vec![button(token, label, style, false)])]
}

/// Terminal rendering: one disabled button. The actor goes in `resolved_content`.
pub fn resolved_components(effect: ReviewEffect) -> Vec<Component> {
    let label = match effect {
        ReviewEffect::RewardAcknowledged => "✅ Reward issued",
        ReviewEffect::RegistrationCancelled { removed: true } => "🗑 Registration cancelled",
        ReviewEffect::RegistrationCancelled { removed: false } => "🗑 Already removed",
    };
    vec![row(vec![button(REVIEW_DONE_ID, label, ButtonStyle::Secondary, true)])]
}

pub fn resolved_content(resolution: &Resolution) -> String {
    format!(
        "Handled by {} <t:{}:R>",
        mention(&resolution.resolved_by),
        resolution.resolved_at.timestamp()
    )
}

pub fn profile_embed(profile: &Profile) -> Embed {
    let player = &profile.player;
    let summary = &profile.summary;

    let breakdown = if summary.breakdown.is_empty() {
        "No completed quests yet.".to_string()
    } else {
        summary
            .breakdown
            .iter()
            .map(|l| format!("**{}.** {} (+{} {CURRENCY})", l.quest_id, l.title, l.reward))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut builder = EmbedBuilder::new()
        .title(format!("🎖 Dossier: {}", player.nickname))
        .color(BLUE)
        .field(EmbedFieldBuilder::new("💰 Earned", format!("{} {CURRENCY}", summary.total)).inline())
        .field(EmbedFieldBuilder::new("✅ Quests", summary.breakdown.len().to_string()).inline())
        .field(EmbedFieldBuilder::new("📜 Completed", clip(&breakdown)));

    if !summary.unrecognized.is_empty() {
        let ids = summary
            .unrecognized
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        builder = builder.field(EmbedFieldBuilder::new("❔ Not in the quest list", clip(&ids)));
    }
    if let Ok(ts) = Timestamp::from_secs(player.joined_at.timestamp()) {
        builder = builder.timestamp(ts);
    }
    builder
        .footer(EmbedFooterBuilder::new("Santa Ops | joined"))
        .build()
}
