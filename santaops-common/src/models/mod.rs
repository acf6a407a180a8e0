// File: santaops-common/src/models/mod.rs
pub mod player;
pub mod quest;
pub mod reward;
pub mod review;
pub mod trigger;

pub use player::Player;
pub use quest::{Quest, QuestId};
pub use reward::{RewardLine, RewardSummary};
pub use review::{ActionKind, Claim, Resolution, ReviewAction};
pub use trigger::{
    Profile, RegisterRequest, RegistrationArtifact, ReportArtifact, ReportRequest, ReviewActivation,
    ReviewEffect, ReviewOutcome,
};
