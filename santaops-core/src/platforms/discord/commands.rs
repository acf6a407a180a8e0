// File: santaops-core/src/platforms/discord/commands.rs

use twilight_http::Client as HttpClient;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::command::{AttachmentBuilder, CommandBuilder, IntegerBuilder};

use crate::Error;

pub const SETUP: &str = "setup";
pub const REPORT: &str = "report";
pub const MY_INFO: &str = "myinfo";

pub const QUEST_OPTION: &str = "quest";
pub const PROOF_OPTION: &str = "proof";

/// `/setup` posts the dashboard. Hidden from non-admins by default.
pub fn create_setup_command() -> Command {
    CommandBuilder::new(SETUP, "Post the bounty dashboard (admin only)", CommandType::ChatInput)
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .contexts([InteractionContextType::Guild])
        .build()
}

/// `/report` submits a report with an uploaded screenshot instead of a link.
pub fn create_report_command() -> Command {
    CommandBuilder::new(REPORT, "Submit a quest report with a screenshot file", CommandType::ChatInput)
        .option(IntegerBuilder::new(QUEST_OPTION, "Quest number").required(true).min_value(1))
        .option(AttachmentBuilder::new(PROOF_OPTION, "Screenshot").required(true))
        .contexts([InteractionContextType::Guild])
        .build()
}

pub fn create_myinfo_command() -> Command {
    CommandBuilder::new(MY_INFO, "Show your progress and earned rewards", CommandType::ChatInput)
        .build()
}

pub fn all_commands() -> Vec<Command> {
    vec![create_setup_command(), create_report_command(), create_myinfo_command()]
}

pub async fn register_global_slash_commands(
    http: &HttpClient,
    application_id: Id<ApplicationMarker>,
) -> Result<(), Error> {
    let commands = all_commands();
    http.interaction(application_id)
        .set_global_commands(&commands)
        .await
        .map_err(|e| Error::Platform(format!("Failed to register global slash commands: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let names: Vec<String> = all_commands().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec![SETUP, REPORT, MY_INFO]);
    }

    #[test]
    fn test_setup_requires_administrator() {
        let cmd = create_setup_command();
        assert_eq!(cmd.default_member_permissions, Some(Permissions::ADMINISTRATOR));
    }

    #[test]
    fn test_guild_only_commands() {
        for cmd in [create_setup_command(), create_report_command()] {
            assert_eq!(cmd.contexts, Some(vec![InteractionContextType::Guild]), "{}", cmd.name);
        }
    }

    #[test]
    fn test_report_options_required() {
        let cmd = create_report_command();
        let opts: Vec<(&str, Option<bool>)> =
            cmd.options.iter().map(|o| (o.name.as_str(), o.required)).collect();
        assert_eq!(opts, vec![(QUEST_OPTION, Some(true)), (PROOF_OPTION, Some(true))]);
    }
}
