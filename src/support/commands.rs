//! Bot commands understood by the support conversation.

use teloxide::utils::command::BotCommands;

use crate::support::engine::Input;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start a conversation")]
    Start,
    #[command(description = "get coping techniques based on what you've shared")]
    Advice,
    #[command(description = "end the conversation")]
    Cancel,
}

impl From<Command> for Input<'static> {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Input::Start,
            Command::Advice => Input::Advice,
            Command::Cancel => Input::Cancel,
        }
    }
}
