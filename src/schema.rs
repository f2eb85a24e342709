use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

use crate::{commands::start, errors::BotError, handlers::link_received};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Show how to use the bot
    Start,
}

pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    Update::filter_message()
        .branch(
            // Filter for commands
            teloxide::filter_command::<Command, _>()
                .branch(case![Command::Start].endpoint(start)),
        )
        // Everything that is not a command is treated as a link
        .branch(
            Message::filter_text()
                .filter(|text: String| !text.starts_with('/'))
                .endpoint(link_received),
        )
}
