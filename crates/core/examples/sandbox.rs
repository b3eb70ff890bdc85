//! End-to-end demo against a mock sandbox
//!
//! Registers a small command tree with permissions and middleware, then
//! feeds a handful of chat messages through the dispatcher and prints what
//! the sandbox would deliver.
//!
//! Run with: `cargo run --example sandbox`

use vttcli_core::testing::MockHost;
use vttcli_core::{
    ChatMessage, CliConfig, CliResult, Command, CommandResponse, Dispatcher, PlayerId, Recipient,
};

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let host = MockHost::new()
        .with_player("Alice", "p1")
        .with_player("Bob", "p2")
        .with_admin("gm");
    let dispatcher = Dispatcher::new(host, CliConfig::default());

    dispatcher.configure(|cli| {
        cli.add_permission_group("everyone", |_| true)?;

        let mut ping = Command::new("ping", "Check the script is alive", "!ping", |_, _| {
            Ok(CommandResponse::new("Pong!").into())
        })?;
        ping.permissions_mut()
            .add_group("everyone", cli.permission_groups())?;
        cli.add_command(ping)?;

        // Subcommands inherit nothing: only the GM may touch the order.
        let mut init = Command::new(
            "init",
            "Manage the initiative order",
            "!init <add|clear> ...",
            |_, _| Ok(CommandResponse::new("Usage: !init <add|clear> ...").into()),
        )?;
        init.add_subcommand(Command::new(
            "add",
            "Add a combatant",
            "!init add <name> <roll>",
            |args: &[String], _: &ChatMessage| {
                Ok(
                    CommandResponse::new(format!("Added {} to the order.", args.join(" ")))
                        .with_recipient(Recipient::All)
                        .into(),
                )
            },
        )?)?;
        init.add_subcommand(Command::new(
            "clear",
            "Clear the order",
            "!init clear",
            |_, _| {
                Ok(CommandResponse::new("Initiative order cleared.")
                    .with_recipient(Recipient::All)
                    .into())
            },
        )?)?;
        cli.add_command(init)?;

        cli.add_pre_routing_middleware("audit", |tokens, message| {
            tracing::debug!(?tokens, who = %message.who, "incoming command");
            true
        })?;
        Ok(())
    })?;

    // A player pings, the GM edits the order, a player trips the permission
    // check, and a typo misses entirely.
    let traffic = [
        ChatMessage::api("!ping", PlayerId::from("p1"), "Alice"),
        ChatMessage::api("!init add 'Goblin King' 17", PlayerId::from("gm"), "The GM"),
        ChatMessage::api("!init clear", PlayerId::from("p2"), "Bob"),
        ChatMessage::api("!nope", PlayerId::from("p1"), "Alice"),
    ];
    for message in &traffic {
        dispatcher.handle_message(message);
    }

    for sent in dispatcher.host().sent() {
        println!("[{:?}] {} :: {}", sent.target, sent.speaker, sent.html);
    }
    Ok(())
}
