//! Interactive chat shell
//!
//! The shell owns one [`MessageStore`] for as long as the process runs. The
//! process stands in for the session owner: when the shell exits, it raises
//! `BeforeUnload` so the cleanup listeners purge the persisted session.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatkeep_core::{
    attach_cleanup_listeners, ChatMessage, LifecycleEvent, LifecycleEvents, MessageStore,
    NewMessage, Role, SessionStorage, StoreSettings,
};
use chrono::{DateTime, Local};
use console::style;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// A parsed line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Plain text, sent as a user message
    Say(String),
    /// Append an assistant message
    Reply(String),
    /// Replace the content of the last assistant message
    Stream(String),
    Clear,
    Count,
    Show,
    Help,
    Quit,
    /// Blank line
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ShellCommand::Say(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim().to_string()),
            None => (rest, String::new()),
        };
        match name {
            "reply" => ShellCommand::Reply(arg),
            "stream" => ShellCommand::Stream(arg),
            "clear" => ShellCommand::Clear,
            "count" => ShellCommand::Count,
            "show" => ShellCommand::Show,
            "help" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => ShellCommand::Unknown(other.to_string()),
        }
    }
}

/// Outcome of applying one command
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Apply a command to the store, printing feedback
pub fn apply(store: &mut MessageStore, command: ShellCommand) -> Step {
    match command {
        ShellCommand::Say(text) => {
            store.append(NewMessage::user(new_message_id(), text));
        }
        ShellCommand::Reply(text) => {
            store.append(NewMessage::assistant(new_message_id(), text));
            if let Some(message) = store.last() {
                print_message(message);
            }
        }
        ShellCommand::Stream(text) => {
            if store.update_last_content(text) {
                if let Some(message) = store.last() {
                    print_message(message);
                }
            } else {
                println!("{}", style("Last message is not an assistant reply").yellow());
            }
        }
        ShellCommand::Clear => {
            store.clear();
            println!("{}", style("Conversation cleared").green());
        }
        ShellCommand::Count => {
            println!("{} message(s)", store.count());
        }
        ShellCommand::Show => print_history(store),
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => return Step::Exit,
        ShellCommand::Empty => {}
        ShellCommand::Unknown(name) => {
            println!("{} /{} (try /help)", style("Unknown command").red(), name);
        }
    }
    Step::Continue
}

/// Run the shell on stdin until `/quit`, end of input, or Ctrl-C
pub async fn run(storage: Arc<dyn SessionStorage>, settings: StoreSettings) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_session(storage, settings, input, tokio::signal::ctrl_c()).await
}

/// Drive one chat session from `input` until it ends or `shutdown` resolves
///
/// `BeforeUnload` is raised however the session ends, including when
/// reading `input` fails; the read error is returned afterwards.
pub async fn run_session<R, F>(
    storage: Arc<dyn SessionStorage>,
    settings: StoreSettings,
    input: R,
    shutdown: F,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    let events = Arc::new(LifecycleEvents::new());
    let mut store = MessageStore::open(storage.clone(), settings);
    let cleanup = attach_cleanup_listeners(&events, storage, store.storage_key());
    info!(count = store.count(), "Chat shell started");

    print_history(&store);
    println!("{}", style("Type a message, or /help for commands.").dim());

    let mut lines = input.lines();
    tokio::pin!(shutdown);
    let outcome: std::io::Result<()> = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if apply(&mut store, ShellCommand::parse(&line)) == Step::Exit {
                        break Ok(());
                    }
                }
                Ok(None) => {
                    debug!("End of input");
                    break Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read chat input");
                    break Err(e);
                }
            },
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                debug!("Interrupted");
                break Ok(());
            }
        }
    };

    events.dispatch(LifecycleEvent::BeforeUnload);
    cleanup.detach();
    info!("Chat shell stopped");
    outcome.context("reading chat input")
}

/// Print every message of the store
pub fn print_history(store: &MessageStore) {
    for message in store.messages() {
        print_message(message);
    }
}

fn print_message(message: &ChatMessage) {
    let time = DateTime::from_timestamp_millis(message.timestamp)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let who = match message.role {
        Role::User => style("you").cyan().bold(),
        Role::Assistant => style("assistant").magenta().bold(),
    };
    println!("{} {}: {}", style(time).dim(), who, message.content);
}

fn print_help() {
    println!("  <text>          send a user message");
    println!("  /reply <text>   append an assistant reply");
    println!("  /stream <text>  rewrite the last assistant reply");
    println!("  /show           print the conversation");
    println!("  /count          print the number of messages");
    println!("  /clear          reset the conversation");
    println!("  /quit           leave and discard the session");
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
