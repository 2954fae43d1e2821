use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use docchat_application::{MessageStream, Session};
use docchat_core::config::ClientConfig;
use docchat_core::error::{DocchatError, Result as DocchatResult};
use docchat_interaction::HttpApiClient;

mod commands;
mod helper;
mod render;

use commands::{Command, HELP_TEXT, PickTarget};
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(
    about = "DocChat - pick a document and chat with it from the terminal",
    long_about = None
)]
struct Cli {
    /// Backend base URL (overrides the config file and DOCCHAT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log requests and state changes to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs `operation` until it completes or `interrupt` fires first.
///
/// The operation future is dropped on interruption, which aborts its request.
async fn interruptible<T>(
    operation: impl Future<Output = DocchatResult<T>>,
    interrupt: impl Future,
) -> DocchatResult<T> {
    tokio::select! {
        result = operation => result,
        _ = interrupt => {
            tracing::debug!("operation interrupted");
            Err(DocchatError::Cancelled)
        }
    }
}

/// Runs a network operation that Ctrl-C can interrupt.
async fn with_ctrl_c<T>(operation: impl Future<Output = DocchatResult<T>>) -> DocchatResult<T> {
    interruptible(operation, tokio::signal::ctrl_c()).await
}

/// Prints reply events as they arrive until the stream ends or Ctrl-C cancels it.
async fn render_reply(mut replies: MessageStream) {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                replies.cancel();
                render::report_error("send message", &DocchatError::Cancelled);
                break;
            }
            item = replies.next() => match item {
                Some(Ok(event)) => render::chat_event(&event),
                Some(Err(err)) => render::report_error("send message", &err),
                None => break,
            },
        }
    }
}

/// Runs one command against the session. Returns `false` when the user quits.
async fn dispatch(session: &mut Session, command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Help => println!("{}", HELP_TEXT.bright_black()),
        Command::Invalid(message) => println!("{}", message.yellow()),
        Command::Url(None) => render::info(format!("Base URL: {}", session.base_url())),
        Command::Url(Some(url)) => match session.set_base_url(&url) {
            Ok(()) => render::success(format!("Base URL set to {}", session.base_url())),
            Err(err) => render::report_error("set base URL", &err),
        },
        Command::Fetch => match with_ctrl_c(session.picker_mut().fetch()).await {
            Ok(docs) => render::documents(docs),
            Err(err) => render::report_error("fetch documents", &err),
        },
        Command::Pick(target) => {
            let picked = match target {
                PickTarget::Index(index) => with_ctrl_c(session.pick_document(index)).await,
                PickTarget::Key(key) => session.pick_document_by_key(&key),
            };
            match picked {
                Ok(doc) => render::success(format!("Selected document: {}", doc.url)),
                Err(err) => render::report_error("pick document", &err),
            }
        }
        Command::Id(raw) => {
            let Ok(id) = raw.parse::<i64>() else {
                println!("{}", "Invalid ID.".yellow());
                return true;
            };
            match with_ctrl_c(session.pick_document_by_id(id)).await {
                Ok(Some(doc)) => render::success(format!("Selected document: {}", doc.url)),
                Ok(None) => println!("{}", "Invalid ID.".yellow()),
                Err(err) => render::report_error("pick document by id", &err),
            }
        }
        Command::Create => {
            if session.conversation().document_ids().is_empty() {
                render::info("No document picked; the conversation will not be bound to one.");
            }
            match with_ctrl_c(session.conversation_mut().create()).await {
                Ok(id) => render::success(format!("Created conversation with ID {}", id)),
                Err(err) => render::report_error("create conversation", &err),
            }
        }
        Command::Details => match with_ctrl_c(session.conversation().detail()).await {
            Ok(detail) => render::json(&detail),
            Err(err) => render::report_error("conversation details", &err),
        },
        Command::Delete => match with_ctrl_c(session.conversation_mut().delete()).await {
            Ok(id) => render::success(format!("Deleted conversation with ID {}", id)),
            Err(err) => render::report_error("delete conversation", &err),
        },
        Command::Selected => {
            let selected = session.picker().selected_documents();
            if selected.is_empty() {
                render::info("No documents selected yet.");
            } else {
                render::documents(selected);
            }
            if let Some(doc) = session.selected_document() {
                render::info(format!("Bound to next conversation: {}", doc.key()));
            }
        }
        Command::Send(text) => {
            match with_ctrl_c(session.conversation().send_message(&text)).await {
                Ok(replies) => render_reply(replies).await,
                Err(err) => render::report_error("send message", &err),
            }
        }
    }
    true
}

/// The main entry point for the DocChat readline REPL.
///
/// Resolves configuration, builds one [`Session`] for the whole run, and maps
/// each input line onto a session operation. Message replies are rendered
/// event by event as the backend streams them.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }

    let client = Arc::new(HttpApiClient::from_config(&config)?);
    let mut session = Session::new(&config, client)?;
    tracing::debug!(
        base_url = %config.base_url,
        sample_size = config.sample_size,
        "session started"
    );

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(session.base_url())));

    println!("{}", "=== DocChat ===".bright_magenta().bold());
    println!("{}", format!("Backend: {}", session.base_url()).bright_black());
    println!(
        "{}",
        "Type '/help' for commands, a message to chat, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if !dispatch(&mut session, Command::parse(trimmed)).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if let Some(helper) = rl.helper_mut() {
                    helper.sync(&session.base_url(), session.picker().options());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
