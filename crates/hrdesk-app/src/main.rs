//! HR Desk binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing (stderr, so logs never interleave with the chat)
//! 3. Load the rule set (JSON file or bundled)
//! 4. Start the chat session on its own task
//! 5. Read lines from stdin and print each turn of the transcript

mod cli;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use hrdesk_chat::{
    ChatService, ChatSession, LoggingHandoff, ResponseMatcher, RuleBook, SessionOptions,
    SimulatedBackend, TurnOutcome, QUICK_ACTIONS,
};
use hrdesk_core::config::HrDeskConfig;
use hrdesk_core::types::{DeliveryState, Message};

use cli::{CliArgs, Input};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn format_message(message: &Message) -> String {
    let who = if message.is_from_user() {
        "You"
    } else {
        "HR Assistant"
    };
    let status = if message.is_from_user() && message.delivery == DeliveryState::Error {
        " [not delivered]"
    } else {
        ""
    };
    format!(
        "[{}] {}: {}{}",
        message.sent_at.clock_label(),
        who,
        message.text,
        status
    )
}

fn print_turn(turn: &TurnOutcome) {
    for message in &turn.messages {
        println!("{}", format_message(message));
    }
    for notice in &turn.notices {
        println!("! {}: {}", notice.title, notice.description);
    }
}

fn print_quick_actions() {
    println!("Quick actions:");
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        println!("  /{}  {}", i + 1, action);
    }
    println!("  /quit to leave");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. The configured log level is not known until the file is read,
    // so loading reports to a bootstrap subscriber.
    let config_file = args.resolve_config_path();
    let config_found = config_file.exists();
    let mut config = if config_found {
        let bootstrap = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::with_default(bootstrap, || {
            HrDeskConfig::load_or_default(&config_file)
        })
    } else {
        HrDeskConfig::default()
    };
    if args.no_delay {
        config.chat.backend_latency_ms = 0;
        config.chat.delivery_delay_ms = 0;
    }

    // Tracing.
    init_tracing(&args.resolve_log_level(&config.general.log_level));
    tracing::info!("Starting HR Desk v{}", env!("CARGO_PKG_VERSION"));
    if !config_found {
        tracing::info!(
            path = %config_file.display(),
            "No configuration file; using defaults"
        );
    }

    // Rule set. An explicitly requested file must load.
    let rules = match args.resolve_rules_path(config.chat.rules_path.as_deref()) {
        Some(path) => RuleBook::load(&path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to load rule set");
            e
        })?,
        None => {
            tracing::info!("Using bundled HR rule set");
            RuleBook::builtin()
        }
    };
    tracing::info!(rules = rules.len(), "Rule set ready");

    // Session.
    let backend = SimulatedBackend::new(
        ResponseMatcher::new(Arc::new(rules)),
        Duration::from_millis(config.chat.backend_latency_ms),
    );
    tracing::info!(
        latency_ms = backend.latency().as_millis() as u64,
        "Simulated HR backend ready"
    );
    let session = ChatSession::new(
        Arc::new(backend),
        Arc::new(LoggingHandoff),
        SessionOptions::from_config(&config.chat),
    );
    let service = ChatService::spawn(session);

    for message in service.transcript().await? {
        println!("{}", format_message(&message));
    }
    print_quick_actions();

    // Input loop.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let result = match Input::parse(&line) {
            Input::Empty => {
                prompt();
                continue;
            }
            Input::Quit => break,
            Input::ListActions => {
                print_quick_actions();
                prompt();
                continue;
            }
            Input::Unknown(command) => {
                println!("Unknown command {}. Type /actions for help.", command);
                prompt();
                continue;
            }
            Input::QuickAction(index) => service.quick_action(index).await,
            Input::Text(text) => service.submit(text).await,
        };

        match result {
            Ok(turn) => print_turn(&turn),
            Err(e) => {
                tracing::debug!(error = %e, "Submission rejected");
                println!("! {}", e);
            }
        }
        prompt();
    }

    tracing::info!(session = %service.session_id(), "HR Desk stopped");
    Ok(())
}
