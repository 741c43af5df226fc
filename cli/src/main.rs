use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voyagent_core::agent::Concierge;
use voyagent_core::bookings::FileBookingStore;
use voyagent_core::config::{self, Config};
use voyagent_core::providers;
use voyagent_core::tools::{
    AmadeusCredentials, CreateBookingTool, FlightSearchTool, HotelSearchTool, Toolbox,
};

mod onboard;

#[derive(Parser)]
#[command(name = "voyagent")]
#[command(about = "voyagent - your travel booking concierge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();
}

fn build_concierge(config: &Config) -> Result<Concierge> {
    let model = providers::create_model(config)?;

    let amadeus = config
        .resolve_amadeus_credentials()
        .map(|(api_key, api_secret)| AmadeusCredentials {
            api_key,
            api_secret,
        });
    let store = Arc::new(FileBookingStore::new(&config.data_dir));

    let toolbox = Toolbox::new(
        FlightSearchTool::new(config.resolve_serpapi_key()),
        HotelSearchTool::new(amadeus),
        CreateBookingTool::new(store),
    )?;

    Ok(Concierge::new(model, toolbox).with_max_iterations(config.max_iterations))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat { message } => {
            let config = config::load_config()?;

            if !config.data_dir.exists()
                && let Err(e) = std::fs::create_dir_all(&config.data_dir)
            {
                eprintln!(
                    "❌ Error: Could not create data directory at {}: {}",
                    config.data_dir.display(),
                    e
                );
                eprintln!("Please check your permissions and try again.");
                return Err(e.into());
            }

            let concierge = build_concierge(&config)?;

            if let Some(msg) = message {
                match concierge.send_message(None, &msg).await {
                    Ok(reply) => {
                        println!("{}", reply.answer);
                    }
                    Err(e) => {
                        eprintln!("❌ Error: {}", e);
                        anyhow::bail!("Turn failed: {}", e);
                    }
                }
            } else {
                run_repl(&concierge).await;
            }
        }
    }

    Ok(())
}

async fn run_repl(concierge: &Concierge) {
    println!("✈  voyagent");
    println!("Type your message, /help for commands, Ctrl+D to exit:\n");

    use std::io::{self, BufRead};
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    let mut session_id: Option<String> = None;

    loop {
        print!("> ");
        let _ = stdout_lock.flush();

        let mut input = String::new();
        let mut reader = stdin.lock();

        match reader.read_line(&mut input) {
            Ok(0) => {
                println!("\n👋 Safe travels!");
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                if let Some(command) = input.strip_prefix('/') {
                    if !handle_command(concierge, command, &mut session_id) {
                        println!("\n👋 Safe travels!");
                        break;
                    }
                    continue;
                }

                match concierge.send_message(session_id.as_deref(), input).await {
                    Ok(reply) => {
                        session_id = Some(reply.session_id);
                        println!("\n{}\n", reply.answer);
                    }
                    Err(e) => {
                        eprintln!("❌ Error: {}", e);
                    }
                }
            }
            Err(_) => {
                println!("\n👋 Safe travels!");
                break;
            }
        }
    }
}

/// Returns false when the REPL should exit.
fn handle_command(concierge: &Concierge, command: &str, session_id: &mut Option<String>) -> bool {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");

    match name {
        "new" => {
            let info = concierge.create_session();
            *session_id = Some(info.session_id);
            println!("{}\n", info.greeting);
        }
        "sessions" => {
            let ids = concierge.list_sessions();
            if ids.is_empty() {
                println!("No sessions yet. Send a message to start one.\n");
            } else {
                for id in ids {
                    let marker = if session_id.as_deref() == Some(id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}", marker, id);
                }
                println!();
            }
        }
        "delete" => match parts.next() {
            Some(id) => match concierge.delete_session(id) {
                Ok(()) => {
                    if session_id.as_deref() == Some(id) {
                        *session_id = None;
                    }
                    println!("Session {} deleted.\n", id);
                }
                Err(e) => eprintln!("❌ {}", e),
            },
            None => println!("Usage: /delete <session-id>\n"),
        },
        "help" => {
            println!("/new              start a fresh session");
            println!("/sessions         list sessions (* marks the current one)");
            println!("/delete <id>      delete a session");
            println!("/quit             exit");
            println!();
        }
        "quit" | "exit" => return false,
        other => println!("Unknown command: /{}. Try /help.\n", other),
    }

    true
}
