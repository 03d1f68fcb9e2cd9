//! Multi-Signature Wallet CLI Application
//!
//! A command-line interface for operating the quorum wallet.

use clap::{Parser, Subcommand};
use quorum_wallet::api::{create_router, ApiState, BroadcastSink, WsBroadcaster};
use quorum_wallet::cli::{self, AppState};
use quorum_wallet::storage::{Storage, StorageConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "wallet")]
#[command(version = "0.1.0")]
#[command(about = "A multi-signature quorum wallet in Rust", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".wallet_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new wallet
    Init {
        /// Principal identities (comma-separated)
        #[arg(short, long)]
        principals: String,

        /// Confirmations required to execute a proposal
        #[arg(short, long)]
        quorum: usize,
    },

    /// Show wallet status
    Status,

    /// Deposit value into the wallet
    Deposit {
        /// Identity of the depositor
        #[arg(short, long)]
        from: String,

        /// Amount to deposit
        #[arg(short, long)]
        amount: u64,
    },

    /// Submit a new proposal
    Submit {
        /// Calling principal
        #[arg(short, long)]
        caller: String,

        /// Destination of the action
        #[arg(short, long)]
        target: String,

        /// Amount to transfer alongside the action
        #[arg(short, long, default_value = "0")]
        value: u64,

        /// Hex-encoded action payload
        #[arg(long)]
        payload: Option<String>,
    },

    /// Confirm a proposal
    Confirm {
        /// Calling principal
        #[arg(short, long)]
        caller: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Withdraw a confirmation
    Revoke {
        /// Calling principal
        #[arg(short, long)]
        caller: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Execute a proposal that has reached the quorum
    Execute {
        /// Calling principal
        #[arg(short, long)]
        caller: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// Propose a quorum change (applied once the proposal executes)
    SetQuorum {
        /// Calling principal
        #[arg(short, long)]
        caller: String,

        /// New confirmation threshold
        #[arg(short, long)]
        quorum: usize,
    },

    /// List proposals
    Proposals {
        /// Show only proposals that have not executed
        #[arg(long)]
        pending: bool,
    },

    /// Show proposal detail
    Show {
        /// Proposal id
        #[arg(short, long)]
        id: u64,
    },

    /// List principals
    Principals,

    /// Show the audit event stream
    Events {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Reference ledger operations
    Ledger {
        #[command(subcommand)]
        action: LedgerCommands,
    },

    /// Export wallet state to file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import wallet state from file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },
}

#[derive(Subcommand)]
enum LedgerCommands {
    /// Show a target's credited balance
    Balance {
        /// Target identity
        #[arg(short, long)]
        target: String,
    },

    /// Make a target reject invocations (exercises the rollback path)
    Reject {
        /// Target identity
        #[arg(short, long)]
        target: String,
    },

    /// Let a target accept invocations again
    Allow {
        /// Target identity
        #[arg(short, long)]
        target: String,
    },

    /// List delivered invocations
    Receipts,
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init { principals, quorum } = &cli.command {
        let principals: Vec<String> = principals
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return cli::cmd_init(&cli.data_dir, &principals, *quorum);
    }

    // Handle API commands with tokio runtime
    if let Commands::Api { ref action } = cli.command {
        return run_api_command(action, &cli.data_dir);
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Api { .. } => unreachable!(),

        Commands::Status => {
            cli::cmd_status(&state)?;
        }

        Commands::Deposit { from, amount } => {
            cli::cmd_deposit(&mut state, &from, amount)?;
        }

        Commands::Submit {
            caller,
            target,
            value,
            payload,
        } => {
            cli::cmd_submit(&mut state, &caller, &target, value, payload.as_deref())?;
        }

        Commands::Confirm { caller, id } => {
            cli::cmd_confirm(&mut state, &caller, id)?;
        }

        Commands::Revoke { caller, id } => {
            cli::cmd_revoke(&mut state, &caller, id)?;
        }

        Commands::Execute { caller, id } => {
            cli::cmd_execute(&mut state, &caller, id)?;
        }

        Commands::SetQuorum { caller, quorum } => {
            cli::cmd_set_quorum(&mut state, &caller, quorum)?;
        }

        Commands::Proposals { pending } => {
            cli::cmd_proposals(&state, pending)?;
        }

        Commands::Show { id } => {
            cli::cmd_show(&state, id)?;
        }

        Commands::Principals => {
            cli::cmd_principals(&state)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }

        Commands::Ledger { action } => match action {
            LedgerCommands::Balance { target } => {
                cli::cmd_ledger_balance(&state, &target)?;
            }
            LedgerCommands::Reject { target } => {
                cli::cmd_ledger_reject(&mut state, &target)?;
            }
            LedgerCommands::Allow { target } => {
                cli::cmd_ledger_allow(&mut state, &target)?;
            }
            LedgerCommands::Receipts => {
                cli::cmd_ledger_receipts(&state)?;
            }
        },

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }
    }

    Ok(())
}

fn run_api_command(
    action: &ApiCommands,
    data_dir: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            ApiCommands::Start { port } => {
                // Initialize storage
                let storage_config = StorageConfig {
                    data_dir: data_dir.clone(),
                    ..Default::default()
                };
                let storage = Arc::new(Storage::new(storage_config)?);

                if !storage.exists() {
                    return Err(format!(
                        "no wallet found in {:?}; run `wallet init` first",
                        data_dir
                    )
                    .into());
                }

                println!("📂 Loading wallet...");
                let snapshot = storage.load()?;

                // Create WebSocket broadcaster and wire it into the engine
                let ws_broadcaster = Arc::new(WsBroadcaster::new());
                let mut engine = snapshot.engine;
                engine.attach_sink(Box::new(BroadcastSink(ws_broadcaster.clone())));

                let state = ApiState {
                    engine: Arc::new(RwLock::new(engine)),
                    ledger: Arc::new(RwLock::new(snapshot.ledger)),
                    storage,
                    ws_broadcaster,
                };

                let router = create_router(state);
                let addr = format!("0.0.0.0:{}", port);
                let listener = tokio::net::TcpListener::bind(&addr).await?;

                println!("🚀 API server listening on http://{}", addr);
                println!("   WebSocket event stream at ws://{}/ws", addr);

                axum::serve(listener, router).await?;
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
