//! CLI commands for the wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::engine::{LogSink, QuorumEngine, TransferLedger};
use crate::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub engine: QuorumEngine,
    pub ledger: TransferLedger,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = Storage::new(storage_config)?;

        if !storage.exists() {
            return Err(format!(
                "no wallet found in {:?}; run `wallet init` first",
                data_dir
            )
            .into());
        }

        let snapshot = storage.load()?;
        let mut engine = snapshot.engine;
        engine.attach_sink(Box::new(LogSink));

        Ok(Self {
            engine,
            ledger: snapshot.ledger,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.engine, &self.ledger)?;
        Ok(())
    }
}

/// Initialize a new wallet
pub fn cmd_init(data_dir: &PathBuf, principals: &[String], quorum: usize) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.clone(),
        ..Default::default()
    };
    let storage = Storage::new(storage_config)?;

    if storage.exists() {
        println!("⚠️  Wallet already exists at {:?}", data_dir);
        println!("   Delete the data directory to start over.");
        return Ok(());
    }

    let engine = QuorumEngine::new(principals.to_vec(), quorum)?;
    storage.save(&engine, &TransferLedger::new())?;

    println!("✅ Wallet initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔐 Scheme: {}", engine.description());
    for principal in engine.principals() {
        println!("   👤 {}", principal);
    }

    Ok(())
}

/// Show wallet status
pub fn cmd_status(state: &AppState) -> CliResult<()> {
    let engine = &state.engine;

    println!("🔐 Wallet Status");
    println!("   ├─ Scheme: {}", engine.description());
    println!("   ├─ Balance: {} coins", engine.balance());
    println!("   ├─ Proposals: {}", engine.proposal_count());
    println!("   ├─ Pending: {}", engine.pending_proposals().len());
    println!("   ├─ Executed: {}", engine.executed_count());
    println!("   └─ Audit entries: {}", engine.events().len());

    Ok(())
}

/// Deposit value into the wallet
pub fn cmd_deposit(state: &mut AppState, from: &str, amount: u64) -> CliResult<()> {
    state.engine.deposit(from, amount);
    state.save()?;

    println!("💰 Deposited {} coins from {}", amount, from);
    println!("   New balance: {} coins", state.engine.balance());

    Ok(())
}

/// Submit a new proposal
pub fn cmd_submit(
    state: &mut AppState,
    caller: &str,
    target: &str,
    value: u64,
    payload_hex: Option<&str>,
) -> CliResult<()> {
    let payload = match payload_hex {
        Some(h) => hex::decode(h)?,
        None => Vec::new(),
    };

    let id = state
        .engine
        .submit(caller, target, value, payload, &mut state.ledger)?;
    state.save()?;

    let proposal = state.engine.proposal(id)?;
    println!("📤 Proposal {} submitted by {}", id, caller);
    println!("   ├─ Target: {}", proposal.target);
    println!("   ├─ Value: {} coins", proposal.value);
    println!(
        "   └─ Confirmations: {}/{}",
        proposal.confirmation_count,
        state.engine.quorum()
    );
    if proposal.executed {
        println!("\n✅ Quorum reached, proposal executed immediately.");
    }

    Ok(())
}

/// Confirm a proposal
pub fn cmd_confirm(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    state.engine.confirm(caller, id, &mut state.ledger)?;
    state.save()?;

    let proposal = state.engine.proposal(id)?;
    println!("✍️  Proposal {} confirmed by {}", id, caller);
    println!(
        "   Confirmations: {}/{}",
        proposal.confirmation_count,
        state.engine.quorum()
    );
    if proposal.executed {
        println!("\n✅ Quorum reached, proposal executed.");
    }

    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    state.engine.revoke(caller, id)?;
    state.save()?;

    let proposal = state.engine.proposal(id)?;
    println!("↩️  Confirmation revoked by {}", caller);
    println!(
        "   Confirmations: {}/{}",
        proposal.confirmation_count,
        state.engine.quorum()
    );

    Ok(())
}

/// Execute a proposal that has reached the quorum
pub fn cmd_execute(state: &mut AppState, caller: &str, id: u64) -> CliResult<()> {
    state.engine.execute(caller, id, &mut state.ledger)?;
    state.save()?;

    println!("✅ Proposal {} executed", id);
    println!("   Balance: {} coins", state.engine.balance());

    Ok(())
}

/// Submit a self-governed quorum change proposal
pub fn cmd_set_quorum(state: &mut AppState, caller: &str, new_quorum: usize) -> CliResult<()> {
    let id = state
        .engine
        .submit_quorum_change(caller, new_quorum, &mut state.ledger)?;
    state.save()?;

    let proposal = state.engine.proposal(id)?;
    println!("🗳️  Quorum change to {} proposed as proposal {}", new_quorum, id);
    if proposal.executed {
        println!("   ✅ Quorum reached, change applied.");
    } else {
        println!(
            "   Confirmations: {}/{}; threshold stays at {} until it executes.",
            proposal.confirmation_count,
            state.engine.quorum(),
            state.engine.quorum()
        );
    }

    Ok(())
}

/// List proposals
pub fn cmd_proposals(state: &AppState, pending_only: bool) -> CliResult<()> {
    let proposals: Vec<_> = state
        .engine
        .proposals()
        .filter(|p| !pending_only || !p.executed)
        .collect();

    if proposals.is_empty() {
        println!("📭 No proposals. Create one with: wallet submit");
        return Ok(());
    }

    println!("📋 Proposals:");
    for proposal in proposals {
        let status = if proposal.executed { "executed" } else { "pending" };
        println!(
            "   #{} | {} | {} coins → {} | {}/{} confirmations",
            proposal.id,
            status,
            proposal.value,
            proposal.target,
            proposal.confirmation_count,
            state.engine.quorum()
        );
    }

    Ok(())
}

/// Show proposal detail
pub fn cmd_show(state: &AppState, id: u64) -> CliResult<()> {
    let proposal = state.engine.proposal(id)?;

    println!("📄 Proposal {}", proposal.id);
    println!("   ├─ Target: {}", proposal.target);
    println!("   ├─ Value: {} coins", proposal.value);
    println!("   ├─ Payload: {}", hex::encode(&proposal.payload));
    println!("   ├─ Executed: {}", proposal.executed);
    println!(
        "   ├─ Confirmations: {}/{}",
        proposal.confirmation_count,
        state.engine.quorum()
    );
    for principal in proposal.confirmed_by() {
        println!("   │    ✍️  {}", principal);
    }
    println!("   ├─ Submitted by: {}", proposal.submitted_by);
    println!(
        "   ├─ Submitted at: {}",
        proposal.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );
    match proposal.executed_at {
        Some(at) => println!("   └─ Executed at: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("   └─ Executed at: -"),
    }

    Ok(())
}

/// List principals and the quorum
pub fn cmd_principals(state: &AppState) -> CliResult<()> {
    println!("👥 Principals ({}):", state.engine.description());
    for i in 0..state.engine.principal_count() {
        println!("   {}. {}", i, state.engine.principal_at(i)?);
    }

    Ok(())
}

/// Show the audit event stream
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let records = state.engine.events();

    if records.is_empty() {
        println!("📭 No events recorded yet.");
        return Ok(());
    }

    println!("📜 Audit log (last {} of {}):", count.min(records.len()), records.len());
    for record in records.iter().rev().take(count).rev() {
        println!(
            "   #{} | {} | {}",
            record.seq,
            record.at.format("%Y-%m-%d %H:%M:%S"),
            record.event
        );
    }

    Ok(())
}

/// Show the reference ledger's view of a target
pub fn cmd_ledger_balance(state: &AppState, target: &str) -> CliResult<()> {
    println!(
        "💳 Ledger balance for {}: {} coins",
        target,
        state.ledger.balance_of(target)
    );
    Ok(())
}

/// Mark a ledger target as rejecting invocations
pub fn cmd_ledger_reject(state: &mut AppState, target: &str) -> CliResult<()> {
    state.ledger.reject_target(target);
    state.save()?;

    println!("🚫 Target {} now rejects invocations", target);
    println!("   Executions against it will fail and roll back until allowed again.");
    Ok(())
}

/// Clear a ledger target's rejecting mark
pub fn cmd_ledger_allow(state: &mut AppState, target: &str) -> CliResult<()> {
    state.ledger.allow_target(target);
    state.save()?;

    println!("✅ Target {} accepts invocations again", target);
    Ok(())
}

/// List delivered invocations
pub fn cmd_ledger_receipts(state: &AppState) -> CliResult<()> {
    let receipts = state.ledger.receipts();

    if receipts.is_empty() {
        println!("📭 No invocations delivered yet.");
        return Ok(());
    }

    println!("🧾 Invocations:");
    for receipt in receipts {
        println!(
            "   {} | {} coins → {} | payload {}",
            receipt.at.format("%Y-%m-%d %H:%M:%S"),
            receipt.value,
            receipt.target,
            if receipt.payload.is_empty() {
                "-".to_string()
            } else {
                hex::encode(&receipt.payload)
            }
        );
    }

    Ok(())
}

/// Export wallet state to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.engine, &state.ledger, path)?;
    println!("📦 Wallet exported to {:?}", path);
    Ok(())
}

/// Import wallet state from file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let snapshot = crate::storage::load_from_file(path)?;

    state.engine = snapshot.engine;
    state.engine.attach_sink(Box::new(LogSink));
    state.ledger = snapshot.ledger;
    state.save()?;

    println!("📥 Wallet imported from {:?}", path);
    println!("   Scheme: {}", state.engine.description());

    Ok(())
}
