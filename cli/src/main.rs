use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use fee_sharing_sdk::{
    instructions::{derive_ata, SourceAccounts, NATIVE_MINT},
    ClaimParams, DepositParams, FeeSharingClient, PoolKind, SourceDepositParams,
};
use serde::Serialize;
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
};
use std::str::FromStr;

// ─── Token symbol registry (mainnet-beta) ────────────────────────────────────

const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
    ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
];

/// Resolve `native`/`SOL`, a known symbol or a base-58 mint to a pool.
fn resolve_pool(symbol_or_address: &str) -> Result<PoolKind> {
    let upper = symbol_or_address.to_uppercase();
    for (sym, addr) in KNOWN_TOKENS {
        if upper == *sym {
            return Ok(PoolKind::Token(Pubkey::from_str(addr)?));
        }
    }
    PoolKind::from_str(symbol_or_address).map_err(|_| anyhow!(
        "Unknown pool '{}'. Use `native`, a built-in symbol ({}) or a base-58 mint address.",
        symbol_or_address,
        KNOWN_TOKENS.iter().map(|(s, _)| *s).collect::<Vec<_>>().join(", ")
    ))
}

/// Pool label: `native`, a known symbol, or a shortened mint.
fn pool_label(pool: &PoolKind) -> String {
    let PoolKind::Token(mint) = pool else {
        return "native".into();
    };
    let addr = mint.to_string();
    for (sym, known) in KNOWN_TOKENS {
        if addr == *known {
            return sym.to_string();
        }
    }
    format!("{}…{}", &addr[..4], &addr[addr.len() - 4..])
}

fn parse_pubkey(what: &str, s: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).map_err(|_| anyhow!("--{what} must be a base-58 address. Got: '{s}'"))
}

/// Expand `~/` to `$HOME/` in keypair paths.
fn expand_home(path: &str) -> String {
    if path.starts_with("~/") {
        format!("{}{}", std::env::var("HOME").unwrap_or_default(), &path[1..])
    } else {
        path.to_string()
    }
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded)
        .map_err(|e| anyhow!(
            "Cannot load keypair from '{}': {}\n  \
             Set FEE_SHARING_KEYPAIR or pass --keypair to specify a different path.",
            expanded, e
        ))
}

/// Emit `{"status":"ok","command":…}` merged with a serialized result.
fn print_json<T: Serialize>(command: &str, value: &T) -> Result<()> {
    let mut out = json!({ "status": "ok", "command": command });
    if let (Some(o), serde_json::Value::Object(fields)) =
        (out.as_object_mut(), serde_json::to_value(value)?)
    {
        o.extend(fields);
    }
    println!("{out}");
    Ok(())
}

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner(program_id: &Pubkey) {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  Fee Sharing  v{ver}  ·  stake-weighted fee checkpoints on Solana");
    println!("  {}", "─".repeat(62));
    println!("  Program   {program_id}");
    println!("  Pools     one per fee asset, plus `native` for lamports");
    println!("  Claims    pro-rata to weighted stake recorded before each checkpoint");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Fee Sharing: collect protocol fees and distribute them to stakers.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   FEE_SHARING_RPC_URL  Solana JSON-RPC endpoint
///   FEE_SHARING_KEYPAIR  path to an Ed25519 keypair JSON
#[derive(Parser)]
#[command(
    name    = "fee-sharing",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Checkpointed fee distribution to stakers on Solana.",
    after_help = "\
ENVIRONMENT:
  FEE_SHARING_RPC_URL    Solana JSON-RPC endpoint  [default: https://api.mainnet-beta.solana.com]
  FEE_SHARING_KEYPAIR    Path to Ed25519 keypair JSON  [default: ~/.config/solana/id.json]
  FEE_SHARING_PROGRAM_ID Override the program id (local deployments)

QUICK START:
  fee-sharing deposit        --pool USDC --amount 1000000
  fee-sharing pool-info      --pool USDC
  fee-sharing my-entitlement --pool USDC
  fee-sharing claim-all      --pool USDC"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global     = true,
        value_name = "URL",
        default_value = "https://api.mainnet-beta.solana.com",
        env = "FEE_SHARING_RPC_URL"
    )]
    rpc_url: String,

    /// Path to the signer's Ed25519 keypair JSON file
    #[arg(
        long,
        global     = true,
        value_name = "PATH",
        default_value = "~/.config/solana/id.json",
        env = "FEE_SHARING_KEYPAIR"
    )]
    keypair: String,

    /// Program id, if not the default deployment
    #[arg(long, global = true, value_name = "PUBKEY", env = "FEE_SHARING_PROGRAM_ID")]
    program_id: Option<String>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the collector and its wrapped-native reserve (admin = signer)
    #[command(
        after_help = "\
EXAMPLES:
  # Seal at most once a day
  fee-sharing init --weight-oracle <PROGRAM> --total-weight-history <ACCOUNT>

  # Hourly checkpoints
  fee-sharing init --weight-oracle <PROGRAM> --total-weight-history <ACCOUNT> --interval 3600"
    )]
    Init {
        /// Program owning the stake weight history accounts
        #[arg(long, value_name = "PUBKEY")]
        weight_oracle: String,

        /// Account holding the total weighted stake history
        #[arg(long, value_name = "PUBKEY")]
        total_weight_history: String,

        /// Minimum seconds between checkpoints
        #[arg(long, value_name = "SECS", default_value_t = 86_400)]
        interval: i64,
    },

    /// Deposit tokens or lamports into a pool
    ///
    /// The first deposit into a pool seals immediately. Later deposits
    /// accumulate until the withdrawal interval has passed.
    #[command(
        after_help = "\
EXAMPLES:
  fee-sharing deposit --pool USDC   --amount 1000000
  fee-sharing deposit --pool native --amount 500000000

NOTES:
  Amounts are in atomic units: lamports for native, μUSDC for USDC, etc."
    )]
    Deposit {
        /// `native`, a symbol (USDC, USDT) or a base-58 mint
        #[arg(long, value_name = "POOL")]
        pool: String,

        /// Amount to deposit (atomic units)
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },

    /// Pull accrued fees from a whitelisted source program
    DepositSource {
        /// Source state account (must be whitelisted)
        #[arg(long, value_name = "PUBKEY")]
        source: String,

        /// Program owning the source account
        #[arg(long, value_name = "PUBKEY")]
        source_program: String,

        /// Token account the source holds its fees in
        #[arg(long, value_name = "PUBKEY")]
        source_fee_vault: String,

        /// Authority the source program signs the vault with
        #[arg(long, value_name = "PUBKEY")]
        source_authority: String,

        /// Mint of the fees the source pays out
        #[arg(long, value_name = "PUBKEY")]
        fee_mint: String,
    },

    /// Seal pending fees into a checkpoint once the interval has passed
    Seal {
        #[arg(long, value_name = "POOL")]
        pool: String,
    },

    /// Claim one batch of checkpoints
    #[command(
        after_help = "\
EXAMPLES:
  # Claim up to 32 checkpoints into your own wallet
  fee-sharing claim --pool USDC

  # Pay another wallet
  fee-sharing claim --pool native --receiver <PUBKEY>"
    )]
    Claim {
        #[arg(long, value_name = "POOL")]
        pool: String,

        /// Most checkpoints processed in this transaction
        #[arg(long, value_name = "N", default_value_t = 32)]
        max_checkpoints: u32,

        /// Wallet receiving the payout (defaults to the signer)
        #[arg(long, value_name = "PUBKEY")]
        receiver: Option<String>,
    },

    /// Claim everything owed, one transaction per batch
    ClaimAll {
        #[arg(long, value_name = "POOL")]
        pool: String,

        /// Checkpoints per transaction
        #[arg(long, value_name = "N", default_value_t = 32)]
        batch: u32,

        #[arg(long, value_name = "PUBKEY")]
        receiver: Option<String>,
    },

    /// Show a pool's checkpoints, pending accrual and balance
    PoolInfo {
        #[arg(long, value_name = "POOL")]
        pool: String,
    },

    /// List every pool opened so far
    Pools,

    /// Show one sealed checkpoint
    Checkpoint {
        #[arg(long, value_name = "POOL")]
        pool: String,

        #[arg(long, value_name = "INDEX")]
        index: u64,
    },

    /// Show what an account can claim from a pool right now
    MyEntitlement {
        #[arg(long, value_name = "POOL")]
        pool: String,

        /// Account to query (defaults to the signer)
        #[arg(long, value_name = "PUBKEY")]
        owner: Option<String>,
    },

    /// Show collector configuration, sources and reserve balance
    CollectorInfo,

    /// Admin: whitelist a fee source
    AddSource {
        #[arg(long, value_name = "PUBKEY")]
        source: String,
    },

    /// Admin: remove a fee source from the whitelist
    RemoveSource {
        #[arg(long, value_name = "PUBKEY")]
        source: String,
    },

    /// Admin: move wrapped SOL out of the reserve
    #[command(
        after_help = "\
EXAMPLES:
  # Sweep 1 SOL to your own wrapped-SOL account
  fee-sharing sweep-reserve --amount 1000000000"
    )]
    SweepReserve {
        /// Wrapped-SOL token account to receive (defaults to the signer's ATA)
        #[arg(long, value_name = "PUBKEY")]
        receiver_token: Option<String>,

        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().len() == 1 {
        print_banner(&FeeSharingClient::new("").program_id());
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let mut client = FeeSharingClient::new(cli.rpc_url.clone());
    if let Some(id) = &cli.program_id {
        client = client.with_program_id(parse_pubkey("program-id", id)?);
    }

    match &cli.command {
        Commands::Init { weight_oracle, total_weight_history, interval } => {
            cmd_init(&client, &cli, weight_oracle, total_weight_history, *interval).await?;
        }
        Commands::Deposit { pool, amount } => {
            cmd_deposit(&client, &cli, pool, *amount).await?;
        }
        Commands::DepositSource { source, source_program, source_fee_vault, source_authority, fee_mint } => {
            let accounts = SourceAccounts {
                source:           parse_pubkey("source", source)?,
                source_program:   parse_pubkey("source-program", source_program)?,
                source_fee_vault: parse_pubkey("source-fee-vault", source_fee_vault)?,
                source_authority: parse_pubkey("source-authority", source_authority)?,
                fee_mint:         parse_pubkey("fee-mint", fee_mint)?,
            };
            cmd_deposit_source(&client, &cli, accounts).await?;
        }
        Commands::Seal { pool } => {
            cmd_seal(&client, &cli, pool).await?;
        }
        Commands::Claim { pool, max_checkpoints, receiver } => {
            cmd_claim(&client, &cli, pool, *max_checkpoints, receiver.as_deref()).await?;
        }
        Commands::ClaimAll { pool, batch, receiver } => {
            cmd_claim_all(&client, &cli, pool, *batch, receiver.as_deref()).await?;
        }
        Commands::PoolInfo { pool } => {
            cmd_pool_info(&client, pool, cli.json).await?;
        }
        Commands::Pools => {
            cmd_pools(&client, cli.json).await?;
        }
        Commands::Checkpoint { pool, index } => {
            cmd_checkpoint(&client, pool, *index, cli.json).await?;
        }
        Commands::MyEntitlement { pool, owner } => {
            cmd_my_entitlement(&client, &cli, pool, owner.as_deref()).await?;
        }
        Commands::CollectorInfo => {
            cmd_collector_info(&client, cli.json).await?;
        }
        Commands::AddSource { source } => {
            cmd_manage_source(&client, &cli, source, true).await?;
        }
        Commands::RemoveSource { source } => {
            cmd_manage_source(&client, &cli, source, false).await?;
        }
        Commands::SweepReserve { receiver_token, amount } => {
            cmd_sweep_reserve(&client, &cli, receiver_token.as_deref(), *amount).await?;
        }
    }

    Ok(())
}

// ─── init ─────────────────────────────────────────────────────────────────────

async fn cmd_init(
    client: &FeeSharingClient,
    cli: &Cli,
    weight_oracle: &str,
    total_weight_history: &str,
    interval: i64,
) -> Result<()> {
    let admin  = load_keypair(&cli.keypair)?;
    let oracle = parse_pubkey("weight-oracle", weight_oracle)?;
    let total  = parse_pubkey("total-weight-history", total_weight_history)?;

    let res = client
        .initialize_collector(&admin, oracle, total, interval)
        .await
        .context("initialize_collector transaction failed")?;

    if cli.json {
        print_json("init", &json!({
            "admin":                admin.pubkey().to_string(),
            "weight_oracle":        oracle.to_string(),
            "total_weight_history": total.to_string(),
            "withdrawal_interval":  interval,
            "tx":                   res.signature,
        }))?;
    } else {
        println!("─── Collector Initialized ────────────────────────────────────────");
        println!("  Admin            {}", admin.pubkey());
        println!("  Weight oracle    {oracle}");
        println!("  Total weights    {total}");
        println!("  Interval         {interval} s");
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

// ─── deposit ──────────────────────────────────────────────────────────────────

async fn cmd_deposit(client: &FeeSharingClient, cli: &Cli, pool: &str, amount: u64) -> Result<()> {
    let payer = load_keypair(&cli.keypair)?;
    let pool  = resolve_pool(pool)?;

    let res = client
        .deposit(&payer, DepositParams { pool, amount })
        .await
        .with_context(|| format!("deposit into pool '{}' failed", pool_label(&pool)))?;

    if cli.json {
        print_json("deposit", &res)?;
    } else {
        println!("─── Fees Deposited ───────────────────────────────────────────────");
        println!("  Pool             {}", pool_label(&pool));
        println!("  Fee pool         {}", res.fee_pool);
        println!("  Amount           {:>20}", res.amount);
        println!("  Transaction      {}", res.signature);
        println!();
        println!("  Run `fee-sharing pool-info --pool {}` to see whether it sealed.", pool);
    }
    Ok(())
}

// ─── deposit-source ──────────────────────────────────────────────────────────

async fn cmd_deposit_source(
    client: &FeeSharingClient,
    cli: &Cli,
    accounts: SourceAccounts,
) -> Result<()> {
    let payer = load_keypair(&cli.keypair)?;
    let res = client
        .deposit_from_source(&payer, SourceDepositParams { accounts })
        .await
        .context("deposit_from_source transaction failed")?;

    if cli.json {
        print_json("deposit-source", &json!({
            "source":   accounts.source.to_string(),
            "fee_mint": accounts.fee_mint.to_string(),
            "tx":       res.signature,
        }))?;
    } else {
        println!("─── Source Fees Withdrawn ────────────────────────────────────────");
        println!("  Source           {}", accounts.source);
        println!("  Fee mint         {}", accounts.fee_mint);
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

// ─── seal ─────────────────────────────────────────────────────────────────────

async fn cmd_seal(client: &FeeSharingClient, cli: &Cli, pool: &str) -> Result<()> {
    let payer = load_keypair(&cli.keypair)?;
    let pool  = resolve_pool(pool)?;

    let info = client.pool_info(pool).await?;
    if info.pending_accrual == 0 {
        if cli.json {
            print_json("seal", &json!({ "pool": pool.to_string(), "note": "Nothing pending" }))?;
        } else {
            println!("  Nothing pending in pool '{}'.", pool_label(&pool));
        }
        return Ok(());
    }

    let res = client
        .seal_pending(&payer, pool)
        .await
        .with_context(|| format!(
            "seal_pending failed; the next seal is due at unix time {}",
            info.next_seal_time
        ))?;

    if cli.json {
        print_json("seal", &json!({
            "pool":   pool.to_string(),
            "amount": info.pending_accrual,
            "index":  info.checkpoint_count,
            "tx":     res.signature,
        }))?;
    } else {
        println!("─── Checkpoint Sealed ────────────────────────────────────────────");
        println!("  Pool             {}", pool_label(&pool));
        println!("  Index            {}", info.checkpoint_count);
        println!("  Amount           {:>20}", info.pending_accrual);
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

// ─── claim ────────────────────────────────────────────────────────────────────

async fn cmd_claim(
    client: &FeeSharingClient,
    cli: &Cli,
    pool: &str,
    max_checkpoints: u32,
    receiver: Option<&str>,
) -> Result<()> {
    let payer    = load_keypair(&cli.keypair)?;
    let pool     = resolve_pool(pool)?;
    let receiver = receiver.map(|r| parse_pubkey("receiver", r)).transpose()?;

    let res = client
        .claim(&payer, ClaimParams { pool, max_checkpoints, receiver })
        .await
        .context("claim transaction failed")?;

    if cli.json {
        print_json("claim", &res)?;
    } else {
        println!("─── Entitlement Claimed ──────────────────────────────────────────");
        println!("  Pool             {}", pool_label(&pool));
        println!("  Receiver         {}", res.receiver);
        println!("  Amount           {:>20}", res.amount);
        println!("  Processed        {} checkpoint(s)", res.processed_count);
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

async fn cmd_claim_all(
    client: &FeeSharingClient,
    cli: &Cli,
    pool: &str,
    batch: u32,
    receiver: Option<&str>,
) -> Result<()> {
    let payer    = load_keypair(&cli.keypair)?;
    let pool     = resolve_pool(pool)?;
    let receiver = receiver.map(|r| parse_pubkey("receiver", r)).transpose()?;

    let res = client
        .claim_all(&payer, pool, batch, receiver)
        .await
        .context("claim-all failed")?;

    if cli.json {
        print_json("claim-all", &res)?;
    } else {
        println!("─── Entitlement Claimed ──────────────────────────────────────────");
        println!("  Pool             {}", pool_label(&pool));
        for (i, c) in res.claims.iter().enumerate() {
            println!("  [{:>2}]  {:>20}  up to checkpoint {}  {}",
                     i + 1, c.amount, c.processed_count, c.signature);
        }
        println!();
        println!("  Total            {:>20}  ({} transaction(s))", res.total_amount, res.claims.len());
    }
    Ok(())
}

// ─── pool-info ────────────────────────────────────────────────────────────────

async fn cmd_pool_info(client: &FeeSharingClient, pool: &str, json_output: bool) -> Result<()> {
    let pool = resolve_pool(pool)?;
    let info = client.pool_info(pool).await.with_context(|| format!(
        "Pool '{}' not found. It is created by its first deposit.",
        pool_label(&pool)
    ))?;

    if json_output {
        print_json("pool-info", &info)?;
    } else {
        println!("─── Pool Info: {} ──────────────────────────────────────────────", pool_label(&pool));
        println!("  Fee pool         {}", info.address);
        if matches!(pool, PoolKind::Token(_)) {
            println!("  Vault            {}", info.vault);
        }
        println!("  Balance          {:>20}", info.balance);
        println!();
        println!("  Checkpoints      {:>20}", info.checkpoint_count);
        println!("  Pending          {:>20}", info.pending_accrual);
        println!("  Last seal        {:>20}  (unix)", info.last_seal_time);
        println!("  Next seal due    {:>20}  (unix)", info.next_seal_time);
    }
    Ok(())
}

// ─── pools ────────────────────────────────────────────────────────────────────

async fn cmd_pools(client: &FeeSharingClient, json_output: bool) -> Result<()> {
    let pools = client
        .list_pools()
        .await
        .context("Failed to query pool accounts; check your RPC endpoint")?;

    if json_output {
        let items: Vec<_> = pools.iter().map(|(pk, p)| json!({
            "pool":             PoolKind::from_pool_id(p.pool_id).to_string(),
            "address":          pk.to_string(),
            "checkpoint_count": p.checkpoint_count(),
            "pending_accrual":  p.pending_amount,
        })).collect();
        print_json("pools", &json!({ "pools": items }))?;
    } else {
        println!("─── Pools ────────────────────────────────────────────────────────");
        if pools.is_empty() {
            println!("  No pools yet. The first deposit into an asset opens its pool.");
        }
        for (i, (pk, p)) in pools.iter().enumerate() {
            println!("  [{:>2}]  Pool         {}", i + 1, pool_label(&PoolKind::from_pool_id(p.pool_id)));
            println!("        Address      {pk}");
            println!("        Checkpoints  {:>20}", p.checkpoint_count());
            println!("        Pending      {:>20}", p.pending_amount);
            println!();
        }
    }
    Ok(())
}

// ─── checkpoint ───────────────────────────────────────────────────────────────

async fn cmd_checkpoint(client: &FeeSharingClient, pool: &str, index: u64, json_output: bool) -> Result<()> {
    let pool = resolve_pool(pool)?;
    let cp = client.checkpoint_at(pool, index).await?;

    if json_output {
        print_json("checkpoint", &cp)?;
    } else {
        println!("─── Checkpoint {} · {} ───────────────────────────────────────────", cp.index, pool_label(&pool));
        println!("  Slot             {:>20}", cp.slot);
        println!("  Sealed at        {:>20}  (unix)", cp.timestamp);
        println!("  Total stake      {:>20}", cp.total_weighted_stake);
        println!("  Amount           {:>20}", cp.amount);
    }
    Ok(())
}

// ─── my-entitlement ───────────────────────────────────────────────────────────

async fn cmd_my_entitlement(
    client: &FeeSharingClient,
    cli: &Cli,
    pool: &str,
    owner: Option<&str>,
) -> Result<()> {
    let pool  = resolve_pool(pool)?;
    let owner = match owner {
        Some(o) => parse_pubkey("owner", o)?,
        None => load_keypair(&cli.keypair)?.pubkey(),
    };
    let info = client.entitlement(&owner, pool).await?;

    if cli.json {
        print_json("my-entitlement", &info)?;
    } else {
        println!("─── Entitlement ──────────────────────────────────────────────────");
        println!("  Account          {owner}");
        println!("  Pool             {}", pool_label(&pool));
        println!("  Processed        {} of {} checkpoint(s)", info.processed_count, info.checkpoint_count);
        println!("  Claimable        {:>20}", info.entitlement);
        if info.is_escrow {
            println!();
            println!("  Escrow accounts are excluded from distribution.");
        }
    }
    Ok(())
}

// ─── collector-info ───────────────────────────────────────────────────────────

async fn cmd_collector_info(client: &FeeSharingClient, json_output: bool) -> Result<()> {
    let info = client.collector_info().await?;

    if json_output {
        print_json("collector-info", &info)?;
    } else {
        println!("─── Collector ────────────────────────────────────────────────────");
        println!("  Address          {}", info.address);
        println!("  Admin            {}", info.admin);
        println!("  Weight oracle    {}", info.weight_oracle);
        println!("  Total weights    {}", info.total_weight_history);
        println!("  Interval         {} s", info.withdrawal_interval);
        println!("  Reserve          {}  ({} lamports)", info.wrapped_reserve, info.reserve_balance);
        println!();
        println!("  Sources ({})", info.sources.len());
        for s in &info.sources {
            println!("    {s}");
        }
    }
    Ok(())
}

// ─── add-source / remove-source ──────────────────────────────────────────────

async fn cmd_manage_source(client: &FeeSharingClient, cli: &Cli, source: &str, add: bool) -> Result<()> {
    let admin  = load_keypair(&cli.keypair)?;
    let source = parse_pubkey("source", source)?;
    let (command, res) = if add {
        ("add-source", client.add_source(&admin, source).await.context("add_source failed")?)
    } else {
        ("remove-source", client.remove_source(&admin, source).await.context("remove_source failed")?)
    };

    if cli.json {
        print_json(command, &json!({ "source": source.to_string(), "tx": res.signature }))?;
    } else {
        println!("─── {} ───────────────────────────────────────────────────────", if add { "Source Added" } else { "Source Removed" });
        println!("  Source           {source}");
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

// ─── sweep-reserve ────────────────────────────────────────────────────────────

async fn cmd_sweep_reserve(
    client: &FeeSharingClient,
    cli: &Cli,
    receiver_token: Option<&str>,
    amount: u64,
) -> Result<()> {
    let admin    = load_keypair(&cli.keypair)?;
    let receiver = match receiver_token {
        Some(r) => parse_pubkey("receiver-token", r)?,
        None => derive_ata(&admin.pubkey(), &NATIVE_MINT),
    };
    let res = client
        .sweep_reserve(&admin, receiver, amount)
        .await
        .context("sweep_reserve transaction failed")?;

    if cli.json {
        print_json("sweep-reserve", &json!({
            "receiver_token": receiver.to_string(),
            "amount":         amount,
            "tx":             res.signature,
        }))?;
    } else {
        println!("─── Reserve Swept ────────────────────────────────────────────────");
        println!("  Receiver         {receiver}");
        println!("  Amount           {:>20}", amount);
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}
