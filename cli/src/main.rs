//! stakectl: run stake ledger operations against a local LMDB store.
//!
//! Every invocation opens the store, applies one command and exits. Events
//! emitted by mutating commands are printed to stdout as JSON lines; logs go
//! to stderr.

mod custody;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stake_ledger::{CallContext, LedgerConfig, RoleAuthorizer, SolvencyReport, StakeLedger};
use stake_store::RoleStore;
use stake_store_lmdb::{check_data_dir, IntegrityReport, LmdbEnvironment, Migrator};
use stake_types::{AccountId, Clock, StakePosition, SystemClock, Tier, Timestamp};
use stake_utils::{format_maturity, init_logging, LogFormat};

use crate::custody::LmdbCustody;

#[derive(Parser)]
#[command(name = "stakectl", about = "Stake ledger controller", version)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "STAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "STAKE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Transaction price offered with position operations.
    #[arg(long, default_value_t = 0, env = "STAKE_FEE")]
    fee: u64,

    /// Evaluate the command at this Unix time instead of the wall clock.
    #[arg(long)]
    now: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grant the first administrator of a fresh ledger.
    Init {
        #[arg(long)]
        admin: AccountId,
    },
    /// Open a position for a term of 1, 3, 6 or 12 months.
    Open {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        term: u32,
        #[arg(long)]
        amount: u128,
    },
    /// Close a matured position.
    Close {
        #[arg(long)]
        account: AccountId,
    },
    /// Close early, forfeiting reward and part of the principal.
    EmergencyClose {
        #[arg(long)]
        account: AccountId,
    },
    /// Lengthen an open position's term.
    Extend {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        months: u32,
    },
    /// Pay out accrued reward and restart accrual.
    WithdrawReward {
        #[arg(long)]
        account: AccountId,
    },
    /// Show an account's position record.
    Position {
        #[arg(long)]
        account: AccountId,
    },
    /// Show reward accrued so far by an open position.
    Pending {
        #[arg(long)]
        account: AccountId,
    },
    /// Show the aggregate counters.
    Totals {
        #[arg(long)]
        caller: AccountId,
    },
    /// Cross-check the counters against stored positions and records.
    Audit {
        #[arg(long)]
        caller: AccountId,
    },
    /// Grant a tier to an account.
    Grant {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        tier: Tier,
    },
    /// Revoke a tier from an account.
    Revoke {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        tier: Tier,
    },
    /// Credit units to an account in the local custody book.
    Deposit {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        amount: u128,
    },
    /// Show an account's custody balance.
    Balance {
        #[arg(long)]
        account: AccountId,
    },
}

/// Wall clock, or a fixed instant when replaying.
#[derive(Clone, Copy, Debug)]
enum ReplayClock {
    System(SystemClock),
    Fixed(Timestamp),
}

impl Clock for ReplayClock {
    fn now(&self) -> Timestamp {
        match self {
            ReplayClock::System(clock) => clock.now(),
            ReplayClock::Fixed(at) => *at,
        }
    }
}

type Ledger = StakeLedger<
    Arc<LmdbEnvironment>,
    LmdbCustody,
    ReplayClock,
    RoleAuthorizer<Arc<LmdbEnvironment>>,
>;

#[derive(Serialize)]
struct PositionView<'a> {
    account: &'a AccountId,
    position: StakePosition,
    status: String,
}

#[derive(Serialize)]
struct PendingView<'a> {
    account: &'a AccountId,
    pending_reward: u128,
}

#[derive(Serialize)]
struct AuditView {
    consistent: bool,
    solvency: SolvencyReport,
    integrity: IntegrityReport,
}

#[derive(Serialize)]
struct BalanceView<'a> {
    account: &'a AccountId,
    balance: u128,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = match format {
            LogFormat::Human => "human".to_string(),
            LogFormat::Json => "json".to_string(),
        };
    }
    Ok(config)
}

fn open_ledger(
    config: &LedgerConfig,
    clock: ReplayClock,
) -> anyhow::Result<(Arc<LmdbEnvironment>, Ledger)> {
    check_data_dir(&config.data_dir)?;
    let env = Arc::new(
        LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?,
    );
    Migrator::run(env.as_ref())?;

    let mut ledger = StakeLedger::new(
        Arc::clone(&env),
        LmdbCustody::new(Arc::clone(&env)),
        clock,
        RoleAuthorizer::new(Arc::clone(&env)),
        config.vault.clone(),
        config.params.clone(),
    )
    .with_min_fee(config.min_fee);

    ledger.subscribe(Box::new(|event| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "failed to encode event"),
    }));

    if let Some(admin) = &config.admin {
        if env.administrator_count()? == 0 {
            ledger.initialize(admin)?;
        }
    }
    Ok((env, ledger))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);

    let clock = match cli.now {
        Some(secs) => ReplayClock::Fixed(Timestamp::new(secs)),
        None => ReplayClock::System(SystemClock),
    };
    let (env, ledger) = open_ledger(&config, clock)?;
    let ctx = |account: AccountId| CallContext::new(account, cli.fee);

    match cli.command {
        Command::Init { admin } => {
            ledger.initialize(&admin)?;
        }
        Command::Open {
            account,
            term,
            amount,
        } => {
            ledger.open(&ctx(account), term, amount)?;
        }
        Command::Close { account } => {
            ledger.close(&ctx(account))?;
        }
        Command::EmergencyClose { account } => {
            ledger.close_emergency(&ctx(account))?;
        }
        Command::Extend { account, months } => {
            ledger.extend_term(&ctx(account), months)?;
        }
        Command::WithdrawReward { account } => {
            ledger.withdraw_reward(&ctx(account))?;
        }
        Command::Position { account } => {
            let position = ledger.position(&account)?;
            let status = if position.active {
                let matures_at = position.matures_at(ledger.params().seconds_per_month);
                format_maturity(clock.now(), matures_at)
            } else {
                "closed".to_string()
            };
            print_json(&PositionView {
                account: &account,
                position,
                status,
            })?;
        }
        Command::Pending { account } => {
            let pending_reward = ledger.pending_reward(&account)?;
            print_json(&PendingView {
                account: &account,
                pending_reward,
            })?;
        }
        Command::Totals { caller } => {
            print_json(&ledger.totals(&ctx(caller))?)?;
        }
        Command::Audit { caller } => {
            let solvency = ledger.audit(&ctx(caller))?;
            let integrity = env.check_integrity()?;
            print_json(&AuditView {
                consistent: solvency.is_consistent() && integrity.is_healthy(),
                solvency,
                integrity,
            })?;
        }
        Command::Grant {
            caller,
            account,
            tier,
        } => {
            ledger.grant_role(&ctx(caller), &account, tier)?;
        }
        Command::Revoke {
            caller,
            account,
            tier,
        } => {
            ledger.revoke_role(&ctx(caller), &account, tier)?;
        }
        Command::Deposit { account, amount } => {
            let balance = env.credit(&account, amount)?;
            tracing::info!(account = %account, amount, "custody credited");
            print_json(&BalanceView {
                account: &account,
                balance,
            })?;
        }
        Command::Balance { account } => {
            let balance = env.balance(&account)?;
            print_json(&BalanceView {
                account: &account,
                balance,
            })?;
        }
    }
    Ok(())
}
