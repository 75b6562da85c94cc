use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use netaxept::application::orchestrator::PaymentOrchestrator;
use netaxept::config::{DEFAULT_ENDPOINT, DEFAULT_TERMINAL, GatewayConfig};
use netaxept::domain::payment::{Amount, PaymentFilter, PaymentRequest};
use netaxept::domain::ports::{OperationStoreBox, PaymentStoreBox};
use netaxept::infrastructure::in_memory::InMemoryStore;
use netaxept::infrastructure::soap::{NetaxeptClient, terminal_url};
use netaxept::interfaces::csv::operation_writer::OperationWriter;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[arg(long, env = "NETAXEPT_MERCHANTID", default_value = "", global = true)]
    merchant_id: String,

    #[arg(long, env = "NETAXEPT_TOKEN", default_value = "", hide_env_values = true, global = true)]
    token: String,

    /// SOAP service endpoint
    #[arg(long, env = "NETAXEPT_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Hosted payment terminal
    #[arg(long, env = "NETAXEPT_TERMINAL", default_value = DEFAULT_TERMINAL, global = true)]
    terminal: String,

    /// Timeout for a single gateway call, in seconds
    #[arg(long, env = "NETAXEPT_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a payment and print it along with its terminal url
    Register {
        order_number: String,
        /// Amount in the smallest currency unit (e.g. 100 for 1 NOK)
        amount: u64,
        #[arg(long, default_value = "NOK")]
        currency_code: String,
        #[arg(long)]
        redirect_url: String,
        #[arg(long)]
        description: Option<String>,
        /// Authorize automatically after the terminal step
        #[arg(long)]
        auto_auth: bool,
    },
    Auth {
        payment_id: Uuid,
    },
    Sale {
        payment_id: Uuid,
    },
    /// Capture an authorized payment; omitting the amount captures what remains
    Capture {
        payment_id: Uuid,
        amount: Option<u64>,
    },
    /// Credit a captured payment; omitting the amount credits what remains
    Credit {
        payment_id: Uuid,
        amount: Option<u64>,
    },
    Annul {
        payment_id: Uuid,
    },
    /// Print a stored payment
    Show {
        payment_id: Uuid,
    },
    /// Print the operations of a payment as CSV
    Operations {
        payment_id: Uuid,
    },
    /// List stored payments, oldest first
    List {
        /// Only payments whose registration failed
        #[arg(long, conflicts_with = "succeeded")]
        failed: bool,
        /// Only payments whose registration succeeded
        #[arg(long)]
        succeeded: bool,
        #[arg(long)]
        currency_code: Option<String>,
        /// Match against order number or transaction id, ignoring case
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the payment holding a transaction id
    Find {
        transaction_id: String,
    },
    /// Print the hosted terminal url for a transaction id
    TerminalUrl {
        transaction_id: String,
    },
}

impl Command {
    /// Commands that act on payments registered by an earlier invocation.
    fn needs_stored_payments(&self) -> bool {
        !matches!(self, Command::Register { .. } | Command::TerminalUrl { .. })
    }
}

/// Stores opened for one invocation.
struct Stores {
    payments: PaymentStoreBox,
    operations: OperationStoreBox,
    /// Whether records outlive this process.
    persistent: bool,
}

impl Stores {
    fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            payments: Box::new(store.clone()),
            operations: Box::new(store),
            persistent: false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::new(cli.merchant_id, cli.token)
        .and_then(|c| c.with_endpoint(&cli.endpoint))
        .and_then(|c| c.with_terminal(&cli.terminal))
        .into_diagnostic()?
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let gateway = NetaxeptClient::new(config.clone()).into_diagnostic()?;

    let stores = open_stores(cli.db_path)?;
    if cli.command.needs_stored_payments() && !stores.persistent {
        return Err(miette!(
            "No persistent store: this command reads payments from earlier runs, so it needs \
             --db-path and the 'storage-rocksdb' feature"
        ));
    }
    let orchestrator =
        PaymentOrchestrator::new(stores.payments, stores.operations, Box::new(gateway));

    match cli.command {
        Command::Register {
            order_number,
            amount,
            currency_code,
            redirect_url,
            description,
            auto_auth,
        } => {
            let amount = Amount::new(amount).into_diagnostic()?;
            let mut request = PaymentRequest::new(order_number, amount, currency_code, redirect_url)
                .with_auto_auth(auto_auth);
            if let Some(description) = description {
                request = request.with_description(description);
            }
            let payment = orchestrator.register(request).await.into_diagnostic()?;
            print_json(&payment)?;
            println!("{}", orchestrator.terminal_url(payment.id).await.into_diagnostic()?);
        }
        Command::Auth { payment_id } => {
            print_json(&orchestrator.auth(payment_id).await.into_diagnostic()?)?;
        }
        Command::Sale { payment_id } => {
            print_json(&orchestrator.sale(payment_id).await.into_diagnostic()?)?;
        }
        Command::Capture { payment_id, amount } => {
            let amount = amount.map(Amount::new).transpose().into_diagnostic()?;
            print_json(&orchestrator.capture(payment_id, amount).await.into_diagnostic()?)?;
        }
        Command::Credit { payment_id, amount } => {
            let amount = amount.map(Amount::new).transpose().into_diagnostic()?;
            print_json(&orchestrator.credit(payment_id, amount).await.into_diagnostic()?)?;
        }
        Command::Annul { payment_id } => {
            print_json(&orchestrator.annul(payment_id).await.into_diagnostic()?)?;
        }
        Command::Show { payment_id } => {
            print_json(&orchestrator.payment(payment_id).await.into_diagnostic()?)?;
        }
        Command::Operations { payment_id } => {
            let operations = orchestrator.operations(payment_id).await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = OperationWriter::new(stdout.lock());
            writer.write_operations(&operations).into_diagnostic()?;
        }
        Command::List {
            failed,
            succeeded,
            currency_code,
            search,
        } => {
            let filter = PaymentFilter {
                success: match (failed, succeeded) {
                    (true, _) => Some(false),
                    (_, true) => Some(true),
                    _ => None,
                },
                currency_code,
                search,
            };
            print_json(&orchestrator.payments(&filter).await.into_diagnostic()?)?;
        }
        Command::Find { transaction_id } => {
            let payment = orchestrator
                .find_by_transaction_id(&transaction_id)
                .await
                .into_diagnostic()?;
            print_json(&payment)?;
        }
        Command::TerminalUrl { transaction_id } => {
            println!("{}", terminal_url(&config, &transaction_id));
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use netaxept::infrastructure::rocksdb::RocksDBStore;

    let Some(db_path) = db_path else {
        return Ok(Stores::in_memory());
    };
    // Use persistent storage (RocksDB)
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        payments: Box::new(store.clone()),
        operations: Box::new(store),
        persistent: true,
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Stores::in_memory())
}
