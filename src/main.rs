use clap::{Parser, ValueEnum};
use datafono_mock::application::lifecycle::{DriverMode, TransactionLifecycle};
use datafono_mock::application::status::StatusResolver;
use datafono_mock::application::store::TransactionStore;
use datafono_mock::application::vault::TokenVault;
use datafono_mock::domain::ports::{ClockArc, PersistenceAdapterArc, RandomSourceArc};
use datafono_mock::infrastructure::clock::SystemClock;
use datafono_mock::infrastructure::json_file::JsonFileAdapter;
use datafono_mock::infrastructure::random::ThreadRngSource;
use datafono_mock::interfaces::http::{AppState, router};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum DriverArg {
    /// Resolve each transaction from a background timer.
    Timer,
    /// Resolve lazily on the first status poll past the processing window.
    Lazy,
}

impl From<DriverArg> for DriverMode {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Timer => DriverMode::Timer,
            DriverArg::Lazy => DriverMode::Lazy,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Path to the persisted transaction store
    #[arg(long, default_value = "transaction-store.json")]
    store_file: PathBuf,

    /// How pending transactions are advanced to a terminal state
    #[arg(long, value_enum, default_value_t = DriverArg::Lazy)]
    driver: DriverArg,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock: ClockArc = Arc::new(SystemClock::new());
    let random: RandomSourceArc = Arc::new(ThreadRngSource::new());
    let adapter: PersistenceAdapterArc = Arc::new(JsonFileAdapter::new(cli.store_file));

    let store = TransactionStore::open(adapter).await;
    let vault = TokenVault::new(clock.clone());
    let lifecycle = TransactionLifecycle::new(
        store.clone(),
        vault,
        clock.clone(),
        random.clone(),
        cli.driver.into(),
    );
    let resolver = StatusResolver::new(store.clone(), lifecycle.clone(), clock, random);

    let app = router(AppState {
        store,
        lifecycle,
        resolver,
    });

    let listener = TcpListener::bind(("0.0.0.0", cli.port))
        .await
        .into_diagnostic()?;
    tracing::info!(port = cli.port, "mock datafono listening");

    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}
