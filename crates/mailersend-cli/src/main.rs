use clap::Parser;
use mailersend_core::api::transport::set_user_agent;
use mailersend_core::core::services::client_factory::InvocationContext;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::dispatcher::Dispatcher;
use cli::main_types::Cli;

/// `RUST_LOG` wins; otherwise warnings only, plus library debug output
/// with `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,mailersend_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    set_user_agent(concat!("mailersend/", env!("CARGO_PKG_VERSION")));
    init_logging(cli.verbose);

    let ctx = InvocationContext {
        profile: cli.profile,
        verbose: cli.verbose,
        json: cli.json,
        config_dir: cli.config_dir,
    };

    // Create dispatcher
    let dispatcher = Dispatcher::new(ctx);

    // Execute the command
    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{}", e);
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}
