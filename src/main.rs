use clap::Parser;

#[derive(Parser)]
#[command(author, version, about)]
struct Arguments {
    /// Log directive, using the tracing env-filter syntax.
    #[arg(
        long,
        env = "LOG",
        default_value = "app_creator=info,app_creator_storage=info,tower_http=info"
    )]
    log: String,
    /// Disable colors in the logs.
    #[arg(long, env = "LOG_NO_COLOR")]
    no_color: bool,
    #[command(subcommand)]
    action: app_creator::action::Action,
}

#[tokio::main]
async fn main() {
    let args = Arguments::parse();
    if let Err(err) = app_creator::init_logs(&args.log, !args.no_color) {
        eprintln!("unable to initialize logs: {err}");
    }
    if let Err(err) = args.action.execute().await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
