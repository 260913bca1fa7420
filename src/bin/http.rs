#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use clap::Parser;
    use timetable_tool::persistence::DEFAULT_CONFIG_PATH;
    use timetable_tool::{JsonFileStore, Session, http_api};
    use tracing::warn;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    #[derive(Debug, Parser)]
    #[command(name = "http", about = "Weekly timetable editor over HTTP")]
    struct Args {
        #[arg(long, env = "TIMETABLE_HTTP_ADDR", default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
        #[arg(long, env = "TIMETABLE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("timetable_tool=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let (session, load_error) = Session::open(JsonFileStore::new(&args.config));
    if let Some(err) = load_error {
        warn!(error = %err, "configuration not loaded, serving defaults");
    }

    println!("timetable-tool HTTP API listening on http://{}", args.addr);
    http_api::serve(args.addr, session).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
