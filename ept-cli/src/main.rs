mod fetch_cmd;
mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ept")]
#[command(about = "Query EPT point cloud archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one query against an EPT dataset and write a LAZ/LAS file.
    Fetch(fetch_cmd::Args),
    /// Run a small HTTP server exposing `/info/{name}` and `/read/{name}/{bounds}`.
    Serve(serve::Args),
}

// Example: RUST_LOG=debug ept fetch --url ... --bounds ... -o out.laz
//
// `main` itself is deliberately synchronous, not `#[tokio::main]`. `fetch
// --blocking` is the genuinely synchronous entry point spec.md §9 asks for
// ("two entry points, one async, one synchronous", mirroring
// `original_source`'s separate `sync_main.py`/`async_main.py` processes):
// its `BlockingEptResource` builds and `block_on`s its own Tokio runtime,
// which panics ("Cannot start a runtime from within a runtime") if the
// calling thread is already inside one. Keeping `main` plain means the
// blocking path never runs inside a runtime at all, while the async paths
// (the non-blocking fetch and the server) spin up their own runtime only
// when they need it.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) if args.blocking() => fetch_cmd::run_blocking(args),
        Commands::Fetch(args) => tokio::runtime::Runtime::new()?.block_on(fetch_cmd::run(args)),
        Commands::Serve(args) => tokio::runtime::Runtime::new()?.block_on(serve::run(args)),
    }
}
