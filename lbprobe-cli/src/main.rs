//! entrypoint for lbprobe-cli

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

use clap::{Parser, Subcommand};

pub mod cmd;
use self::cmd::{cert, sample, send, serve, upstreams};

pub mod trace;

#[derive(Debug, Parser)]
#[command(name = "lbprobe")]
#[command(bin_name = "lbprobe")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmds: CliCommands,

    /// enable debug logs for tracing (possible via RUST_LOG env as well)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    Sample(sample::CliCommandSample),
    Cert(cert::CliCommandCert),
    Serve(serve::CliCommandServe),
    Upstreams(upstreams::CliCommandUpstreams),
    Send(send::CliCommandSend),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[expect(clippy::exit)]
    if let Err(err) = run(cli).await {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), lbprobe_core::error::BoxError> {
    trace::init_tracing(cli.verbose)?;

    match cli.cmds {
        CliCommands::Sample(cfg) => sample::run(cfg).await,
        CliCommands::Cert(cfg) => cert::run(cfg).await,
        CliCommands::Serve(cfg) => serve::run(cfg).await,
        CliCommands::Upstreams(cfg) => upstreams::run(cfg).await,
        CliCommands::Send(cfg) => send::run(cfg).await,
    }
}
