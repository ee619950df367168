//! Lemu - CLI
//!
//! Runs the built-in demo programs against the process console.

mod demos;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lemu_core::{VirtualMachine, VmConfig};
use lemu_host::ConsoleHost;

use demos::Demo;

// deepest nesting the main thread's stack is expected to hold
const MAX_CALL_DEPTH_CAP: i64 = 1024;

#[derive(Parser, Debug)]
#[command(name = "lemu")]
#[command(about = "Minimal managed-bytecode interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in demo programs
    List,

    /// Run a demo program on this console
    Run {
        demo: Demo,

        /// Fail on calls to native members outside the allow-list
        #[arg(long)]
        strict_natives: bool,

        /// Maximum interpreted call depth; each level uses host stack, so it is capped
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_CALL_DEPTH_CAP))]
        max_call_depth: Option<u32>,

        /// Maximum evaluation stack size per frame
        #[arg(long)]
        max_stack: Option<usize>,

        /// Write the terminal title escape on set_Title
        #[arg(long)]
        title_escape: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lemu=info,lemu_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli.command).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::List => {
            for demo in Demo::ALL {
                println!("{:<10} {}", demo.name(), demo.summary());
            }
            Ok(())
        }
        Command::Run {
            demo,
            strict_natives,
            max_call_depth,
            max_stack,
            title_escape,
        } => {
            let mut config = VmConfig::new();
            config.strict_natives = strict_natives;
            if let Some(depth) = max_call_depth {
                config.max_call_depth = depth as usize;
            }
            if let Some(size) = max_stack {
                config.max_stack_size = size;
            }
            run(demo, config, title_escape).await
        }
    }
}

async fn run(demo: Demo, config: VmConfig, title_escape: bool) -> Result<()> {
    let program = demo
        .build()
        .with_context(|| format!("failed to assemble demo '{}'", demo.name()))?;
    info!(demo = demo.name(), methods = program.len(), "running");

    let host = ConsoleHost::stdio().with_title_escape(title_escape);
    let mut vm = VirtualMachine::new(config, host);
    let result = vm
        .run(&program)
        .await
        .with_context(|| format!("demo '{}' aborted", demo.name()))?;

    if let Some(value) = result {
        println!("{}", value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with_depth(depth: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(["lemu", "run", "factorial", "--max-call-depth", depth])
    }

    #[test]
    fn call_depth_flag_is_bounded() {
        let cli = run_with_depth("64").unwrap();
        assert!(matches!(
            cli.command,
            Command::Run { max_call_depth: Some(64), .. }
        ));
        assert!(run_with_depth("100000").is_err());
        assert!(run_with_depth("0").is_err());
    }
}
