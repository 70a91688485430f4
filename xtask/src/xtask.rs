use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use xshell::{Shell, cmd};

#[derive(Debug, Parser)]
struct XTask {
    #[clap(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format, build, test, and lint.
    CI,

    /// Run benchmarks.
    Bench {
        /// Additional arguments.
        #[arg(action(ArgAction::Append), allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// CLI benchmarks with Hyperfine.
    BenchCli {
        /// The subcommand to benchmark.
        #[arg(value_enum)]
        target: BenchmarkTarget,

        /// Don't use git to stash and restore changes.
        #[arg(long)]
        no_stash: bool,

        /// The input size to benchmark, in MiB.
        #[arg(long, default_value = "64")]
        size: u64,
    },
}

#[derive(Clone, Debug, ValueEnum)]
enum BenchmarkTarget {
    Encrypt,
    Seal,
    Stream,
}

fn main() -> Result<()> {
    let xtask = XTask::parse();

    let sh = Shell::new()?;
    sh.change_dir(project_root()?);

    match xtask.cmd.unwrap_or(Command::CI) {
        Command::CI => ci(&sh),
        Command::Bench { args } => bench(&sh, args),
        Command::BenchCli { target, no_stash, size } => bench_cli(&sh, target, no_stash, size),
    }
}

fn ci(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo fmt --check").run()?;
    cmd!(sh, "cargo build --all-targets --all-features").run()?;
    cmd!(sh, "cargo test --all-features").run()?;
    cmd!(sh, "cargo clippy --all-features --tests --benches").run()?;

    Ok(())
}

fn bench(sh: &Shell, args: Vec<String>) -> Result<()> {
    cmd!(sh, "cargo bench -p benchmarks {args...}")
        .env("DIVAN_BYTES_FORMAT", "binary")
        .env("DIVAN_TIMER", "tsc")
        .env("DIVAN_MIN_TIME", "1")
        .env("DIVAN_SKIP_EXT_TIME", "true")
        .run()?;

    Ok(())
}

const NONCE: &str = "69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37";

fn bench_cli(sh: &Shell, target: BenchmarkTarget, no_stash: bool, size: u64) -> Result<()> {
    // Convert size to bytes.
    let size = format!("{}", size * 1024 * 1024);

    // remove the old versions, if any
    cmd!(sh, "rm -f target/release/naclbox-experiment").run()?;
    cmd!(sh, "rm -f target/release/naclbox-control").run()?;

    // build the current state as release
    cmd!(sh, "cargo build --release").run()?;
    cmd!(sh, "cp target/release/naclbox target/release/naclbox-experiment").run()?;

    // stash the current state and build the last commit as release
    if !no_stash {
        cmd!(sh, "git stash").run()?;
    }
    cmd!(sh, "cargo build --release").run()?;
    cmd!(sh, "cp target/release/naclbox target/release/naclbox-control").run()?;

    // generate a key pair with the experimental build; both builds share the wire format
    let key_pair = cmd!(sh, "./target/release/naclbox-experiment keypair").read()?;
    let mut lines = key_pair.lines();
    let public_key = lines.next().context("missing public key")?.to_string();
    let private_key = lines.next().context("missing private key")?.to_string();

    let args = match target {
        BenchmarkTarget::Encrypt => {
            format!("encrypt --private-key {private_key} --public-key {public_key} --nonce {NONCE}")
        }
        BenchmarkTarget::Seal => format!("seal --key {private_key} --nonce {NONCE}"),
        BenchmarkTarget::Stream => format!("stream --key {private_key} --nonce {NONCE}"),
    };

    let control = format!("head -c {size} /dev/zero | ./target/release/naclbox-control {args} - /dev/null");
    let experiment = format!("head -c {size} /dev/zero | ./target/release/naclbox-experiment {args} - /dev/null");
    cmd!(sh, "hyperfine --warmup 10 -S /bin/bash -n control {control} -n experimental {experiment}").run()?;

    // restore the working set
    if !no_stash {
        cmd!(sh, "git stash pop").run()?;
    }

    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Ok(Path::new(
        &env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| env!("CARGO_MANIFEST_DIR").to_owned()),
    )
    .ancestors()
    .nth(1)
    .context("xtask should live one level below the workspace root")?
    .to_path_buf())
}
