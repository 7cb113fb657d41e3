//! Build automation tasks for the quarry workspace.
//!
//! Run with `cargo xtask <command>`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for quarry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all checks (format, lint, test, docs)
    Ci,
    /// Run cargo fmt --check
    Fmt,
    /// Run clippy on every target
    Clippy,
    /// Run tests, optionally for a single crate
    Test {
        /// Only test this package (e.g. quarry-pool)
        #[arg(short, long)]
        package: Option<String>,
        /// RUST_LOG filter for the test subscriber
        #[arg(long)]
        log: Option<String>,
    },
    /// Run the property tests with more cases
    Proptest {
        /// Number of cases per property
        #[arg(long, default_value_t = 10_000)]
        cases: u32,
    },
    /// Generate documentation
    Doc {
        /// Open the docs in a browser
        #[arg(long)]
        open: bool,
    },
    /// Look for unused dependencies (requires cargo-machete)
    Machete,
    /// Clean build artifacts
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let workspace_root = workspace_root()?;
    sh.change_dir(&workspace_root);

    match cli.command {
        Command::Ci => {
            println!("Running CI checks...");
            fmt(&sh)?;
            clippy(&sh)?;
            test(&sh, None, None)?;
            doc(&sh, false)?;
            println!("All CI checks passed!");
        }
        Command::Fmt => fmt(&sh)?,
        Command::Clippy => clippy(&sh)?,
        Command::Test { package, log } => test(&sh, package.as_deref(), log.as_deref())?,
        Command::Proptest { cases } => proptest(&sh, cases)?,
        Command::Doc { open } => doc(&sh, open)?,
        Command::Machete => machete(&sh)?,
        Command::Clean => clean(&sh)?,
    }

    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("failed to run cargo locate-project")?;

    let path = String::from_utf8(output.stdout)
        .context("invalid UTF-8 in cargo output")?
        .trim()
        .to_string();

    Ok(PathBuf::from(path)
        .parent()
        .context("failed to get workspace root")?
        .to_path_buf())
}

fn fmt(sh: &Shell) -> Result<()> {
    println!("Checking formatting...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    println!("Formatting check passed.");
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    println!("Running clippy...");
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    println!("Clippy check passed.");
    Ok(())
}

fn test(sh: &Shell, package: Option<&str>, log: Option<&str>) -> Result<()> {
    let _log = log.map(|filter| sh.push_env("RUST_LOG", filter));
    match package {
        Some(package) => {
            println!("Running tests for {package}...");
            cmd!(sh, "cargo test -p {package}").run()?;
        }
        None => {
            println!("Running tests...");
            cmd!(sh, "cargo test --workspace").run()?;
        }
    }
    println!("All tests passed.");
    Ok(())
}

fn proptest(sh: &Shell, cases: u32) -> Result<()> {
    println!("Running property tests with {cases} cases...");
    let _cases = sh.push_env("PROPTEST_CASES", cases.to_string());
    cmd!(sh, "cargo test -p quarry-pool sizer").run()?;
    println!("Property tests passed.");
    Ok(())
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    println!("Generating documentation...");
    let open = open.then_some("--open");
    cmd!(sh, "cargo doc --workspace --no-deps {open...}").run()?;
    println!("Documentation generated.");
    Ok(())
}

fn machete(sh: &Shell) -> Result<()> {
    println!("Checking for unused dependencies...");
    cmd!(sh, "cargo machete").run()?;
    println!("No unused dependencies.");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("Cleaning build artifacts...");
    cmd!(sh, "cargo clean").run()?;
    println!("Clean complete.");
    Ok(())
}
