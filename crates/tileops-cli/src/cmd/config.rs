use crate::context::GlobalArgs;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::PathBuf;
use tileops_core::config::{Config, WarnLevel, CONFIG_FILE};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the resolved config and report the data mode
    Check,

    /// Write a default tileops.yaml if none exists
    Init,
}

pub fn run(args: &GlobalArgs, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Check => check(args),
        ConfigSubcommand::Init => init(args),
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn check(args: &GlobalArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let source = Config::locate(args.config.as_deref(), &cwd);
    let config = Config::resolve(args.config.as_deref(), &cwd).context("failed to load config")?;
    let warnings = config.validate();

    if args.json {
        print_json(&serde_json::json!({
            "file": source,
            "mode": config.mode(),
            "cms": config.cms_url().is_some(),
            "port": config.server.port,
            "warnings": warnings,
        }))?;
    } else {
        match &source {
            Some(path) => println!("Config: {}", path.display()),
            None => println!("Config: defaults (no {CONFIG_FILE})"),
        }
        println!("Mode:   {}", config.mode());
        println!(
            "Content: {}",
            config.cms_url().unwrap_or("built-in company info")
        );
        if warnings.is_empty() {
            println!("Config is valid. No warnings.");
        }
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(args: &GlobalArgs) -> anyhow::Result<()> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let created =
        Config::init(&path).with_context(|| format!("failed to write {}", path.display()))?;

    if args.json {
        print_json(&serde_json::json!({ "path": path, "created": created }))?;
    } else if created {
        println!("Wrote {}", path.display());
        println!("Set SUPABASE_URL and SUPABASE_KEY to use live data.");
    } else {
        println!("{} already exists; left unchanged", path.display());
    }
    Ok(())
}
