use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tileops_core::config::{Config, WarnLevel};
use tileops_core::dashboard::Dashboard;
use tileops_core::model::Profile;
use tileops_core::store;

/// Flags every command shares.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub json: bool,
    pub profile: Option<String>,
    pub config: Option<PathBuf>,
    pub today: Option<NaiveDate>,
}

/// Everything a data command needs: the dashboard over the configured store
/// and the date to render against.
pub struct Context {
    pub dashboard: Dashboard,
    pub today: NaiveDate,
    pub json: bool,
    profile: Option<String>,
}

/// Config file from `--config`, or `tileops.yaml` in the working directory,
/// overlaid with the environment.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::resolve(explicit, &cwd).context("failed to load config")?;
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => tracing::error!("{}", w.message),
        }
    }
    Ok(config)
}

impl Context {
    pub fn load(args: &GlobalArgs) -> anyhow::Result<Self> {
        let config = load_config(args.config.as_deref())?;
        let store = store::open(&config).context("failed to open job store")?;
        Ok(Self {
            dashboard: Dashboard::new(store),
            today: args.today.unwrap_or_else(|| Local::now().date_naive()),
            json: args.json,
            profile: args.profile.clone(),
        })
    }

    /// The profile named by `--as`; the demo owner when omitted in demo mode.
    pub fn actor(&self) -> anyhow::Result<Profile> {
        self.dashboard
            .resolve_actor(self.profile.as_deref())
            .context("cannot act as the requested profile (pass --as <profile-id>)")
    }
}
