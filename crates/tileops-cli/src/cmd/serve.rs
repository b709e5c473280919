use crate::context::{load_config, GlobalArgs};
use anyhow::Context as _;
use tileops_core::{content, store};
use tileops_server::AppState;

pub fn run(
    args: &GlobalArgs,
    host: Option<String>,
    port: Option<u16>,
    open_browser: bool,
) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    // The backend and CMS clients block; build them before the runtime starts
    // and keep a handle so they are dropped after it stops.
    let store = store::open(&config).context("failed to open job store")?;
    let content = content::open(&config);
    let mut app_state = AppState::new(store, content);
    if let Some(today) = args.today {
        app_state = app_state.with_today(today);
    }
    let handle = app_state.clone();

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
            .await
            .with_context(|| format!("cannot bind {host}:{port}"))?;
        let addr = listener.local_addr()?;
        println!("tileops ({}) → http://{addr}", app_state.dashboard.mode());

        tokio::select! {
            res = tileops_server::serve_on(app_state, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    });
    drop(rt);
    drop(handle);
    result
}
