use anyhow::{Context, Result, anyhow};
use kestrel_browser::{CdpProfile, ProfileDir};
use kestrel_server::{AppState, PROFILE_HEADER, ProfileRegistry};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub fn execute(
    port: u16,
    profiles: Vec<String>,
    chrome_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    ephemeral: bool,
    headless: bool,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut registry = ProfileRegistry::new();

        for spec in &profiles {
            let (name, cdp_port) = parse_profile_spec(spec)?;

            let dir = if ephemeral {
                ProfileDir::ephemeral()?
            } else if let Some(root) = &data_dir {
                ProfileDir::persistent(root.join(&name))?
            } else {
                ProfileDir::named(&name)?
            };

            tracing::info!(
                profile = %name,
                cdp_port,
                data_dir = %dir.path().display(),
                "registering profile"
            );

            let profile =
                CdpProfile::new(&name, cdp_port, chrome_path.clone(), dir).headless(headless);
            registry.insert(name, Arc::new(profile));
        }

        let app = kestrel_server::router(AppState::new(Arc::new(registry)));

        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!(%addr, "tab API listening");
        println!("✓ Kestrel listening on http://{}", addr);
        println!("  Select a profile per request with the {} header", PROFILE_HEADER);
        println!();
        println!("Press Ctrl+C to stop...");

        axum::serve(listener, app).await?;

        Ok(())
    })
}

/// Parse a NAME=DEVTOOLS_PORT profile spec
fn parse_profile_spec(spec: &str) -> Result<(String, u16)> {
    let (name, port) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid profile spec '{}', expected NAME=PORT", spec))?;

    if name.is_empty() {
        return Err(anyhow!("Invalid profile spec '{}', name is empty", spec));
    }

    let port: u16 = port
        .trim()
        .parse()
        .with_context(|| format!("Invalid DevTools port in profile spec '{}'", spec))?;

    Ok((name.to_string(), port))
}
