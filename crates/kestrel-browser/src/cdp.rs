use crate::{ChromeFinder, ChromeLauncher, Error, ProfileContext, ProfileDir, Result, Tab};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const CONNECT_RETRIES: u32 = 3;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(250);
const STARTUP_POLL_ATTEMPTS: u32 = 40;
const STARTUP_POLL_DELAY: Duration = Duration::from_millis(250);
const STARTUP_PROBE_TIMEOUT: Duration = Duration::from_millis(300);

/// One browser profile controlled over the Chrome DevTools Protocol.
///
/// Each operation opens a fresh CDP connection, runs a single command
/// sequence, and disconnects. Operations against the same profile are
/// serialized through an internal mutex.
pub struct CdpProfile {
    name: String,
    cdp_port: u16,
    chrome_path: Option<PathBuf>,
    data_dir: ProfileDir,
    headless: bool,
    // CDP command sequences for one profile must not interleave
    ops: Mutex<()>,
}

impl CdpProfile {
    /// Create a profile bound to a DevTools port and data directory
    pub fn new(
        name: impl Into<String>,
        cdp_port: u16,
        chrome_path: Option<PathBuf>,
        data_dir: ProfileDir,
    ) -> Self {
        Self {
            name: name.into(),
            cdp_port,
            chrome_path,
            data_dir,
            headless: false,
            ops: Mutex::new(()),
        }
    }

    /// Launch Chrome headless when this profile has to start it
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DevTools port this profile talks to
    pub fn cdp_port(&self) -> u16 {
        self.cdp_port
    }

    async fn probe(&self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, TcpStream::connect(("127.0.0.1", self.cdp_port))).await,
            Ok(Ok(_))
        )
    }

    /// Connect to Chrome and spawn the CDP handler loop.
    ///
    /// The handler task must be running before any command is issued, and
    /// must be aborted once the operation completes.
    async fn connect(&self) -> Result<(Browser, JoinHandle<()>)> {
        let endpoint = format!("http://127.0.0.1:{}", self.cdp_port);

        let (browser, mut handler) = {
            let mut retries = CONNECT_RETRIES;
            loop {
                match Browser::connect(&endpoint).await {
                    Ok(result) => break result,
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome on port {}: {}",
                                self.cdp_port, e
                            )));
                        }
                        tracing::debug!(
                            profile = %self.name,
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    }
                }
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Some CDP events are not fully parseable; keep going
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn find_page(&self, browser: &Browser, target_id: &str) -> Result<Page> {
        for page in browser.pages().await? {
            if page.target_id().inner() == target_id {
                return Ok(page);
            }
        }
        Err(Error::TabNotFound(target_id.to_string()))
    }

    async fn tab_for(page: &Page) -> Tab {
        let mut tab = Tab::new(page.target_id().inner().to_string());
        tab.url = page.url().await.ok().flatten();
        tab.title = page.get_title().await.ok().flatten();
        tab
    }

    fn normalize_url(url: &str) -> String {
        if url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with("about:")
            || url.starts_with("chrome://")
        {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }
}

#[async_trait]
impl ProfileContext for CdpProfile {
    async fn is_reachable(&self, timeout: Duration) -> bool {
        self.probe(timeout).await
    }

    async fn ensure_browser_available(&self) -> Result<()> {
        let _guard = self.ops.lock().await;

        if self.probe(STARTUP_PROBE_TIMEOUT).await {
            return Ok(());
        }

        let chrome = ChromeFinder::new(self.chrome_path.clone()).find()?;
        let launcher = ChromeLauncher::new(
            chrome,
            self.data_dir.path().to_path_buf(),
            self.cdp_port,
        )
        .headless(self.headless);

        let child = launcher.launch()?;
        tracing::info!(
            profile = %self.name,
            pid = child.id(),
            port = self.cdp_port,
            "Chrome started"
        );

        for _ in 0..STARTUP_POLL_ATTEMPTS {
            if self.probe(STARTUP_PROBE_TIMEOUT).await {
                return Ok(());
            }
            tokio::time::sleep(STARTUP_POLL_DELAY).await;
        }

        Err(Error::NotReachable(self.cdp_port))
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        let _guard = self.ops.lock().await;
        let (browser, handler_task) = self.connect().await?;

        let result = async {
            let mut tabs = Vec::new();
            for page in browser.pages().await? {
                tabs.push(Self::tab_for(&page).await);
            }
            Ok(tabs)
        }
        .await;

        handler_task.abort();
        result
    }

    async fn open_tab(&self, url: &str) -> Result<Tab> {
        let _guard = self.ops.lock().await;
        let (browser, handler_task) = self.connect().await?;

        let url = Self::normalize_url(url);
        let result = async {
            let page = browser.new_page(url.as_str()).await?;
            Ok(Self::tab_for(&page).await)
        }
        .await;

        handler_task.abort();
        result
    }

    async fn focus_tab(&self, target_id: &str) -> Result<()> {
        let _guard = self.ops.lock().await;
        let (browser, handler_task) = self.connect().await?;

        let result = async {
            let page = self.find_page(&browser, target_id).await?;
            page.bring_to_front().await?;
            Ok(())
        }
        .await;

        handler_task.abort();
        result
    }

    async fn close_tab(&self, target_id: &str) -> Result<()> {
        let _guard = self.ops.lock().await;
        let (browser, handler_task) = self.connect().await?;

        let result = async {
            let page = self.find_page(&browser, target_id).await?;
            page.close().await?;
            Ok(())
        }
        .await;

        handler_task.abort();
        result
    }
}
