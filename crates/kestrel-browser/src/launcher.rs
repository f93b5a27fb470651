use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Launches a Chrome process bound to one profile's data directory
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    debugging_port: u16,
    headless: bool,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher for the given DevTools port
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, debugging_port: u16) -> Self {
        Self {
            chrome_path,
            profile_path,
            debugging_port,
            headless: false,
        }
    }

    /// Run Chrome headless (for server deployments without a display)
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Launch the Chrome process, detached from our stdio
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();

        tracing::debug!(
            chrome = %self.chrome_path.display(),
            port = self.debugging_port,
            "launching Chrome"
        );

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--user-data-dir={}", self.profile_path.display()),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args.push("about:blank".to_string());

        args
    }

    /// Get the DevTools port this launcher binds
    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}
