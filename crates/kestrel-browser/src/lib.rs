mod cdp;
mod chrome_finder;
mod context;
mod error;
mod launcher;
mod profile_dir;

pub use cdp::CdpProfile;
pub use chrome_finder::ChromeFinder;
pub use context::{ProfileContext, Tab};
pub use error::{Error, Result};
pub use launcher::ChromeLauncher;
pub use profile_dir::ProfileDir;
