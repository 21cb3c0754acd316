//! Per-platform opener commands

use std::path::Path;

use crate::error::PlatformError;
use crate::exec::CommandSpec;

/// Platform families with known opener commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this binary runs on
    pub fn current() -> Result<Self, PlatformError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform family
    pub fn from_os(os: &str) -> Result<Self, PlatformError> {
        match os {
            "macos" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(PlatformError::Unsupported {
                os: other.to_string(),
            }),
        }
    }

    /// Command that opens a URL in the default browser
    pub fn open_url(&self, url: &str) -> CommandSpec {
        match self {
            Platform::MacOs => CommandSpec::new("open").arg(url),
            // The empty argument is the window title `start` expects first.
            Platform::Windows => CommandSpec::new("cmd").args(["/C", "start", "", url]),
            Platform::Linux => CommandSpec::new("xdg-open").arg(url),
        }
    }

    /// Command that opens a file in a text editor
    pub fn open_text_file(&self, path: &Path) -> CommandSpec {
        let path = path.display().to_string();
        match self {
            Platform::MacOs => CommandSpec::new("open").args(["-t".to_string(), path]),
            Platform::Windows => {
                CommandSpec::new("cmd").args(["/C".to_string(), "start".to_string(), "notepad".to_string(), path])
            }
            Platform::Linux => CommandSpec::new("xdg-open").arg(path),
        }
    }

    /// Command that runs a whole command line through the platform shell
    pub fn shell(&self, line: &str) -> CommandSpec {
        match self {
            Platform::Windows => CommandSpec::new("cmd").args(["/C", line]),
            Platform::MacOs | Platform::Linux => CommandSpec::new("sh").args(["-c", line]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os() {
        assert_eq!(Platform::from_os("macos"), Ok(Platform::MacOs));
        assert_eq!(Platform::from_os("windows"), Ok(Platform::Windows));
        assert_eq!(Platform::from_os("linux"), Ok(Platform::Linux));
        assert_eq!(
            Platform::from_os("freebsd"),
            Err(PlatformError::Unsupported {
                os: "freebsd".to_string()
            })
        );
    }

    #[test]
    fn test_open_url_table() {
        let url = "https://github.com/octocat/hello";
        assert_eq!(Platform::MacOs.open_url(url).to_string(), format!("open {}", url));
        assert_eq!(Platform::Linux.open_url(url).to_string(), format!("xdg-open {}", url));
        assert_eq!(
            Platform::Windows.open_url(url).args,
            vec!["/C", "start", "", url]
        );
    }

    #[test]
    fn test_open_text_file_table() {
        let path = Path::new("/home/me/.config/repokeeper/config.yml");
        assert_eq!(
            Platform::MacOs.open_text_file(path).args,
            vec!["-t", "/home/me/.config/repokeeper/config.yml"]
        );
        assert_eq!(Platform::Windows.open_text_file(path).args[2], "notepad");
        assert_eq!(Platform::Linux.open_text_file(path).program, "xdg-open");
    }

    #[test]
    fn test_shell() {
        assert_eq!(Platform::Linux.shell("code /x").args, vec!["-c", "code /x"]);
        assert_eq!(Platform::Windows.shell("code /x").program, "cmd");
    }
}
