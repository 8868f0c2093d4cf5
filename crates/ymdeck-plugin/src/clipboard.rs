//! System clipboard through the platform's command-line tools.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use crate::error::PluginError;

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), PluginError>;
}

type Tool = (&'static str, &'static [&'static str]);

const MACOS_TOOLS: &[Tool] = &[("pbcopy", &[])];
const WINDOWS_TOOLS: &[Tool] = &[("clip", &[])];
const UNIX_TOOLS: &[Tool] = &[("wl-copy", &[]), ("xclip", &["-selection", "clipboard"])];

/// `pbcopy` on macOS, `clip` on Windows, `wl-copy` or `xclip` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn commands() -> &'static [Tool] {
        if cfg!(target_os = "macos") {
            MACOS_TOOLS
        } else if cfg!(windows) {
            WINDOWS_TOOLS
        } else {
            UNIX_TOOLS
        }
    }

    /// `clip` reads UTF-16LE; everything else takes UTF-8.
    fn encode(text: &str) -> Vec<u8> {
        if cfg!(windows) {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else {
            text.as_bytes().to_vec()
        }
    }

    async fn pipe(program: &str, args: &[&str], input: &[u8]) -> Result<(), PluginError> {
        let mut child = Command::new(program)
            .args(args)
            .env("LANG", "en_US.UTF-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input).await?;
        }
        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(PluginError::Clipboard(format!("{} exited with {}", program, status)))
        }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), PluginError> {
        let input = Self::encode(text);
        let mut last_error = PluginError::Clipboard("no clipboard tool".to_string());
        for (program, args) in Self::commands() {
            match Self::pipe(program, args, &input).await {
                Ok(()) => {
                    info!(program, "Copied to clipboard");
                    return Ok(());
                }
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding() {
        let bytes = SystemClipboard::encode("Ая");
        if cfg!(windows) {
            assert_eq!(bytes, vec![0x10, 0x04, 0x4F, 0x04]);
        } else {
            assert_eq!(bytes, "Ая".as_bytes());
        }
    }

    #[test]
    fn test_has_a_command() {
        assert!(!SystemClipboard::commands().is_empty());
    }
}
