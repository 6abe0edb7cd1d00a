use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use user_records::domain::ports::{Confirmer, Notice, NoticeLevel, Notifier};

/// Success notices go to stdout, errors to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
}

/// Asks on the terminal; anything but an explicit yes declines.
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        match prompt_line(&format!("{prompt} [y/N]")).await {
            Ok(answer) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read confirmation, declining: {e:#}");
                false
            }
        }
    }
}

/// Confirms everything (`--yes` / `ui.assume_yes`).
pub struct AutoConfirmer;

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Auto-confirmed: {prompt}");
        true
    }
}

/// Print `label: ` and read one line from stdin without blocking the runtime.
/// End of input yields an empty string.
pub async fn prompt_line(label: &str) -> Result<String> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{label}: ")?;
        stdout.flush()?;

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await
    .context("stdin reader task failed")?
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
