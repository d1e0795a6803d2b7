use log::debug;
use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::AppError;

pub trait SpeechService {
    fn speak(&self, text: &str) -> impl Future<Output = Result<(), AppError>>;
}

/// Speaks through an external synthesiser that reads the text from stdin.
/// The text never reaches the argument list, so it cannot be taken for an
/// option.
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn espeak() -> Self {
        Self::new("espeak", &["--stdin"])
    }
}

impl SpeechService for CommandSpeech {
    async fn speak(&self, text: &str) -> Result<(), AppError> {
        debug!("speaking {} chars via {}", text.len(), self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Speech(format!("run {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Speech(format!("{} stdin unavailable", self.program)))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| AppError::Speech(format!("write to {}: {e}", self.program)))?;
        // closing stdin marks the end of the text
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| AppError::Speech(format!("wait for {}: {e}", self.program)))?;
        if !status.success() {
            return Err(AppError::Speech(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}
