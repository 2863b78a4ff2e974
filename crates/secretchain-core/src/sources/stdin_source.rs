//! Interactive prompt source

use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use serde::Deserialize;

use super::traits::{require_non_empty, SecretGetter, SecretSource, SourceResult, TypedConfig};
use crate::types::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the `stdin` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StdinConfig {
    /// Text shown before reading, followed by `": "`
    pub prompt: String,
}

impl StdinConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl TypedConfig for StdinConfig {
    const TYPE: &'static str = "stdin";
}

impl fmt::Display for StdinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("prompt")
    }
}

/// Reads one secret line given the prompt text
pub type PromptReader = Arc<dyn Fn(&str, &CancellationToken) -> io::Result<String> + Send + Sync>;

/// Source that asks the user for the value
///
/// On a terminal the input is read without echo. When stdin is not a
/// terminal a single line is read from it instead. Blank input and read
/// errors count as absent.
#[derive(Clone)]
pub struct StdinSource {
    reader: PromptReader,
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinSource {
    /// Prompt on the controlling terminal
    pub fn new() -> Self {
        Self::with_reader(Arc::new(read_from_terminal))
    }

    /// Use a custom reader, e.g. to route prompts through a host UI
    pub fn with_reader(reader: PromptReader) -> Self {
        Self { reader }
    }
}

impl fmt::Debug for StdinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdinSource").finish_non_exhaustive()
    }
}

impl SecretSource for StdinSource {
    type Config = StdinConfig;

    fn description(&self) -> &'static str {
        "Prompt the user for the value"
    }

    fn getter(&self, config: &StdinConfig) -> SourceResult<SecretGetter> {
        require_non_empty("prompt", &config.prompt)?;

        let prompt = config.prompt.clone();
        let reader = Arc::clone(&self.reader);
        Ok(Box::new(move |ctx: &CancellationToken| {
            match reader(&prompt, ctx) {
                Ok(input) => {
                    let input = input.trim();
                    (!input.is_empty()).then(|| input.to_string())
                }
                Err(e) => {
                    crate::error_log!("failed to read from stdin: {}", e);
                    None
                }
            }
        }))
    }
}

fn read_from_terminal(prompt: &str, ctx: &CancellationToken) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}: ", prompt)?;
    stderr.flush()?;

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        return Ok(line);
    }

    terminal::enable_raw_mode()?;
    let result = read_masked_line(ctx);
    let restored = terminal::disable_raw_mode();
    writeln!(stderr)?;

    let line = result?;
    restored?;
    Ok(line)
}

/// Collect key presses until Enter, without echoing them
fn read_masked_line(ctx: &CancellationToken) -> io::Result<String> {
    let mut line = String::new();
    loop {
        if ctx.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "prompt cancelled"));
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "prompt aborted"));
            }
            KeyCode::Esc => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "prompt aborted"));
            }
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;

    fn source_returning(result: fn() -> io::Result<String>) -> StdinSource {
        StdinSource::with_reader(Arc::new(move |_prompt: &str, _ctx: &CancellationToken| result()))
    }

    fn prompt_once(source: &StdinSource) -> Option<String> {
        let getter = source.getter(&StdinConfig::new("Insert the password")).unwrap();
        getter(&CancellationToken::new())
    }

    #[test]
    fn test_stdin_config_display_hides_prompt() {
        assert_eq!(StdinConfig::new("Insert the password").to_string(), "prompt");
    }

    #[test]
    fn test_stdin_empty_prompt_rejected() {
        let err = StdinSource::new().getter(&StdinConfig::new("")).err().unwrap();
        assert_eq!(err, SourceError::EmptyField("prompt"));
        assert_eq!(err.to_string(), "prompt cannot be empty");
    }

    #[test]
    fn test_stdin_empty_input_is_absent() {
        assert_eq!(prompt_once(&source_returning(|| Ok(String::new()))), None);
    }

    #[test]
    fn test_stdin_space_only_input_is_absent() {
        assert_eq!(prompt_once(&source_returning(|| Ok(" ".to_string()))), None);
    }

    #[test]
    fn test_stdin_valid_input() {
        assert_eq!(
            prompt_once(&source_returning(|| Ok("my_password\n".to_string()))),
            Some("my_password".to_string())
        );
    }

    #[test]
    fn test_stdin_read_error_is_absent() {
        let source = source_returning(|| Err(io::Error::new(io::ErrorKind::Other, "invalid input")));
        assert_eq!(prompt_once(&source), None);
    }

    #[test]
    fn test_stdin_reader_receives_prompt() {
        let source = StdinSource::with_reader(Arc::new(|prompt: &str, _ctx: &CancellationToken| {
            Ok(format!("answer to {}", prompt))
        }));
        assert_eq!(
            prompt_once(&source),
            Some("answer to Insert the password".to_string())
        );
    }
}
