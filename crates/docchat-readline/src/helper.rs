use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::COMMAND_NAMES;

const PICK_PREFIX: &str = "/pick ";
const URL_PREFIX: &str = "/url ";

/// Rustyline helper for the DocChat shell.
///
/// Completes slash commands, `/pick` arguments from the last fetched sample,
/// and hints the current base URL after `/url`. The REPL refreshes the
/// session-derived data with [`CliHelper::sync`] after every command.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    base_url: String,
    document_keys: Vec<String>,
}

impl CliHelper {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|cmd| cmd.to_string()).collect(),
            base_url: base_url.into(),
            document_keys: Vec::new(),
        }
    }

    pub fn sync(&mut self, base_url: &str, document_keys: Vec<String>) {
        self.base_url = base_url.to_string();
        self.document_keys = document_keys;
    }

    /// Start offset and replacement candidates for the text before the cursor.
    fn completions(&self, line: &str) -> (usize, Vec<String>) {
        if line.starts_with('/') && !line.contains(' ') {
            let commands = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .cloned()
                .collect();
            return (0, commands);
        }

        if let Some((start, arg)) = argument(line, PICK_PREFIX) {
            let keys = self
                .document_keys
                .iter()
                .filter(|key| key.starts_with(arg))
                .cloned()
                .collect();
            return (start, keys);
        }

        if let Some((start, arg)) = argument(line, URL_PREFIX) {
            if self.base_url.starts_with(arg) {
                return (start, vec![self.base_url.clone()]);
            }
        }

        (0, Vec::new())
    }

    /// Inline suffix suggested for the text before the cursor.
    fn hint_for(&self, line: &str) -> Option<String> {
        if line.starts_with('/') && !line.contains(' ') {
            return self
                .commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string());
        }

        let (_, arg) = argument(line, URL_PREFIX)
            .or_else(|| argument(line, PICK_PREFIX))?;
        let candidates: &[String] = if line.starts_with(URL_PREFIX) {
            std::slice::from_ref(&self.base_url)
        } else {
            &self.document_keys
        };
        candidates
            .iter()
            .find(|value| value.starts_with(arg) && value.len() > arg.len())
            .map(|value| value[arg.len()..].to_string())
    }
}

/// Splits `line` after `prefix`, returning the argument's byte offset and text.
fn argument<'l>(line: &'l str, prefix: &str) -> Option<(usize, &'l str)> {
    let rest = line.strip_prefix(prefix)?;
    let arg = rest.trim_start();
    Some((line.len() - arg.len(), arg))
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.completions(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.split_once(' ') {
            Some((name, rest)) if name.starts_with('/') => {
                Owned(format!("{} {}", name.bright_cyan(), rest))
            }
            None if line.starts_with('/') => Owned(line.bright_cyan().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.hint_for(&line[..pos])
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CliHelper {
        let mut helper = CliHelper::new("http://localhost:8000");
        helper.sync(
            "http://localhost:8000",
            vec![
                "3 - https://example.com/3.pdf".to_string(),
                "12 - https://example.com/12.pdf".to_string(),
                "31 - https://example.com/31.pdf".to_string(),
            ],
        );
        helper
    }

    #[test]
    fn test_completes_command_names() {
        let (start, candidates) = helper().completions("/de");
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["/details", "/delete"]);
    }

    #[test]
    fn test_completes_pick_argument_from_document_keys() {
        let (start, candidates) = helper().completions("/pick 3");
        assert_eq!(start, "/pick ".len());
        assert_eq!(
            candidates,
            vec!["3 - https://example.com/3.pdf", "31 - https://example.com/31.pdf"]
        );
    }

    #[test]
    fn test_pick_completion_is_empty_before_fetch() {
        let helper = CliHelper::new("http://localhost:8000");
        assert!(helper.completions("/pick ").1.is_empty());
    }

    #[test]
    fn test_sync_replaces_keys_and_base_url() {
        let mut helper = helper();
        helper.sync("https://docs.example.com", vec!["7 - https://x/7".to_string()]);

        assert_eq!(helper.completions("/pick ").1, vec!["7 - https://x/7"]);
        assert_eq!(helper.completions("/url ").1, vec!["https://docs.example.com"]);
    }

    #[test]
    fn test_url_hint_shows_current_base_url() {
        let helper = helper();
        assert_eq!(helper.hint_for("/url "), Some("http://localhost:8000".to_string()));
        assert_eq!(helper.hint_for("/url http://local"), Some("host:8000".to_string()));
        assert_eq!(helper.hint_for("/url https://other"), None);
    }

    #[test]
    fn test_command_and_pick_hints() {
        let helper = helper();
        assert_eq!(helper.hint_for("/fe"), Some("tch".to_string()));
        assert_eq!(
            helper.hint_for("/pick 12"),
            Some(" - https://example.com/12.pdf".to_string())
        );
        assert_eq!(helper.hint_for("hello"), None);
    }
}
