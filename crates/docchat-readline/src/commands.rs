//! REPL command parsing.

/// Slash commands offered for completion.
pub const COMMAND_NAMES: &[&str] = &[
    "/url", "/fetch", "/pick", "/id", "/create", "/details", "/delete", "/selected", "/send",
    "/help",
];

pub const HELP_TEXT: &str = "\
Commands:
  /url [new]           show or change the backend base URL
  /fetch               fetch a random sample of documents
  /pick <n | key>      pick a fetched document by index or \"id - url\" key
  /id <id>             pick a document by id
  /create              create a conversation bound to the picked document
  /details             show the active conversation
  /delete              delete the active conversation
  /selected            list documents selected this session
  /send <text>         send a message (any line not starting with / does the same)
  quit | exit          leave

Ctrl-C interrupts a running request or reply; it does not exit the shell.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickTarget {
    Index(usize),
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Url(Option<String>),
    Fetch,
    Pick(PickTarget),
    Id(String),
    Create,
    Details,
    Delete,
    Selected,
    Send(String),
    Help,
    Quit,
    /// A command that is malformed or unknown, with the text to show.
    Invalid(String),
}

impl Command {
    /// Parses one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        if line == "quit" || line == "exit" {
            return Self::Quit;
        }
        if !line.starts_with('/') {
            return Self::Send(line.to_string());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/url" if rest.is_empty() => Self::Url(None),
            "/url" => Self::Url(Some(rest.to_string())),
            "/fetch" => Self::Fetch,
            "/pick" if rest.is_empty() => {
                Self::Invalid("Usage: /pick <index | \"id - url\">".into())
            }
            "/pick" => Self::Pick(match rest.parse::<usize>() {
                Ok(index) => PickTarget::Index(index),
                Err(_) => PickTarget::Key(rest.trim_matches('"').to_string()),
            }),
            "/id" if rest.is_empty() => Self::Invalid("Usage: /id <document id>".into()),
            "/id" => Self::Id(rest.to_string()),
            "/create" => Self::Create,
            "/details" => Self::Details,
            "/delete" => Self::Delete,
            "/selected" => Self::Selected,
            "/send" if rest.is_empty() => Self::Invalid("Usage: /send <text>".into()),
            "/send" => Self::Send(rest.to_string()),
            "/help" => Self::Help,
            other => Self::Invalid(format!(
                "Unknown command: {}. Type /help for commands.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            Command::parse("what is this paper about?"),
            Command::Send("what is this paper about?".to_string())
        );
    }

    #[test]
    fn test_quit_aliases() {
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("exit"), Command::Quit);
    }

    #[test]
    fn test_url_with_and_without_argument() {
        assert_eq!(Command::parse("/url"), Command::Url(None));
        assert_eq!(
            Command::parse("/url  http://backend:9000 "),
            Command::Url(Some("http://backend:9000".to_string()))
        );
    }

    #[test]
    fn test_pick_by_index_or_key() {
        assert_eq!(Command::parse("/pick 2"), Command::Pick(PickTarget::Index(2)));
        assert_eq!(
            Command::parse("/pick \"3 - https://example.com/3.pdf\""),
            Command::Pick(PickTarget::Key("3 - https://example.com/3.pdf".to_string()))
        );
        assert!(matches!(Command::parse("/pick"), Command::Invalid(_)));
    }

    #[test]
    fn test_send_alias_keeps_text() {
        assert_eq!(
            Command::parse("/send hello world"),
            Command::Send("hello world".to_string())
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            Command::parse("/plan"),
            Command::Invalid(msg) if msg.contains("/plan")
        ));
    }

    #[test]
    fn test_help_mentions_ctrl_c_interrupts() {
        assert!(HELP_TEXT.contains("Ctrl-C interrupts a running request or reply"));
    }

    #[test]
    fn test_every_named_command_parses() {
        for name in COMMAND_NAMES {
            let line = format!("{} 1", name);
            assert!(
                !matches!(Command::parse(&line), Command::Invalid(_)),
                "{} should be recognised",
                name
            );
        }
    }
}
