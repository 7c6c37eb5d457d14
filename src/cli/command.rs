use std::path::PathBuf;

/// One line of input in a chat session
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Plain text: send it as the next user message.
    Say(String),
    /// Toggle selection of the n-th transcript message (1-based).
    Select(usize),
    CancelSelection,
    Synthesize(String),
    Notes,
    /// Replace the reflection of the n-th note (1-based).
    Reflect(usize, String),
    Forget(usize),
    Delete(usize),
    Log,
    Pick(f64, f64),
    Graph(PathBuf),
    Resize(u32, u32),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

pub const HELP: &str = "\
Type a message to continue the dialogue. Commands:
  /log                      show the transcript with message numbers
  /select <n>               toggle message n in the selection
  /cancel                   clear the selection
  /synthesize <reflection>  turn the selection into a note
  /notes                    list notes
  /reflect <note> <text>    rewrite a note's reflection
  /forget <note>            delete a note
  /delete <n>               delete message n
  /pick <x> <y>             focus the graph node under a point
  /graph <path>             write the graph as PNG
  /resize <w> <h>           resize the graph canvas
  /export [dir]             export the session as HTML
  /help                     this text
  /quit                     leave";

impl ReplCommand {
    /// Parse one input line. `Err` carries a usage message.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(ReplCommand::Say(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "select" => index(args, "/select <n>").map(ReplCommand::Select),
            "cancel" => Ok(ReplCommand::CancelSelection),
            "synthesize" => Ok(ReplCommand::Synthesize(args.to_string())),
            "notes" => Ok(ReplCommand::Notes),
            "reflect" => {
                let (note, text) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
                let note = index(note, "/reflect <note> <text>")?;
                Ok(ReplCommand::Reflect(note, text.trim().to_string()))
            }
            "forget" => index(args, "/forget <note>").map(ReplCommand::Forget),
            "delete" => index(args, "/delete <n>").map(ReplCommand::Delete),
            "log" => Ok(ReplCommand::Log),
            "pick" => {
                let (x, y) = pair::<f64>(args, "/pick <x> <y>")?;
                Ok(ReplCommand::Pick(x, y))
            }
            "graph" if !args.is_empty() => Ok(ReplCommand::Graph(PathBuf::from(args))),
            "graph" => Err("usage: /graph <path>".to_string()),
            "resize" => {
                let (w, h) = pair::<u32>(args, "/resize <w> <h>")?;
                Ok(ReplCommand::Resize(w, h))
            }
            "export" => Ok(ReplCommand::Export(
                (!args.is_empty()).then(|| PathBuf::from(args)),
            )),
            "help" | "?" => Ok(ReplCommand::Help),
            "quit" | "exit" => Ok(ReplCommand::Quit),
            other => Err(format!("unknown command /{other}; try /help")),
        }
    }
}

fn index(arg: &str, usage: &str) -> Result<usize, String> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("usage: {usage}")),
    }
}

fn pair<T: std::str::FromStr>(args: &str, usage: &str) -> Result<(T, T), String> {
    let mut parts = args.split_whitespace();
    match (
        parts.next().and_then(|s| s.parse().ok()),
        parts.next().and_then(|s| s.parse().ok()),
        parts.next(),
    ) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(format!("usage: {usage}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_said() {
        assert_eq!(
            ReplCommand::parse("  What is piety? "),
            Ok(ReplCommand::Say("What is piety?".to_string()))
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("/select 2"), Ok(ReplCommand::Select(2)));
        assert_eq!(ReplCommand::parse("/cancel"), Ok(ReplCommand::CancelSelection));
        assert_eq!(
            ReplCommand::parse("/synthesize both assume the gods agree"),
            Ok(ReplCommand::Synthesize("both assume the gods agree".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/reflect 1 revised thought"),
            Ok(ReplCommand::Reflect(1, "revised thought".to_string()))
        );
        assert_eq!(ReplCommand::parse("/reflect 3"), Ok(ReplCommand::Reflect(3, String::new())));
        assert_eq!(ReplCommand::parse("/forget 1"), Ok(ReplCommand::Forget(1)));
        assert_eq!(ReplCommand::parse("/delete 4"), Ok(ReplCommand::Delete(4)));
        assert_eq!(ReplCommand::parse("/pick 240 80.5"), Ok(ReplCommand::Pick(240.0, 80.5)));
        assert_eq!(ReplCommand::parse("/resize 300 400"), Ok(ReplCommand::Resize(300, 400)));
        assert_eq!(
            ReplCommand::parse("/graph out/graph.png"),
            Ok(ReplCommand::Graph(PathBuf::from("out/graph.png")))
        );
        assert_eq!(ReplCommand::parse("/export"), Ok(ReplCommand::Export(None)));
        assert_eq!(
            ReplCommand::parse("/export /tmp/x"),
            Ok(ReplCommand::Export(Some(PathBuf::from("/tmp/x"))))
        );
        assert_eq!(ReplCommand::parse("/quit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_usage_errors() {
        assert!(ReplCommand::parse("/select").is_err());
        assert!(ReplCommand::parse("/select 0").is_err());
        assert!(ReplCommand::parse("/pick 1").is_err());
        assert!(ReplCommand::parse("/resize 1 2 3").is_err());
        assert!(ReplCommand::parse("/graph").is_err());
        assert!(ReplCommand::parse("/frobnicate").unwrap_err().contains("/frobnicate"));
    }
}
