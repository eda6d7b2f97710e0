//! # Command Parser
//!
//! Maps one terminal line to a [`CommandResult`]. Recognized commands are
//! handled locally; everything else is a generation prompt.
//!
//! ```text
//! HELP | ?                    → Handled(System, help text)
//! CLEAR                       → Clear
//! [SET] MAX_RETRIES=<0..=5>   → Handled(System, "MAX_RETRIES set to n")   (setter called)
//! [SET] MAX_RETRIES=<other>   → Handled(Error, "Invalid value. ...")      (setter not called)
//! anything else               → NotHandled
//! ```
//!
//! Matching is case-insensitive and tolerant of surrounding whitespace.
//! The parser never fails: bad values come back as an error message.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::message::MessageKind;
use crate::core::state::MaxRetries;

pub const HELP_TEXT: &str = "Available commands:
  HELP or ?            Show this help
  CLEAR                Clear the terminal
  MAX_RETRIES=<0-5>    Set the maximum validation retries
Anything else is sent as a component generation prompt.
Enter submits, Shift+Enter inserts a newline, Up/Down browse history.";

pub const INVALID_RETRIES_TEXT: &str = "Invalid value. MAX_RETRIES must be between 0 and 5.";

static HELP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:help|\?)\s*$").expect("static regex")
});
static CLEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*clear\s*$").expect("static regex"));
static MAX_RETRIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:set\s+)?max_retries\s*=\s*(.*?)\s*$").expect("static regex")
});

/// Read/write access to the retry bound, owned by whoever holds the terminal.
pub trait RetryContext {
    fn max_retries(&self) -> MaxRetries;
    fn set_max_retries(&mut self, value: MaxRetries);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command consumed; append a message of this kind.
    Handled { kind: MessageKind, text: String },
    /// Reset the message list.
    Clear,
    /// Not a command. Treat the line as a generation prompt.
    NotHandled,
}

pub fn parse(line: &str, ctx: &mut dyn RetryContext) -> CommandResult {
    let line = line.trim();

    if HELP_RE.is_match(line) {
        return CommandResult::Handled {
            kind: MessageKind::System,
            text: HELP_TEXT.to_string(),
        };
    }

    if CLEAR_RE.is_match(line) {
        return CommandResult::Clear;
    }

    if let Some(caps) = MAX_RETRIES_RE.captures(line) {
        let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = raw
            .parse::<i64>()
            .ok()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(MaxRetries::new);

        return match value {
            Some(value) => {
                ctx.set_max_retries(value);
                CommandResult::Handled {
                    kind: MessageKind::System,
                    text: format!("MAX_RETRIES set to {}", value.get()),
                }
            }
            None => CommandResult::Handled {
                kind: MessageKind::Error,
                text: INVALID_RETRIES_TEXT.to_string(),
            },
        };
    }

    CommandResult::NotHandled
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every setter call.
    struct Recorder {
        current: MaxRetries,
        calls: Vec<u8>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                current: MaxRetries::default(),
                calls: Vec::new(),
            }
        }
    }

    impl RetryContext for Recorder {
        fn max_retries(&self) -> MaxRetries {
            self.current
        }

        fn set_max_retries(&mut self, value: MaxRetries) {
            self.current = value;
            self.calls.push(value.get());
        }
    }

    #[test]
    fn test_help_variants_are_identical() {
        let mut ctx = Recorder::new();
        let expected = CommandResult::Handled {
            kind: MessageKind::System,
            text: HELP_TEXT.to_string(),
        };
        for line in ["HELP", "help", "Help", "?", "  hElP  ", " ? "] {
            assert_eq!(parse(line, &mut ctx), expected, "line {line:?}");
        }
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut ctx = Recorder::new();
        assert_eq!(parse("CLEAR", &mut ctx), CommandResult::Clear);
        assert_eq!(parse("  clear ", &mut ctx), CommandResult::Clear);
    }

    #[test]
    fn test_valid_retries_call_setter_once() {
        for n in 0..=5u8 {
            let mut ctx = Recorder::new();
            let result = parse(&format!("MAX_RETRIES={n}"), &mut ctx);
            assert_eq!(
                result,
                CommandResult::Handled {
                    kind: MessageKind::System,
                    text: format!("MAX_RETRIES set to {n}"),
                }
            );
            assert_eq!(ctx.calls, vec![n]);
        }
    }

    #[test]
    fn test_retries_grammar_is_tolerant() {
        for line in ["max_retries=3", "MAX_RETRIES = 3", "set max_retries=3", "SET MAX_RETRIES= 3 "] {
            let mut ctx = Recorder::new();
            parse(line, &mut ctx);
            assert_eq!(ctx.calls, vec![3], "line {line:?}");
        }
    }

    #[test]
    fn test_out_of_range_reports_error_without_setter() {
        for line in ["MAX_RETRIES=9", "max_retries=7", "MAX_RETRIES=-1", "MAX_RETRIES=99999999999999999999"] {
            let mut ctx = Recorder::new();
            assert_eq!(
                parse(line, &mut ctx),
                CommandResult::Handled {
                    kind: MessageKind::Error,
                    text: INVALID_RETRIES_TEXT.to_string(),
                },
                "line {line:?}"
            );
            assert!(ctx.calls.is_empty());
            assert_eq!(ctx.current, MaxRetries::default());
        }
    }

    #[test]
    fn test_non_numeric_value_is_an_error_not_a_prompt() {
        let mut ctx = Recorder::new();
        let result = parse("MAX_RETRIES=abc", &mut ctx);
        assert!(matches!(result, CommandResult::Handled { kind: MessageKind::Error, .. }));
        let result = parse("MAX_RETRIES=", &mut ctx);
        assert!(matches!(result, CommandResult::Handled { kind: MessageKind::Error, .. }));
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn test_prompts_are_not_handled() {
        let mut ctx = Recorder::new();
        for line in [
            "create a component that reverses text",
            "help me build a parser",
            "clear the cache in my component",
            "what does max_retries do?",
        ] {
            assert_eq!(parse(line, &mut ctx), CommandResult::NotHandled, "line {line:?}");
        }
    }
}
