//! Operator slash commands.
//!
//! Anything that does not start with `/` is message text.

use std::path::PathBuf;

use asemic_proto::{NoiseLevel, ObfuscationPattern};

/// A parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// `/add <key>`
    AddKey(String),
    /// `/remove <key>`
    RemoveKey(String),
    /// `/use <key>`
    UseKey(String),
    /// `/target <address>`
    Target(String),
    /// `/pattern <name>`
    Pattern(ObfuscationPattern),
    /// `/noise <level>`
    Noise(NoiseLevel),
    /// `/attach <path>`
    Attach(PathBuf),
    /// `/detach`
    Detach,
    /// `/send`
    Send,
    /// `/save <n>`, 1-based position in the message feed.
    Save(usize),
    /// `/quit`
    Quit,
    /// Plain text to send.
    Message(String),
    /// Unrecognized slash command.
    Unknown {
        /// Raw input line.
        input: String,
    },
    /// Known command with unusable arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: &'static str,
        /// What was wrong.
        error: String,
    },
}

/// Parse one line of input.
pub fn parse(line: &str) -> OperatorCommand {
    let Some(rest) = line.strip_prefix('/') else {
        return OperatorCommand::Message(line.to_string());
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let args = args.trim();

    match name {
        "add" => required("add", args, OperatorCommand::AddKey),
        "remove" | "rm" => required("remove", args, OperatorCommand::RemoveKey),
        "use" => required("use", args, OperatorCommand::UseKey),
        "target" | "to" => Ok(OperatorCommand::Target(args.to_string())),
        "pattern" => args
            .parse()
            .map(OperatorCommand::Pattern)
            .map_err(|e| invalid("pattern", &e)),
        "noise" => args.parse().map(OperatorCommand::Noise).map_err(|e| invalid("noise", &e)),
        "attach" => required("attach", args, |path| OperatorCommand::Attach(PathBuf::from(path))),
        "detach" => Ok(OperatorCommand::Detach),
        "send" => Ok(OperatorCommand::Send),
        "save" => match args.parse::<usize>() {
            Ok(n) if n > 0 => Ok(OperatorCommand::Save(n)),
            _ => Err(OperatorCommand::InvalidArgs {
                command: "save",
                error: "expected a message number starting at 1".into(),
            }),
        },
        "quit" | "q" => Ok(OperatorCommand::Quit),
        _ => Err(OperatorCommand::Unknown { input: line.to_string() }),
    }
    .unwrap_or_else(|err| err)
}

fn required(
    command: &'static str,
    args: &str,
    build: impl FnOnce(String) -> OperatorCommand,
) -> Result<OperatorCommand, OperatorCommand> {
    if args.is_empty() {
        return Err(OperatorCommand::InvalidArgs { command, error: "missing argument".into() });
    }
    Ok(build(args.to_string()))
}

fn invalid(command: &'static str, error: &impl std::fmt::Display) -> OperatorCommand {
    OperatorCommand::InvalidArgs { command, error: error.to_string() }
}
