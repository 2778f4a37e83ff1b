//! Declarative command-line option parsing shared by all commands
//!
//! Each command describes itself with a [`CommandDescriptor`]: the options it
//! recognises, the bounds on its positional arguments and its usage text. A
//! single routine, [`parse_options`], turns an argument vector into
//! [`ParsedArgs`] so individual commands never tokenize `argv` themselves.
//!
//! Option scanning stops at the first non-option argument (or `--`), so
//! arguments that a command forwards elsewhere are never reinterpreted even
//! when they begin with `-`.

use crate::error::{Result, StubError};

/// Upper bound meaning "any number of positional arguments"
pub const MAX_ARGUMENTS: usize = usize::MAX;

/// A single recognised option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Long name, matched as `--long`
    pub long: &'static str,
    /// Optional short name, matched as `-s`
    pub short: Option<char>,
    /// Whether the option takes a value
    pub has_arg: bool,
}

impl OptionDescriptor {
    /// Flag without a value
    pub const fn flag(long: &'static str, short: Option<char>) -> Self {
        Self {
            long,
            short,
            has_arg: false,
        }
    }

    /// Option that requires a value
    pub const fn with_arg(long: &'static str, short: Option<char>) -> Self {
        Self {
            long,
            short,
            has_arg: true,
        }
    }
}

/// Everything the shared parser needs to know about a command
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// Command name as typed by the user
    pub name: &'static str,
    /// Recognised options (`--help` is always implied)
    pub options: &'static [OptionDescriptor],
    /// Minimum number of positional arguments
    pub min_args: usize,
    /// Maximum number of positional arguments
    pub max_args: usize,
    /// Synopsis of the positional arguments
    pub usage: &'static str,
    /// Free-form description shown with `--help`
    pub description: &'static str,
}

impl CommandDescriptor {
    /// Render the usage block
    pub fn usage_text(&self) -> String {
        format!(
            "Usage:\n\n  {} {}\n\n{}",
            self.name, self.usage, self.description
        )
    }

    fn print_usage(&self) {
        eprintln!("{}", self.usage_text());
    }

    fn find_long(&self, long: &str) -> Option<&'static OptionDescriptor> {
        self.options.iter().find(|o| o.long == long)
    }

    fn find_short(&self, short: char) -> Option<&'static OptionDescriptor> {
        self.options.iter().find(|o| o.short == Some(short))
    }

    fn fail(&self, message: String) -> StubError {
        eprintln!("{}: {}", self.name, message);
        self.print_usage();
        StubError::Options(format!("{}: {}", self.name, message))
    }
}

/// Result of a successful parse
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Recognised options in the order given, keyed by long name
    pub options: Vec<(&'static str, Option<String>)>,
    /// Positional arguments, verbatim
    pub positionals: Vec<String>,
}

impl ParsedArgs {
    /// Whether an option was given at least once
    pub fn has(&self, long: &str) -> bool {
        self.options.iter().any(|(name, _)| *name == long)
    }

    /// Value of the last occurrence of an option
    pub fn value(&self, long: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(name, _)| *name == long)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Parse `argv` (including the command name at index 0) against a descriptor
pub fn parse_options(argv: &[String], descriptor: &CommandDescriptor) -> Result<ParsedArgs> {
    let mut parsed = ParsedArgs::default();
    let mut idx = 1;

    while idx < argv.len() {
        let arg = argv[idx].as_str();

        if arg == "--" {
            idx += 1;
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            break;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (key, inline) = match long.split_once('=') {
                Some((key, value)) => (key, Some(value.to_string())),
                None => (long, None),
            };
            if key == "help" {
                descriptor.print_usage();
                return Err(StubError::HelpRequested);
            }
            let opt = descriptor
                .find_long(key)
                .ok_or_else(|| descriptor.fail(format!("unrecognized option '--{}'", key)))?;

            let value = if opt.has_arg {
                match inline {
                    Some(value) => Some(value),
                    None => {
                        idx += 1;
                        let value = argv.get(idx).cloned().ok_or_else(|| {
                            descriptor.fail(format!("option '--{}' requires an argument", key))
                        })?;
                        Some(value)
                    }
                }
            } else if inline.is_some() {
                return Err(descriptor.fail(format!("option '--{}' doesn't allow an argument", key)));
            } else {
                None
            };
            parsed.options.push((opt.long, value));
        } else {
            // Cluster of short options, e.g. `-ab` or `-ovalue`
            let cluster = &arg[1..];
            for (pos, c) in cluster.char_indices() {
                if c == 'h' && descriptor.find_short('h').is_none() {
                    descriptor.print_usage();
                    return Err(StubError::HelpRequested);
                }
                let opt = descriptor
                    .find_short(c)
                    .ok_or_else(|| descriptor.fail(format!("invalid option -- '{}'", c)))?;

                if !opt.has_arg {
                    parsed.options.push((opt.long, None));
                    continue;
                }

                let rest = &cluster[pos + c.len_utf8()..];
                let value = if !rest.is_empty() {
                    rest.to_string()
                } else {
                    idx += 1;
                    argv.get(idx).cloned().ok_or_else(|| {
                        descriptor.fail(format!("option requires an argument -- '{}'", c))
                    })?
                };
                parsed.options.push((opt.long, Some(value)));
                break;
            }
        }

        idx += 1;
    }

    parsed.positionals = argv.get(idx..).unwrap_or_default().to_vec();

    let count = parsed.positionals.len();
    if count < descriptor.min_args {
        return Err(descriptor.fail(format!(
            "expected at least {} argument(s), got {}",
            descriptor.min_args, count
        )));
    }
    if count > descriptor.max_args {
        return Err(descriptor.fail(format!(
            "expected at most {} argument(s), got {}",
            descriptor.max_args, count
        )));
    }

    Ok(parsed)
}
