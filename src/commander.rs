//! Argument parser configured from the settings document.
//!
//! The `arguments` list of the document describes the application's flags;
//! a `-v/--verbose` flag is always present and is read back by the settings
//! loader to override the logger threshold.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

pub const VERBOSE_ID: &str = "verbose";

#[derive(Debug, Error)]
pub enum CommanderError {
    #[error("invalid `arguments` definition: {0}")]
    InvalidArguments(#[from] serde_yaml::Error),

    #[error("argument definition #{index} has no name")]
    MissingName { index: usize },

    #[error("argument '{name}': value {value} is not a valid {expected}")]
    InvalidValue { name: String, value: String, expected: &'static str },

    #[error("argument name '{name}' is already in use")]
    Conflict { name: String },

    #[error(transparent)]
    Parse(#[from] clap::Error),
}

/// Everything the document says about the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommanderSettings {
    pub version: Option<Value>,
    pub arguments: Option<Value>,
    pub description: Option<String>,
    pub usage: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentAction {
    #[default]
    Store,
    StoreTrue,
    StoreFalse,
    Count,
    Append,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }
}

/// One entry of the document's `arguments` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArgumentSpec {
    pub name: OneOrMany,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub action: ArgumentAction,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub value_type: ArgumentType,
}

/// Parsed command line, available once the commander is configured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Opts {
    pub verbose: bool,
    pub values: BTreeMap<String, Value>,
}

impl Opts {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

#[derive(Debug, Clone)]
struct CompiledArg {
    id: String,
    shorts: Vec<char>,
    longs: Vec<String>,
    action: ArgumentAction,
    value_type: ArgumentType,
}

/// Ids and flag names taken so far. clap asserts on duplicates, so every
/// document argument is checked here first.
#[derive(Debug, Default)]
struct NameClaims {
    ids: HashSet<String>,
    shorts: HashSet<char>,
    longs: HashSet<String>,
}

impl NameClaims {
    /// Names owned by the built-in verbose flag and clap's help/version.
    fn builtin() -> Self {
        Self {
            ids: [VERBOSE_ID, "help", "version"].into_iter().map(str::to_string).collect(),
            shorts: ['v', 'h', 'V'].into_iter().collect(),
            longs: [VERBOSE_ID, "help", "version"].into_iter().map(str::to_string).collect(),
        }
    }

    fn claim(&mut self, arg: &CompiledArg) -> Result<(), CommanderError> {
        let conflict = |name: String| CommanderError::Conflict { name };
        if !self.ids.insert(arg.id.clone()) {
            return Err(conflict(arg.id.clone()));
        }
        for &short in &arg.shorts {
            if !self.shorts.insert(short) {
                return Err(conflict(format!("-{}", short)));
            }
        }
        for long in &arg.longs {
            if !self.longs.insert(long.clone()) {
                return Err(conflict(format!("--{}", long)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Commander {
    argv: Vec<OsString>,
    settings: Option<CommanderSettings>,
    opts: Opts,
}

impl Default for Commander {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Commander {
    /// Parse the real process arguments on configuration.
    pub fn from_env() -> Self {
        Self::with_args(std::env::args_os())
    }

    /// Parse the given argv (first item is the program name).
    pub fn with_args<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self { argv: argv.into_iter().map(Into::into).collect(), settings: None, opts: Opts::default() }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    pub fn settings(&self) -> Option<&CommanderSettings> {
        self.settings.as_ref()
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Build the parser from `settings` and parse the stored argv.
    pub fn configure(&mut self, settings: CommanderSettings) -> Result<(), CommanderError> {
        let specs: Vec<ArgumentSpec> = match &settings.arguments {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_yaml::from_value(value.clone())?,
        };

        let (command, compiled) = self.build_command(&settings, specs)?;
        let matches = command.try_get_matches_from(self.argv.iter())?;
        self.opts = extract_opts(&matches, &compiled)?;
        self.settings = Some(settings);

        tracing::debug!(verbose = self.opts.verbose, values = self.opts.values.len(), "commander configured");
        Ok(())
    }

    fn build_command(
        &self,
        settings: &CommanderSettings,
        specs: Vec<ArgumentSpec>,
    ) -> Result<(Command, Vec<CompiledArg>), CommanderError> {
        let program = self
            .argv
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

        let mut command = Command::new(program);
        if let Some(description) = &settings.description {
            command = command.about(description.clone());
        }
        if let Some(usage) = &settings.usage {
            command = command.override_usage(usage.clone());
        }
        if let Some(version) = settings.version.as_ref().and_then(scalar_to_string) {
            command = command.version(version);
        }

        command = command.arg(
            Arg::new(VERBOSE_ID)
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Display every log message"),
        );

        let mut claims = NameClaims::builtin();
        let mut compiled = Vec::with_capacity(specs.len());
        for (index, spec) in specs.into_iter().enumerate() {
            let (arg, compiled_arg) = build_arg(index, spec)?;
            claims.claim(&compiled_arg)?;
            command = command.arg(arg);
            compiled.push(compiled_arg);
        }

        Ok((command, compiled))
    }
}

fn build_arg(index: usize, spec: ArgumentSpec) -> Result<(Arg, CompiledArg), CommanderError> {
    let names = spec.name.into_vec();
    let id = arg_id(&names).ok_or(CommanderError::MissingName { index })?;
    let positional = names.iter().all(|name| !name.starts_with('-'));

    let mut shorts = Vec::new();
    let mut longs = Vec::new();
    if !positional {
        for name in &names {
            if let Some(long) = name.strip_prefix("--") {
                if !long.is_empty() && !longs.iter().any(|l| l == long) {
                    longs.push(long.to_string());
                }
            } else if let Some(c) = name.strip_prefix('-').and_then(|short| short.chars().next()) {
                if !shorts.contains(&c) {
                    shorts.push(c);
                }
            }
        }
    }

    // First name of each kind is primary, the rest are aliases.
    let mut arg = Arg::new(id.clone());
    for (i, long) in longs.iter().enumerate() {
        arg = if i == 0 { arg.long(long.clone()) } else { arg.alias(long.clone()) };
    }
    for (i, &short) in shorts.iter().enumerate() {
        arg = if i == 0 { arg.short(short) } else { arg.short_alias(short) };
    }

    arg = arg.action(match spec.action {
        ArgumentAction::Store => ArgAction::Set,
        ArgumentAction::StoreTrue => ArgAction::SetTrue,
        ArgumentAction::StoreFalse => ArgAction::SetFalse,
        ArgumentAction::Count => ArgAction::Count,
        ArgumentAction::Append => ArgAction::Append,
    });

    if let Some(help) = spec.help {
        arg = arg.help(help);
    }
    if spec.required {
        arg = arg.required(true);
    }
    if let Some(choices) = spec.choices {
        arg = arg.value_parser(choices);
    }
    let takes_value = matches!(spec.action, ArgumentAction::Store | ArgumentAction::Append);
    if takes_value {
        if let Some(default) = spec.default.as_ref().and_then(scalar_to_string) {
            arg = arg.default_value(default);
        }
    }

    Ok((arg, CompiledArg { id, shorts, longs, action: spec.action, value_type: spec.value_type }))
}

/// Destination name: longest long flag, else the first name, dashes stripped.
fn arg_id(names: &[String]) -> Option<String> {
    let long = names.iter().filter(|name| name.starts_with("--")).max_by_key(|name| name.len());
    let chosen = long.or_else(|| names.first())?;
    let id = chosen.trim_start_matches('-').replace('-', "_");
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn extract_opts(matches: &ArgMatches, compiled: &[CompiledArg]) -> Result<Opts, CommanderError> {
    let mut values = BTreeMap::new();
    for arg in compiled {
        let value = match arg.action {
            ArgumentAction::StoreTrue | ArgumentAction::StoreFalse => {
                Some(Value::Bool(matches.get_flag(&arg.id)))
            }
            ArgumentAction::Count => Some(Value::from(u64::from(matches.get_count(&arg.id)))),
            ArgumentAction::Store => match matches.get_one::<String>(&arg.id) {
                Some(raw) => Some(convert(&arg.id, raw, arg.value_type)?),
                None => None,
            },
            ArgumentAction::Append => match matches.get_many::<String>(&arg.id) {
                Some(raws) => Some(Value::Sequence(
                    raws.map(|raw| convert(&arg.id, raw, arg.value_type))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                None => None,
            },
        };
        if let Some(value) = value {
            values.insert(arg.id.clone(), value);
        }
    }

    Ok(Opts { verbose: matches.get_flag(VERBOSE_ID), values })
}

fn convert(name: &str, raw: &str, value_type: ArgumentType) -> Result<Value, CommanderError> {
    let invalid = |expected| CommanderError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        expected,
    };
    match value_type {
        ArgumentType::Str => Ok(Value::String(raw.to_string())),
        ArgumentType::Int => raw.trim().parse::<i64>().map(Value::from).map_err(|_| invalid("integer")),
        ArgumentType::Float => raw.trim().parse::<f64>().map(Value::from).map_err(|_| invalid("float")),
        ArgumentType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("boolean")),
        },
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(yaml: &str) -> Option<Value> {
        Some(serde_yaml::from_str(yaml).expect("yaml"))
    }

    #[test]
    fn test_verbose_flag_always_available() {
        let mut commander = Commander::with_args(["app", "--verbose"]);
        commander.configure(CommanderSettings::default()).expect("configure");
        assert!(commander.is_configured());
        assert!(commander.opts().verbose);

        let mut quiet = Commander::with_args(["app"]);
        quiet.configure(CommanderSettings::default()).expect("configure");
        assert!(!quiet.opts().verbose);
    }

    #[test]
    fn test_document_arguments_are_parsed() {
        let settings = CommanderSettings {
            arguments: arguments(
                r#"
- name: [-r, --retries]
  type: int
  default: 2
- name: --dry-run
  action: store_true
- name: target
  help: What to process
- name: -t
  action: append
"#,
            ),
            ..CommanderSettings::default()
        };

        let mut commander = Commander::with_args(["app", "input.txt", "--dry-run", "-t", "a", "-t", "b"]);
        commander.configure(settings).expect("configure");

        let opts = commander.opts();
        assert_eq!(opts.get("retries"), Some(&Value::from(2i64)));
        assert_eq!(opts.get("dry_run"), Some(&Value::Bool(true)));
        assert_eq!(opts.get("target"), Some(&Value::String("input.txt".to_string())));
        assert_eq!(
            opts.get("t"),
            Some(&Value::Sequence(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn test_choices_reject_unknown_value() {
        let settings = CommanderSettings {
            arguments: arguments("- name: --mode\n  choices: [fast, slow]\n"),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app", "--mode", "medium"]);
        let err = commander.configure(settings).expect_err("invalid choice");
        assert!(matches!(err, CommanderError::Parse(_)));
        assert!(!commander.is_configured());
    }

    #[test]
    fn test_bad_int_value_is_reported() {
        let settings = CommanderSettings {
            arguments: arguments("- name: --count\n  type: int\n"),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app", "--count", "many"]);
        let err = commander.configure(settings).expect_err("not an int");
        assert!(err.to_string().contains("not a valid integer"), "{err}");
    }

    fn conflict_for(yaml: &str) -> String {
        let settings = CommanderSettings { arguments: arguments(yaml), ..CommanderSettings::default() };
        let mut commander = Commander::with_args(["app"]);
        match commander.configure(settings) {
            Err(CommanderError::Conflict { name }) => {
                assert!(!commander.is_configured());
                name
            }
            other => panic!("expected a name conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_document_cannot_redefine_verbose() {
        assert_eq!(conflict_for("- name: [-v, --verbose]\n  action: count\n"), "verbose");
    }

    #[test]
    fn test_short_flag_clashing_with_builtin_is_rejected() {
        assert_eq!(conflict_for("- name: [-v, --vault]\n"), "-v");
        assert_eq!(conflict_for("- name: [-h, --host]\n"), "-h");
        assert_eq!(conflict_for("- name: [-V, --vendor]\n"), "-V");
        assert_eq!(conflict_for("- name: help\n"), "help");
    }

    #[test]
    fn test_duplicate_argument_is_rejected() {
        assert_eq!(conflict_for("- name: --retries\n- name: --retries\n"), "retries");
        assert_eq!(conflict_for("- name: [-r, --retries]\n- name: [-r, --rate]\n"), "-r");
        assert_eq!(conflict_for("- name: [--max-count]\n- name: [-m, --max, --max-count]\n"), "max_count");
    }

    #[test]
    fn test_extra_names_become_aliases() {
        let settings = CommanderSettings {
            arguments: arguments("- name: [-o, -O, --out, --output]\n"),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app", "-O", "x.txt"]);
        commander.configure(settings).expect("configure");
        assert_eq!(commander.opts().get("output"), Some(&Value::from("x.txt")));

        let settings = CommanderSettings {
            arguments: arguments("- name: [-o, -O, --out, --output]\n"),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app", "--out", "y.txt"]);
        commander.configure(settings).expect("configure");
        assert_eq!(commander.opts().get("output"), Some(&Value::from("y.txt")));
    }

    #[test]
    fn test_arguments_must_be_a_list() {
        let settings = CommanderSettings {
            arguments: arguments("retries: 3"),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app"]);
        assert!(matches!(
            commander.configure(settings),
            Err(CommanderError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_version_request_surfaces_as_parse_error() {
        let settings = CommanderSettings {
            version: Some(Value::from(1.5)),
            description: Some("Demo tool".to_string()),
            ..CommanderSettings::default()
        };
        let mut commander = Commander::with_args(["app", "--version"]);
        match commander.configure(settings) {
            Err(CommanderError::Parse(e)) => {
                assert_eq!(e.kind(), clap::error::ErrorKind::DisplayVersion)
            }
            other => panic!("expected version display, got {other:?}"),
        }
    }
}
