use std::collections::HashMap;

use clap::builder::{PossibleValuesParser, TypedValueParser, ValueParser};
use clap::{ArgAction, ArgGroup, ArgMatches, ColorChoice};

use crate::compiler::{Alias, Arity, Conversion, Descriptor, Detail, Section, Settings, ValueSpec};
use crate::model::{Namespace, Value};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The token grammar, rendered as a clap command.
///
/// Clap does the matching, conversion and validation.
/// Defaults are not handed to clap; they are filled in while extracting the namespace, so that the finishing steps see the same raw shapes either way.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
    command: clap::Command,
    descriptors: Vec<Descriptor>,
    trailing: Option<Trailing>,
}

/// Where a remainder positional starts capturing.
///
/// Clap only captures verbatim once the remainder has its first value, so a known switch right after the preceding positionals would still be matched as a switch.
/// The tokens are therefore split ahead of clap, at the point the preceding positionals are filled.
#[derive(Debug, Clone, Default)]
struct Trailing {
    before: usize,
    longs: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
}

impl Trailing {
    fn of(descriptors: &[Descriptor]) -> Option<Self> {
        let mut trailing = Trailing::default();
        let mut remainder = false;

        for descriptor in descriptors {
            match &descriptor.detail {
                Detail::Positional {
                    arity: Arity::Remainder,
                    ..
                } => remainder = true,
                Detail::Positional {
                    arity: Arity::Exactly(tokens),
                    ..
                } => trailing.before += tokens,
                Detail::Positional { .. } => return None,
                Detail::Option { tokens, alias, .. } => trailing.valued(alias, *tokens),
                Detail::Append { alias, .. } => trailing.valued(alias, 1),
                _ => {}
            }
        }

        remainder.then_some(trailing)
    }

    fn valued(&mut self, alias: &Alias, tokens: usize) {
        if let Some(short) = alias.assigned {
            self.shorts.insert(short, tokens);
        }

        for long in &alias.longs {
            self.longs.insert(long.clone(), tokens);
        }
    }

    // The index of the first token captured by the remainder.
    fn split(&self, tokens: &[&str]) -> Option<usize> {
        let mut filled = 0;
        let mut index = 0;

        while index < tokens.len() {
            let token = tokens[index];

            if token == "--" {
                return None;
            } else if let Some(long) = token.strip_prefix("--") {
                if !long.contains('=') {
                    index += self.longs.get(long).copied().unwrap_or(0);
                }
            } else if token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err() {
                for (offset, short) in token.char_indices().skip(1) {
                    if let Some(values) = self.shorts.get(&short) {
                        if offset + short.len_utf8() == token.len() {
                            index += values;
                        }

                        break;
                    }
                }
            } else if filled == self.before {
                return Some(index);
            } else {
                filled += 1;

                if filled == self.before {
                    return Some(index + 1);
                }
            }

            index += 1;
        }

        None
    }
}

impl Engine {
    pub(crate) fn new(settings: &Settings, sections: Vec<Section>) -> Self {
        let mut command = clap::Command::new(settings.program.clone())
            .no_binary_name(true)
            .color(ColorChoice::Never)
            .args_override_self(true)
            .disable_help_flag(!settings.add_help)
            .term_width(settings.term_width);

        if let Some(about) = &settings.about {
            command = command.about(about.clone());
        }

        let mut descriptors = Vec::default();

        for section in sections {
            if let Some(group) = &section.group {
                command = command.next_help_heading(group.title().to_string());
            }

            for descriptor in section.descriptors {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Rendering {} '{}'.", descriptor.kind, descriptor.dest);
                }

                command = render(command, &descriptor);
                descriptors.push(descriptor);
            }
        }

        command.build();
        let trailing = Trailing::of(&descriptors);
        Self {
            command,
            descriptors,
            trailing,
        }
    }

    pub(crate) fn parse(&self, tokens: &[&str]) -> Result<Namespace, clap::Error> {
        let mut tokens = tokens.to_vec();

        if let Some(index) = self.trailing.as_ref().and_then(|trailing| trailing.split(&tokens)) {
            if index < tokens.len() {
                tokens.insert(index, "--");
            }
        }

        let matches = self.command.clone().try_get_matches_from(tokens)?;
        let mut namespace = Namespace::default();

        for descriptor in &self.descriptors {
            extract(descriptor, &matches, &mut namespace);
        }

        Ok(namespace)
    }

    pub(crate) fn render_help(&self) -> String {
        self.command.clone().render_help().to_string()
    }
}

fn member_id(dest: &str, literal: &str) -> String {
    format!("{dest}={literal}")
}

fn render(command: clap::Command, descriptor: &Descriptor) -> clap::Command {
    let dest = descriptor.dest.as_str();
    let help = descriptor.help.as_ref();
    let required = descriptor.required();

    match &descriptor.detail {
        Detail::Positional { value, arity, .. } => {
            let arg = valued(clap::Arg::new(dest.to_string()), value, dest).required(required);
            let arg = match arity {
                Arity::Exactly(tokens) => arg.action(ArgAction::Set).num_args(*tokens),
                Arity::Any | Arity::AtLeastOne => arg.action(ArgAction::Append).num_args(1..),
                Arity::Remainder => arg
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            };
            command.arg(documented(arg, help))
        }
        Detail::Option {
            value,
            tokens,
            alias,
            ..
        } => {
            let arg = valued(clap::Arg::new(dest.to_string()), value, dest)
                .action(ArgAction::Set)
                .num_args(*tokens)
                .required(required);
            command.arg(documented(spelled(arg, alias), help))
        }
        Detail::Flag { default, alias } => {
            let action = if *default {
                ArgAction::SetFalse
            } else {
                ArgAction::SetTrue
            };
            let arg = clap::Arg::new(dest.to_string()).action(action);
            command.arg(documented(spelled(arg, alias), help))
        }
        Detail::Count { alias, .. } => {
            let arg = clap::Arg::new(dest.to_string()).action(ArgAction::Count);
            command.arg(documented(spelled(arg, alias), help))
        }
        Detail::Level { up, down, .. } => {
            let up_help = help.cloned().unwrap_or_else(|| format!("Increase {dest}."));
            let down_help = format!("Decrease {dest}.");
            let up_arg = clap::Arg::new(up.owner.clone()).action(ArgAction::Count);
            let down_arg = clap::Arg::new(down.owner.clone()).action(ArgAction::Count);
            command
                .arg(spelled(up_arg, up).help(up_help))
                .arg(spelled(down_arg, down).help(down_help))
        }
        Detail::Append { value, alias, .. } => {
            let arg = valued(clap::Arg::new(dest.to_string()), value, dest)
                .action(ArgAction::Append)
                .num_args(1);
            command.arg(documented(spelled(arg, alias), help))
        }
        Detail::Choice {
            append, literals, ..
        } => {
            let mut command = command;
            let mut ids = Vec::default();

            for (literal, alias) in literals {
                let id = member_id(dest, literal);
                let arg = if *append {
                    clap::Arg::new(id.clone())
                        .action(ArgAction::Append)
                        .num_args(0..=1)
                        .require_equals(true)
                        .default_missing_value(literal.clone())
                        .value_parser(PossibleValuesParser::new([literal.clone()]))
                        .value_name(literal.clone())
                        .hide_possible_values(true)
                } else {
                    clap::Arg::new(id.clone()).action(ArgAction::SetTrue)
                };
                command = command.arg(documented(spelled(arg, alias), help));
                ids.push(id);
            }

            command.group(
                ArgGroup::new(dest.to_string())
                    .args(ids)
                    .multiple(*append)
                    .required(required),
            )
        }
    }
}

fn convert(conversion: Option<&Conversion>, token: &str) -> Result<Value, String> {
    match conversion {
        Some(conversion) => conversion.convert(token),
        None => Ok(Value::Str(token.to_string())),
    }
}

fn value_parser(value: &ValueSpec) -> ValueParser {
    let conversion = value.conversion.clone();

    match &value.choices {
        Some(choices) => ValueParser::new(
            PossibleValuesParser::new(choices.clone())
                .try_map(move |token: String| convert(conversion.as_ref(), &token)),
        ),
        None => ValueParser::new(move |token: &str| convert(conversion.as_ref(), token)),
    }
}

fn valued(arg: clap::Arg, value: &ValueSpec, dest: &str) -> clap::Arg {
    let mut arg = arg.value_parser(value_parser(value));

    if value.numeric {
        arg = arg.allow_negative_numbers(true);
    }

    match &value.metavar {
        Some(metavar) => arg.value_name(metavar.clone()),
        None => arg.value_name(dest.to_uppercase()),
    }
}

fn spelled(mut arg: clap::Arg, alias: &Alias) -> clap::Arg {
    if let Some(short) = alias.assigned {
        arg = arg.short(short);
    }

    let mut longs = alias.longs.iter();

    if let Some(long) = longs.next() {
        arg = arg.long(long.clone());
    }

    for long in longs {
        arg = arg.visible_alias(long.clone());
    }

    arg
}

fn documented(arg: clap::Arg, help: Option<&String>) -> clap::Arg {
    match help {
        Some(help) => arg.help(help.clone()),
        None => arg,
    }
}

fn many(matches: &ArgMatches, id: &str) -> Option<Vec<Value>> {
    matches
        .get_many::<Value>(id)
        .map(|values| values.cloned().collect())
}

fn extract(descriptor: &Descriptor, matches: &ArgMatches, namespace: &mut Namespace) {
    let dest = descriptor.dest.as_str();

    let value = match &descriptor.detail {
        Detail::Positional {
            arity: Arity::Exactly(1),
            default,
            ..
        }
        | Detail::Option {
            tokens: 1, default, ..
        } => matches
            .get_one::<Value>(dest)
            .cloned()
            .or_else(|| default.clone())
            .unwrap_or(Value::None),
        Detail::Positional {
            arity: Arity::Exactly(_),
            default,
            ..
        }
        | Detail::Option { default, .. } => many(matches, dest)
            .map(Value::List)
            .or_else(|| default.clone())
            .unwrap_or(Value::None),
        Detail::Positional { default, .. } | Detail::Append { default, .. } => many(matches, dest)
            .map(Value::List)
            .or_else(|| default.clone())
            .unwrap_or_else(|| Value::List(Vec::default())),
        Detail::Flag { .. } => Value::Bool(matches.get_flag(dest)),
        Detail::Count { start, .. } => {
            Value::Int(start.saturating_add(i64::from(matches.get_count(dest))))
        }
        Detail::Level { start, up, down } => {
            // Combined by the level finishing step.
            for owner in [&up.owner, &down.owner] {
                namespace.insert(
                    owner.clone(),
                    Value::Int(i64::from(matches.get_count(owner))),
                );
            }

            Value::Int(*start)
        }
        Detail::Choice {
            append: false,
            literals,
            default,
        } => literals
            .iter()
            .find(|(literal, _)| matches.get_flag(&member_id(dest, literal)))
            .map(|(literal, _)| Value::Str(literal.clone()))
            .or_else(|| default.clone())
            .unwrap_or(Value::None),
        Detail::Choice {
            append: true,
            literals,
            default,
        } => {
            let mut picks: Vec<(usize, &String)> = Vec::default();

            for (literal, _) in literals {
                if let Some(indices) = matches.indices_of(&member_id(dest, literal)) {
                    picks.extend(indices.map(|index| (index, literal)));
                }
            }

            if picks.is_empty() {
                default
                    .clone()
                    .unwrap_or_else(|| Value::List(Vec::default()))
            } else {
                picks.sort_by_key(|(index, _)| *index);
                Value::List(
                    picks
                        .into_iter()
                        .map(|(_, literal)| Value::Str(literal.clone()))
                        .collect(),
                )
            }
        }
    };

    namespace.insert(dest, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Arg, Parameter, Shape};
    use crate::compiler::compile;
    use crate::test::assert_contains;

    fn settings(add_help: bool) -> Settings {
        Settings {
            program: "program".to_string(),
            about: Some("Does things.".to_string()),
            add_help,
            term_width: 100,
        }
    }

    #[test]
    fn about() {
        let grammar = compile(settings(true), &[Parameter::positional("a")]).unwrap();

        let help = grammar.render_help();

        assert!(help.starts_with("Does things."), "{help}");
    }

    #[test]
    fn positional_value_names() {
        // Setup
        let grammar = compile(
            settings(true),
            &[
                Parameter::positional("pattern"),
                Parameter::variadic("files"),
                Parameter::keyword("before").default_value(0),
            ],
        )
        .unwrap();

        // Execute
        let help = grammar.render_help();
        let error = grammar.parse_tokens(&[]).unwrap_err();

        // Verify
        assert_contains!(help, "<PATTERN>");
        assert_contains!(help, "[FILES]...");
        assert_contains!(help, "--before <BEFORE>");
        assert_contains!(error.to_string(), "<PATTERN>");
    }

    #[test]
    fn help_disabled() {
        // Setup
        let grammar = compile(
            settings(false),
            &[Parameter::keyword("host").default_value("localhost")],
        )
        .unwrap();

        // Execute
        let namespace = grammar.parse_tokens(&["-h", "example.com"]).unwrap();

        // Verify
        assert_eq!(namespace.get("host"), Some(&Value::from("example.com")));
        assert!(grammar.parse_tokens(&["--help"]).is_err());
    }

    #[test]
    fn visible_aliases() {
        // Setup
        let grammar = compile(
            settings(true),
            &[Parameter::keyword("color").arg(Arg::with_default("auto").long(["colour", "color"]))],
        )
        .unwrap();

        // Execute
        let british = grammar.parse_tokens(&["--colour", "never"]).unwrap();
        let american = grammar.parse_tokens(&["--color=always"]).unwrap();

        // Verify
        assert_eq!(british.get("color"), Some(&Value::from("never")));
        assert_eq!(american.get("color"), Some(&Value::from("always")));
    }

    #[test]
    fn tuple_option_default() {
        let grammar = compile(
            settings(true),
            &[Parameter::keyword("size")
                .shape(Shape::Tuple(vec![Shape::int(), Shape::int()]))
                .default_value(Value::Tuple(vec![Value::Int(80), Value::Int(24)]))],
        )
        .unwrap();

        let default = grammar.parse_tokens(&[]).unwrap();
        let given = grammar.parse_tokens(&["--size", "120", "40"]).unwrap();

        assert_eq!(
            default.get("size"),
            Some(&Value::Tuple(vec![Value::Int(80), Value::Int(24)]))
        );
        assert_eq!(
            given.get("size"),
            Some(&Value::Tuple(vec![Value::Int(120), Value::Int(40)]))
        );
    }

    #[test]
    fn variadic_default() {
        let grammar = compile(
            settings(true),
            &[Parameter::variadic("files").default_value(vec!["-"])],
        )
        .unwrap();

        let default = grammar.parse_tokens(&[]).unwrap();
        let given = grammar.parse_tokens(&["a", "b"]).unwrap();

        assert_eq!(default.get("files"), Some(&Value::from(vec!["-"])));
        assert_eq!(given.get("files"), Some(&Value::from(vec!["a", "b"])));
    }

    #[test]
    fn one_or_more() {
        let grammar = compile(
            settings(true),
            &[Parameter::variadic("numbers").shape(Shape::one_or_more(Shape::int()))],
        )
        .unwrap();

        let given = grammar.parse_tokens(&["1", "2"]).unwrap();
        let missing = grammar.parse_tokens(&[]);

        assert_eq!(given.get("numbers"), Some(&Value::from(vec![1, 2])));
        assert!(missing.is_err());
    }
}
