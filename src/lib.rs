//! `argsig` turns a command's parameter list into its command line interface.
//!
//! Rather than maintaining a flag definition next to the function it feeds, you declare the parameters once (their kinds, shapes and defaults).
//! `argsig` compiles them into a command line grammar, parses tokens against it, and hands back typed values.
//! Specifically, `argsig` attempts to prioritize the following design concerns:
//! * *The parameter list is the interface*:
//! The positional/keyword split of the parameters decides arguments vs. options, and the shape (declared, or inferred from the default) decides everything else.
//! * *Type safe values*:
//! The user should not call any `&str -> T` conversion functions directly; values come back already converted (ex: ints, enum members, tuples, open files).
//! * *Configuration errors up front*:
//! A malformed parameter list fails when it is compiled, never while parsing user input.
//! * *Reproducible spellings*:
//! Short options are assigned deterministically, so the same parameter list always yields the same interface.
//!
//! Token matching, help rendering and usage errors are delegated to [clap](https://docs.rs/clap).
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/grep.rs")]
//! ```
//!
//! ```console
//! $ grep -h
//! Print the lines that contain a pattern.
//!
//! Usage: grep [OPTIONS] <PATTERN> [FILES]...
//!
//! Arguments:
//!   <PATTERN>   The text to search for.
//!   [FILES]...  The files to search ('-' for stdin, the default).
//!
//! Options:
//!   -v          Increase output verbosity (can be specified multiple times).
//!   -q          Decrease output verbosity (can be specified multiple times).
//!   -h, --help  Print help
//!
//! Controlling Output:
//!   -B, --before <N>  Show N lines before the match.
//!   -A, --after <N>   Show N lines after the match.
//! ```
//!
//! # Parameters
//! Configure `argsig` by starting with a [`CommandLineParser`] and `add`ing parameters, in declaration order.
//! There are four kinds of [`Parameter`]:
//! * [`Parameter::positional`]: a positional argument, required unless it has a default.
//! * [`Parameter::variadic`]: the trailing positional values, collected into a list.
//! * [`Parameter::keyword`]: an option, flag, counter, or choice group, depending on its shape.
//! * [`Parameter::header`]: not an argument at all; it opens a help section for the parameters that follow.
//! Any parameter named like `_Section_Title_` is a header too.
//!
//! ### Shapes
//! The [`Shape`] of a parameter decides how its tokens become a [`Value`].
//! When no shape is declared, it is inferred from the default (no default means a plain string).
//! * [`Scalar`] shapes (`str`, `int`, `float`, `bool`, `path`) convert a single token.
//! A `bool` keyword is a flag: `--name` when it defaults to `false`, `--no-name` when it defaults to `true`.
//! * [`EnumType`] restricts the tokens to the members' values and returns the member.
//! * `Tuple` takes one token per element, converting each in turn.
//! * `Count` counts occurrences; `Level` and `Verbosity` count up and down with a pair of switches.
//! * `Append` accumulates every occurrence; over a `Literal` it becomes a group of switches, one per literal.
//! * `Literal` on a keyword is a mutually exclusive group of switches, one per literal.
//! * `Json` decodes the token, `File` opens it (`-` is stdin or stdout), and `Remainder` captures everything that follows verbatim.
//!
//! ```
//! use argsig::{Arg, CommandLineParser, EnumType, Parameter, Shape, Value};
//!
//! let color = EnumType::new("Color").member("Red", "r").member("Green", "g");
//! let grammar = CommandLineParser::new("paint")
//!     .add(Parameter::keyword("color").default_value(color.get("Red").unwrap()))
//!     .add(Parameter::keyword("size").shape(Shape::Tuple(vec![Shape::int(), Shape::int()]))
//!         .arg(Arg::with_default(Value::Tuple(vec![Value::Int(1), Value::Int(1)]))))
//!     .add(Parameter::keyword("speed").shape(Shape::literal(["fast", "slow"])).default_value("slow"))
//!     .compile()
//!     .unwrap();
//!
//! let namespace = grammar.parse_tokens(&["-c", "g", "--size", "3", "4", "--fast"]).unwrap();
//! assert_eq!(namespace.get("color"), color.get("Green").as_ref());
//! assert_eq!(namespace.get("size"), Some(&Value::Tuple(vec![Value::Int(3), Value::Int(4)])));
//! assert_eq!(namespace.get("speed"), Some(&Value::from("fast")));
//! ```
//!
//! ### Short options
//! Explicit short options ([`Arg::short`]) are reserved first, across all the parameters; a letter requested twice is a [`ConfigError`].
//! Every other option is then offered the first letter of its name, in declaration order (upper-cased for flags defaulting to `true`).
//! A letter already taken is simply skipped, so *the first declared parameter wins a contested letter*.
//! Reordering parameters can therefore change which option gets the short form.
//!
//! ### Invocation
//! [`CommandLineParser::build_command`] binds the grammar to a handler.
//! The handler receives an [`Invocation`] (positional values, with the variadic values flattened onto the end, then the keyword values), and returns anything that converts into an [`Outcome`]: `()` is success, an `i32` is the exit status, and a `bool` is success when `true`.
pub use argsig_builder::*;
