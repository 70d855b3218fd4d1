use crate::compiler::assemble::{ArgumentSummary, Group};
use crate::compiler::descriptor::ArgKind;
use crate::compiler::finish::Finisher;
use crate::model::Namespace;
use crate::parser::{Engine, ParseError};

/// The compiled command line grammar.
///
/// Immutable once built, so a single grammar may parse any number of token lists (from any number of threads).
/// Parsing happens in two phases:
/// 1. The engine matches and converts the tokens, all-or-nothing.
/// 2. The finishing steps reshape the matched values (ex: enum members, tuples, levels), in declaration order.
#[derive(Debug, Clone)]
pub struct Grammar {
    program: String,
    engine: Engine,
    finishers: Vec<Finisher>,
    groups: Vec<Group>,
    summaries: Vec<ArgumentSummary>,
}

impl Grammar {
    pub(crate) fn new(
        program: String,
        engine: Engine,
        finishers: Vec<Finisher>,
        groups: Vec<Group>,
        summaries: Vec<ArgumentSummary>,
    ) -> Self {
        Self {
            program,
            engine,
            finishers,
            groups,
            summaries,
        }
    }

    /// The program name, as shown in the usage line.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Parse the tokens (excluding the program name) into a finished namespace.
    ///
    /// Help requests surface as a [`ParseError`] with exit code `0`.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Namespace, ParseError> {
        let mut namespace = self.engine.parse(tokens)?;

        for finisher in &self.finishers {
            finisher.apply(&mut namespace)?;
        }

        Ok(namespace)
    }

    /// Parse owned tokens; see [`Grammar::parse_tokens`].
    pub fn parse_args<I, T>(&self, args: I) -> Result<Namespace, ParseError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let args: Vec<T> = args.into_iter().collect();
        let tokens: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        self.parse_tokens(&tokens)
    }

    /// The compiled arguments, in declaration order.
    pub fn arguments(&self) -> &[ArgumentSummary] {
        &self.summaries
    }

    /// The compiled argument for a destination.
    pub fn argument(&self, dest: &str) -> Option<&ArgumentSummary> {
        self.summaries.iter().find(|summary| summary.dest() == dest)
    }

    /// The kind of the argument for a destination.
    pub fn kind(&self, dest: &str) -> Option<ArgKind> {
        self.argument(dest).map(ArgumentSummary::kind)
    }

    /// The (first) short option assigned to a destination.
    pub fn short(&self, dest: &str) -> Option<char> {
        self.argument(dest)
            .and_then(|summary| summary.shorts().first().copied())
    }

    /// The help sections, in declaration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The full help message.
    pub fn render_help(&self) -> String {
        self.engine.render_help()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Arg, CommandLineParser, Parameter, Shape};
    use crate::model::{EnumType, Value};
    use crate::test::assert_contains;
    use clap::error::ErrorKind;
    use rstest::rstest;

    fn compile(parameters: Vec<Parameter>) -> Grammar {
        let mut clp = CommandLineParser::new("program").term_width(80);

        for parameter in parameters {
            clp = clp.add(parameter);
        }

        clp.compile().unwrap()
    }

    fn engine_kind(error: ParseError) -> ErrorKind {
        match error {
            ParseError::Engine(error) => error.kind(),
            other => panic!("expected an engine error, found {other:?}"),
        }
    }

    #[test]
    fn grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Grammar>();
    }

    #[rstest]
    #[case(vec![
        Parameter::keyword("x").shape(Shape::bool()),
        Parameter::keyword("X_named").default_value(true),
    ])]
    #[case(vec![
        Parameter::keyword("X_named").default_value(true),
        Parameter::keyword("x").shape(Shape::bool()),
    ])]
    fn flag_case(#[case] parameters: Vec<Parameter>) {
        // Setup
        let grammar = compile(parameters);

        // Execute
        let namespace = grammar.parse_tokens(&["-x", "-X"]).unwrap();

        // Verify
        assert_eq!(grammar.short("x"), Some('x'));
        assert_eq!(grammar.short("X_named"), Some('X'));
        assert_eq!(namespace.get("x"), Some(&Value::Bool(true)));
        assert_eq!(namespace.get("X_named"), Some(&Value::Bool(false)));
    }

    #[test]
    fn flag_defaults() {
        let grammar = compile(vec![
            Parameter::keyword("x").shape(Shape::bool()),
            Parameter::keyword("X_named").default_value(true),
        ]);

        let namespace = grammar.parse_tokens(&[]).unwrap();

        assert_eq!(namespace.get("x"), Some(&Value::Bool(false)));
        assert_eq!(namespace.get("X_named"), Some(&Value::Bool(true)));
    }

    #[test]
    fn required_positional() {
        // Setup
        let grammar = compile(vec![
            Parameter::positional("pattern"),
            Parameter::keyword("count").default_value(1),
        ]);

        // Execute
        let error = grammar.parse_tokens(&["--count", "2"]).unwrap_err();

        // Verify
        assert_eq!(engine_kind(error), ErrorKind::MissingRequiredArgument);
    }

    #[rstest]
    #[case(&[], Value::from("x"))]
    #[case(&["y"], Value::from("y"))]
    fn optional_positional(#[case] tokens: &[&str], #[case] expected: Value) {
        let grammar = compile(vec![Parameter::positional("item").default_value("x")]);

        let namespace = grammar.parse_tokens(tokens).unwrap();

        assert_eq!(namespace.get("item"), Some(&expected));
    }

    #[rstest]
    #[case("a", "A")]
    #[case("b", "B")]
    fn enum_member(#[case] token: &str, #[case] expected: &str) {
        // Setup
        let letters = EnumType::new("Letter").member("A", "a").member("B", "b");
        let grammar = compile(vec![Parameter::positional("letter").shape(letters.clone())]);

        // Execute
        let namespace = grammar.parse_tokens(&[token]).unwrap();

        // Verify
        assert_eq!(namespace.get("letter"), letters.get(expected).as_ref());
    }

    #[test]
    fn enum_invalid() {
        let letters = EnumType::new("Letter").member("A", "a").member("B", "b");
        let grammar = compile(vec![Parameter::positional("letter").shape(letters)]);

        let error = grammar.parse_tokens(&["z"]).unwrap_err();

        assert_eq!(engine_kind(error), ErrorKind::InvalidValue);
    }

    #[test]
    fn enum_int_option() {
        // Setup
        let priority = EnumType::new("Priority").member("Low", 1).member("High", 9);
        let grammar = compile(vec![Parameter::keyword("priority")
            .default_value(priority.get("Low").unwrap())]);

        // Execute
        let given = grammar.parse_tokens(&["--priority", "9"]).unwrap();
        let default = grammar.parse_tokens(&[]).unwrap();

        // Verify
        assert_eq!(given.get("priority"), priority.get("High").as_ref());
        assert_eq!(default.get("priority"), priority.get("Low").as_ref());
    }

    #[test]
    fn tuple() {
        // Setup
        let grammar = compile(vec![Parameter::positional("triple").shape(Shape::Tuple(vec![
            Shape::float(),
            Shape::int(),
            Shape::str(),
        ]))]);

        // Execute
        let namespace = grammar.parse_tokens(&["2.5", "42", "hi"]).unwrap();

        // Verify
        assert_eq!(
            namespace.get("triple"),
            Some(&Value::Tuple(vec![
                Value::Float(2.5),
                Value::Int(42),
                Value::from("hi"),
            ]))
        );
    }

    #[test]
    fn tuple_invalid() {
        let grammar = compile(vec![Parameter::keyword("pair")
            .shape(Shape::Tuple(vec![Shape::int(), Shape::int()]))
            .arg(Arg::with_default(Value::Tuple(vec![Value::Int(0), Value::Int(0)])))]);

        let error = grammar.parse_tokens(&["--pair", "1", "x"]).unwrap_err();

        assert_matches!(error, ParseError::Finish { dest, message } => {
            assert_eq!(dest, "pair");
            assert_eq!(message, "invalid int value: 'x'");
        });
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&["--level-up"], 1)]
    #[case(&["-l", "-l", "-L"], 1)]
    #[case(&["-lll", "--level-down"], 2)]
    #[case(&["-L"], -1)]
    fn level(#[case] tokens: &[&str], #[case] expected: i64) {
        // Setup
        let grammar = compile(vec![Parameter::keyword("level")
            .shape(Shape::Level)
            .default_value(0)]);

        // Execute
        let namespace = grammar.parse_tokens(tokens).unwrap();

        // Verify
        assert_eq!(namespace.get("level"), Some(&Value::Int(expected)));
        assert!(!namespace.contains("level__up"));
        assert!(!namespace.contains("level__down"));
        assert_eq!(namespace.len(), 1);
    }

    #[test]
    fn verbosity_clamped() {
        let grammar = compile(vec![Parameter::keyword("verbosity")
            .shape(Shape::Verbosity)
            .arg(Arg::with_default(1).min(0).max(3))]);

        let loud = grammar.parse_tokens(&["-vvvvv"]).unwrap();
        let silent = grammar.parse_tokens(&["--quiet", "-q"]).unwrap();

        assert_eq!(loud.get("verbosity"), Some(&Value::Int(3)));
        assert_eq!(silent.get("verbosity"), Some(&Value::Int(0)));
    }

    #[test]
    fn counter_saturates() {
        let grammar = compile(vec![
            Parameter::keyword("count").shape(Shape::Count).default_value(i64::MAX),
            Parameter::keyword("level").shape(Shape::Level).default_value(i64::MIN),
        ]);

        let namespace = grammar.parse_tokens(&["-cc", "-LL"]).unwrap();

        assert_eq!(namespace.get("count"), Some(&Value::Int(i64::MAX)));
        assert_eq!(namespace.get("level"), Some(&Value::Int(i64::MIN)));
    }

    #[test]
    fn grep_scenario() {
        // Setup
        let grammar = compile(vec![
            Parameter::positional("pattern"),
            Parameter::variadic("files"),
            Parameter::keyword("verbose")
                .shape(Shape::Count)
                .arg(Arg::new().short('v')),
            Parameter::keyword("before").arg(Arg::with_default(0).short('B')),
        ]);

        // Execute
        let namespace = grammar
            .parse_tokens(&["foo", "a.txt", "b.txt", "-vv", "-B", "2"])
            .unwrap();

        // Verify
        assert_eq!(namespace.get("pattern"), Some(&Value::from("foo")));
        assert_eq!(
            namespace.get("files"),
            Some(&Value::from(vec!["a.txt", "b.txt"]))
        );
        assert_eq!(namespace.get("verbose"), Some(&Value::Int(2)));
        assert_eq!(namespace.get("before"), Some(&Value::Int(2)));
        assert_eq!(
            namespace.names().collect::<Vec<&str>>(),
            vec!["pattern", "files", "verbose", "before"]
        );
    }

    fn speed() -> Parameter {
        Parameter::keyword("speed")
            .shape(Shape::literal(["fast", "slow", "balanced", "default"]))
            .default_value("default")
    }

    #[rstest]
    #[case(&[], "default")]
    #[case(&["--fast"], "fast")]
    #[case(&["-b"], "balanced")]
    #[case(&["--slow", "--slow"], "slow")]
    fn choice_group(#[case] tokens: &[&str], #[case] expected: &str) {
        let grammar = compile(vec![speed()]);

        let namespace = grammar.parse_tokens(tokens).unwrap();

        assert_eq!(namespace.get("speed"), Some(&Value::from(expected)));
    }

    #[test]
    fn choice_group_exclusive() {
        let grammar = compile(vec![speed()]);

        let error = grammar.parse_tokens(&["--fast", "--slow"]).unwrap_err();

        assert_eq!(engine_kind(error), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn choice_group_required() {
        let grammar = compile(vec![Parameter::keyword("speed").shape(Shape::literal(["fast", "slow"]))]);

        let error = grammar.parse_tokens(&[]).unwrap_err();

        assert_eq!(engine_kind(error), ErrorKind::MissingRequiredArgument);
    }

    #[rstest]
    #[case(&[], vec![])]
    #[case(&["--red", "--blue", "--red"], vec!["red", "blue", "red"])]
    #[case(&["-b", "--red"], vec!["blue", "red"])]
    fn append_choice_group(#[case] tokens: &[&str], #[case] expected: Vec<&str>) {
        let grammar = compile(vec![
            Parameter::keyword("colors").shape(Shape::append(Shape::literal(["red", "blue"]))),
        ]);

        let namespace = grammar.parse_tokens(tokens).unwrap();

        assert_eq!(namespace.get("colors"), Some(&Value::from(expected)));
    }

    #[rstest]
    #[case(&[], vec![5])]
    #[case(&["--item", "1", "-i", "-2"], vec![1, -2])]
    fn append_option(#[case] tokens: &[&str], #[case] expected: Vec<i64>) {
        let grammar = compile(vec![Parameter::keyword("item")
            .shape(Shape::append(Shape::int()))
            .default_value(vec![5])]);

        let namespace = grammar.parse_tokens(tokens).unwrap();

        assert_eq!(namespace.get("item"), Some(&Value::from(expected)));
    }

    #[rstest]
    #[case(vec!["--dry-run", "ls", "-la", "--color", "x"], vec!["-la", "--color", "x"], true, "sh")]
    #[case(vec!["ls", "--dry-run", "-la"], vec!["--dry-run", "-la"], false, "sh")]
    #[case(vec!["-s", "bash", "ls", "--shell", "zsh"], vec!["--shell", "zsh"], false, "bash")]
    #[case(vec!["--shell=bash", "-d", "ls", "x"], vec!["x"], true, "bash")]
    #[case(vec!["ls"], vec![], false, "sh")]
    fn remainder(
        #[case] tokens: Vec<&str>,
        #[case] rest: Vec<&str>,
        #[case] dry_run: bool,
        #[case] shell: &str,
    ) {
        // Setup
        let grammar = compile(vec![
            Parameter::positional("program"),
            Parameter::positional("rest").shape(Shape::Remainder),
            Parameter::keyword("dry_run").shape(Shape::bool()),
            Parameter::keyword("shell").default_value("sh"),
        ]);

        // Execute
        let namespace = grammar.parse_tokens(tokens.as_slice()).unwrap();

        // Verify
        assert_eq!(namespace.get("program"), Some(&Value::from("ls")));
        assert_eq!(namespace.get("rest"), Some(&Value::from(rest)));
        assert_eq!(namespace.get("dry_run"), Some(&Value::Bool(dry_run)));
        assert_eq!(namespace.get("shell"), Some(&Value::from(shell)));
    }

    #[rstest]
    #[case(vec!["--point", "-1.5", "-2"])]
    #[case(vec!["-p", "-1.5", "-2"])]
    fn negative_tuple_option(#[case] tokens: Vec<&str>) {
        let grammar = compile(vec![Parameter::keyword("point")
            .shape(Shape::Tuple(vec![Shape::float(), Shape::int()]))]);

        let namespace = grammar.parse_tokens(tokens.as_slice()).unwrap();

        assert_eq!(
            namespace.get("point"),
            Some(&Value::Tuple(vec![Value::Float(-1.5), Value::Int(-2)]))
        );
    }

    #[test]
    fn negative_tuple_positional() {
        let grammar = compile(vec![
            Parameter::positional("point").shape(Shape::Tuple(vec![Shape::float(), Shape::int()]))
        ]);

        let namespace = grammar.parse_tokens(&["-1.5", "2"]).unwrap();

        assert_eq!(
            namespace.get("point"),
            Some(&Value::Tuple(vec![Value::Float(-1.5), Value::Int(2)]))
        );
    }

    #[test]
    fn json() {
        let grammar = compile(vec![Parameter::keyword("payload").shape(Shape::Json)]);

        let namespace = grammar
            .parse_tokens(&["--payload", r#"{"a": [1, 2]}"#])
            .unwrap();
        let error = grammar.parse_tokens(&["--payload", "{"]).unwrap_err();

        assert_eq!(
            namespace.get("payload"),
            Some(&Value::Json(serde_json::json!({"a": [1, 2]})))
        );
        assert_eq!(engine_kind(error), ErrorKind::ValueValidation);
    }

    #[rstest]
    #[case(&["--count", "x"], ErrorKind::ValueValidation)]
    #[case(&["--unknown"], ErrorKind::UnknownArgument)]
    #[case(&["--help"], ErrorKind::DisplayHelp)]
    fn engine_errors(#[case] tokens: &[&str], #[case] expected: ErrorKind) {
        let grammar = compile(vec![Parameter::keyword("count").default_value(0)]);

        let error = grammar.parse_tokens(tokens).unwrap_err();

        assert_eq!(engine_kind(error), expected);
    }

    #[test]
    fn negative_numbers() {
        let grammar = compile(vec![
            Parameter::positional("offset").shape(Shape::int()),
            Parameter::keyword("scale").default_value(1.0),
        ]);

        let namespace = grammar
            .parse_tokens(&["-3", "--scale", "-0.5"])
            .unwrap();

        assert_eq!(namespace.get("offset"), Some(&Value::Int(-3)));
        assert_eq!(namespace.get("scale"), Some(&Value::Float(-0.5)));
    }

    #[test]
    fn idempotent() {
        // Setup
        let parameters = vec![
            Parameter::positional("pattern"),
            Parameter::keyword("after").default_value(0),
            Parameter::keyword("all").shape(Shape::bool()),
            Parameter::keyword("Another").default_value(true),
            Parameter::keyword("verbosity").shape(Shape::Verbosity),
            Parameter::keyword("speed").shape(Shape::literal(["quick", "very"])),
        ];

        // Execute
        let first = compile(parameters.clone());
        let second = compile(parameters);

        // Verify
        assert_eq!(first.arguments(), second.arguments());
        assert_eq!(first.short("after"), Some('a'));
        assert_eq!(first.short("all"), None);
        assert_eq!(first.short("Another"), Some('A'));
    }

    #[test]
    fn groups_and_help() {
        // Setup
        let grammar = compile(vec![
            Parameter::positional("pattern").arg(Arg::new().help("The pattern to match.")),
            Parameter::header("_Controlling_Output_").default_value("How lines are printed."),
            Parameter::keyword("before").arg(Arg::with_default(0).metavar("N").help("Lines before.")),
        ]);

        // Execute
        let help = grammar.render_help();

        // Verify
        assert_eq!(grammar.groups().len(), 1);
        assert_eq!(grammar.groups()[0].title(), "Controlling Output");
        assert_eq!(grammar.groups()[0].description(), Some("How lines are printed."));
        assert_eq!(grammar.argument("before").unwrap().group(), Some("Controlling Output"));
        assert_eq!(grammar.kind("before"), Some(ArgKind::Option));
        assert_contains!(help, "Usage: program");
        assert_contains!(help, "The pattern to match.");
        assert_contains!(help, "Controlling Output:");
        assert_contains!(help, "-b, --before <N>");
        assert_contains!(help, "-h, --help");
    }

    #[test]
    fn parse_args() {
        let grammar = compile(vec![Parameter::positional("name")]);

        let namespace = grammar.parse_args(vec!["abc".to_string()]).unwrap();

        assert_eq!(namespace.get("name"), Some(&Value::from("abc")));
    }
}
