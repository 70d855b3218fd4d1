use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use argsig::{
    Arg, CommandLineParser, FileHandle, FileMode, Invocation, Outcome, Parameter, Shape, Value,
};

fn main() -> ExitCode {
    let command = match CommandLineParser::new("grep")
        .about("Print the lines that contain a pattern.")
        .add(Parameter::positional("pattern").arg(Arg::new().help("The text to search for.")))
        .add(
            Parameter::variadic("files")
                .shape(FileMode::Read)
                .arg(Arg::new().help("The files to search ('-' for stdin, the default).")),
        )
        .add(
            Parameter::keyword("verbose").shape(Shape::Count).arg(
                Arg::new()
                    .short('v')
                    .no_long()
                    .help("Increase output verbosity (can be specified multiple times)."),
            ),
        )
        .add(
            Parameter::keyword("quiet").shape(Shape::Count).arg(
                Arg::new()
                    .short('q')
                    .no_long()
                    .help("Decrease output verbosity (can be specified multiple times)."),
            ),
        )
        .add(
            Parameter::header("_Controlling_Output_")
                .default_value("The following arguments control the output surrounding a match."),
        )
        .add(
            Parameter::keyword("before").arg(
                Arg::with_default(0)
                    .short('B')
                    .metavar("N")
                    .help("Show N lines before the match."),
            ),
        )
        .add(
            Parameter::keyword("after").arg(
                Arg::with_default(0)
                    .short('A')
                    .metavar("N")
                    .help("Show N lines after the match."),
            ),
        )
        .build_command(grep)
    {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(1);
        }
    };

    command.main()
}

fn grep(invocation: Invocation) -> Outcome {
    match search(&invocation) {
        Ok(found) => Outcome::Truth(found),
        Err(error) => {
            eprintln!("grep: {error}");
            Outcome::Status(2)
        }
    }
}

fn search(invocation: &Invocation) -> io::Result<bool> {
    let count = |name: &str| invocation.keyword(name).and_then(Value::as_int).unwrap_or(0);
    let verbosity = count("verbose") - count("quiet");
    let before = count("before").max(0) as usize;
    let after = count("after").max(0) as usize;

    let Some((pattern, files)) = invocation.positional().split_first() else {
        return Ok(false);
    };
    let pattern = pattern.to_string();
    let stdin = FileHandle::Stdin;
    let mut handles: Vec<&FileHandle> = files.iter().filter_map(Value::as_file).collect();

    if handles.is_empty() {
        handles.push(&stdin);
    }

    let mut found = false;

    for handle in handles {
        if verbosity > 0 {
            eprintln!("searching {handle}");
        }

        let reader = BufReader::new(handle.reader()?);
        let mut context: VecDeque<String> = VecDeque::with_capacity(before);
        let mut trailing = 0;

        for line in reader.lines() {
            let line = line?;

            if line.contains(&pattern) {
                found = true;

                if verbosity >= 0 {
                    for previous in context.drain(..) {
                        println!("{previous}");
                    }
                    println!("{line}");
                }

                trailing = after;
            } else if trailing > 0 {
                trailing -= 1;

                if verbosity >= 0 {
                    println!("{line}");
                }
            } else if before > 0 {
                if context.len() == before {
                    context.pop_front();
                }

                context.push_back(line);
            }
        }
    }

    Ok(found)
}
