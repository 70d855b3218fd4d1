use crate::parser::base::ParseError;

/// Where the parser sends its help and error messages.
pub trait UserInterface {
    /// Display a regular message (ex: help).
    fn print(&self, message: String);

    /// Display a parse error.
    fn print_error(&self, error: ParseError);
}

/// Prints to stdout/stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: ParseError) {
        let message = error.to_string();
        let message = message.trim_end();

        if error.use_stderr() {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}
