use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::parser::ConfigError;

/// The mode a file argument is opened with.
///
/// Parsed from the familiar mode strings (`"r"`, `"w"`, `"a"`, `"x"`, `"r+"`, `"w+"`, `"a+"`).
/// The binary/text markers `b` and `t` are accepted and ignored.
///
/// ### Example
/// ```
/// # use argsig_builder as argsig;
/// use argsig::FileMode;
///
/// assert_eq!("rb".parse::<FileMode>().unwrap(), FileMode::Read);
/// assert_eq!("a+".parse::<FileMode>().unwrap(), FileMode::AppendUpdate);
/// assert!("q".parse::<FileMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// `r`: read an existing file.
    Read,
    /// `w`: write, creating or truncating.
    Write,
    /// `a`: append, creating if needed.
    Append,
    /// `x`: write a file that must not exist yet.
    Exclusive,
    /// `r+`: read and write an existing file.
    ReadUpdate,
    /// `w+`: read and write, creating or truncating.
    WriteUpdate,
    /// `a+`: read and append, creating if needed.
    AppendUpdate,
}

impl FileMode {
    /// The canonical mode string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Read => "r",
            FileMode::Write => "w",
            FileMode::Append => "a",
            FileMode::Exclusive => "x",
            FileMode::ReadUpdate => "r+",
            FileMode::WriteUpdate => "w+",
            FileMode::AppendUpdate => "a+",
        }
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();

        match self {
            FileMode::Read => options.read(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::Append => options.append(true).create(true),
            FileMode::Exclusive => options.write(true).create_new(true),
            FileMode::ReadUpdate => options.read(true).write(true),
            FileMode::WriteUpdate => options.read(true).write(true).create(true).truncate(true),
            FileMode::AppendUpdate => options.read(true).append(true).create(true),
        };

        options
    }

    // `-` is stdin for reading modes, stdout for the rest.
    fn standard_stream(&self) -> FileHandle {
        match self {
            FileMode::Read | FileMode::ReadUpdate => FileHandle::Stdin,
            _ => FileHandle::Stdout,
        }
    }
}

impl FromStr for FileMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let stripped: String = value.chars().filter(|c| *c != 'b' && *c != 't').collect();

        match stripped.as_str() {
            "r" => Ok(FileMode::Read),
            "w" => Ok(FileMode::Write),
            "a" => Ok(FileMode::Append),
            "x" => Ok(FileMode::Exclusive),
            "r+" | "+r" => Ok(FileMode::ReadUpdate),
            "w+" | "+w" => Ok(FileMode::WriteUpdate),
            "a+" | "+a" => Ok(FileMode::AppendUpdate),
            _ => Err(ConfigError::InvalidFileMode(value.to_string())),
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opened file argument.
///
/// Handles are shared, never closed by the parser; the file closes once the last clone is dropped.
#[derive(Debug, Clone)]
pub enum FileHandle {
    /// The `-` token, opened for reading.
    Stdin,
    /// The `-` token, opened for writing.
    Stdout,
    /// A file on disk.
    Disk {
        /// The path, as given on the command line.
        path: PathBuf,
        /// The mode it was opened with.
        mode: FileMode,
        /// The open file.
        file: Arc<File>,
    },
}

impl FileHandle {
    /// The path of a disk file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileHandle::Disk { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// The open disk file.
    pub fn file(&self) -> Option<&Arc<File>> {
        match self {
            FileHandle::Disk { file, .. } => Some(file),
            _ => None,
        }
    }

    /// A reader over the handle.
    pub fn reader(&self) -> io::Result<Box<dyn Read>> {
        match self {
            FileHandle::Stdin => Ok(Box::new(io::stdin())),
            FileHandle::Stdout => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdout is not readable",
            )),
            FileHandle::Disk { file, .. } => Ok(Box::new(file.try_clone()?)),
        }
    }

    /// A writer over the handle.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        match self {
            FileHandle::Stdin => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdin is not writable",
            )),
            FileHandle::Stdout => Ok(Box::new(io::stdout())),
            FileHandle::Disk { file, .. } => Ok(Box::new(file.try_clone()?)),
        }
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FileHandle::Stdin, FileHandle::Stdin) => true,
            (FileHandle::Stdout, FileHandle::Stdout) => true,
            (
                FileHandle::Disk {
                    path: path_a,
                    mode: mode_a,
                    file: file_a,
                },
                FileHandle::Disk {
                    path: path_b,
                    mode: mode_b,
                    file: file_b,
                },
            ) => path_a == path_b && mode_a == mode_b && Arc::ptr_eq(file_a, file_b),
            _ => false,
        }
    }
}

impl std::fmt::Display for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileHandle::Stdin => write!(f, "<stdin>"),
            FileHandle::Stdout => write!(f, "<stdout>"),
            FileHandle::Disk { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

pub(crate) fn open(mode: FileMode, token: &str) -> Result<FileHandle, String> {
    if token == "-" {
        return Ok(mode.standard_stream());
    }

    let file = mode
        .open_options()
        .open(token)
        .map_err(|error| format!("can't open '{token}': {error}"))?;

    Ok(FileHandle::Disk {
        path: PathBuf::from(token),
        mode,
        file: Arc::new(file),
    })
}
