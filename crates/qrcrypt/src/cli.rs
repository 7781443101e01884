//! Command-line parsing for the `qrcrypt` binary.
//!
//! ```text
//! qrcrypt [-k FILE] [-e] [-p] [TEXT]
//! qrcrypt (-d | --decode) [-k FILE] [PAYLOAD]
//! qrcrypt (-n | --new-key) [--no-qr] [FILE]
//! qrcrypt -v | --version
//! qrcrypt -h | --help
//! ```
//!
//! Grouped short flags (`-ep`) are expanded and `-k=FILE` / `--key=FILE` are
//! split before matching. The last argument, if it is not an option, is the
//! input text.

use std::path::PathBuf;

use common::QrError;

pub const USAGE: &str = "\
Usage:
qrcrypt [OPTIONS] [<text>]
qrcrypt (--decode | -d) [--key <file>] [<payload>]
qrcrypt (--new-key | -n) [--no-qr] [<file>]
qrcrypt --version | -v
qrcrypt --help | -h
Options:
-k <file>, --key <file> Specify the keyfile that must be used.
-e, --no-encryption     Do not encrypt the text in the qr code.
-p, --parts             Print the base64 envelope fields as JSON instead.
-d, --decode            Recover the text behind a scanned payload.

-n, --new-key           Generate a new key file.
--no-qr                 Do not print the key payload.

-v, --version           Display the version.
-h, --help              Display the usage.

Without <text> or <payload>, one line is read from standard input.";

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Help,
    NewKey {
        path: Option<PathBuf>,
        show_qr: bool,
    },
    Encode {
        key_file: Option<PathBuf>,
        no_encryption: bool,
        parts: bool,
        text: Option<String>,
    },
    Decode {
        key_file: Option<PathBuf>,
        payload: Option<String>,
    },
}

/// Parse arguments (without the program name) into a [`Command`].
///
/// # Errors
///
/// Returns [`QrError::Usage`] for unknown options, a `-k` without a file, or
/// conflicting flags.
pub fn parse<I>(args: I) -> Result<Command, QrError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    match args.first().map(String::as_str) {
        Some("-v" | "--version") => Ok(Command::Version),
        Some("-h" | "--help") => Ok(Command::Help),
        Some("-n" | "--new-key") => parse_new_key(&args[1..]),
        _ => parse_normal(split_assignments(expand_grouped_flags(args))),
    }
}

fn parse_new_key(args: &[String]) -> Result<Command, QrError> {
    let (show_qr, rest) = match args.first().map(String::as_str) {
        Some("--no-qr") => (false, &args[1..]),
        _ => (true, args),
    };
    match rest {
        [] => Ok(Command::NewKey {
            path: None,
            show_qr,
        }),
        [path] => Ok(Command::NewKey {
            path: Some(PathBuf::from(path)),
            show_qr,
        }),
        [_, extra, ..] => Err(unexpected(extra)),
    }
}

fn parse_normal(args: Vec<String>) -> Result<Command, QrError> {
    let mut key_file = None;
    let mut no_encryption = false;
    let mut parts = false;
    let mut decode = false;
    let mut text = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-k" | "--key" => {
                let file = args
                    .get(i + 1)
                    .ok_or_else(|| QrError::Usage("missing file name; usage -k <file>".into()))?;
                key_file = Some(PathBuf::from(file));
                i += 1;
            }
            "-e" | "--no-encryption" => no_encryption = true,
            "-p" | "--parts" => parts = true,
            "-d" | "--decode" => decode = true,
            last if i == args.len() - 1 => text = Some(last.to_owned()),
            other => return Err(unexpected(other)),
        }
        i += 1;
    }

    if decode {
        if no_encryption || parts {
            return Err(QrError::Usage(
                "--decode cannot be combined with --no-encryption or --parts".into(),
            ));
        }
        return Ok(Command::Decode {
            key_file,
            payload: text,
        });
    }
    if no_encryption && parts {
        return Err(QrError::Usage(
            "--parts requires encryption; drop --no-encryption".into(),
        ));
    }
    Ok(Command::Encode {
        key_file,
        no_encryption,
        parts,
        text,
    })
}

fn unexpected(arg: &str) -> QrError {
    QrError::Usage(format!("unexpected argument: {arg}"))
}

/// Replace `-abc` with `-a -b -c`.
pub fn expand_grouped_flags(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg.strip_prefix('-') {
            Some(flags)
                if flags.len() >= 2 && flags.chars().all(|c| c.is_ascii_alphabetic()) =>
            {
                out.extend(flags.chars().map(|c| format!("-{c}")));
            }
            _ => out.push(arg),
        }
    }
    out
}

/// Replace `-k=v` with `-k v` and `--key=v` with `--key v`.
pub fn split_assignments(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match split_assignment(&arg) {
            Some((option, value)) => {
                out.push(option.to_owned());
                out.push(value.to_owned());
            }
            None => out.push(arg),
        }
    }
    out
}

fn split_assignment(arg: &str) -> Option<(&str, &str)> {
    let (option, value) = arg.split_once('=')?;
    let is_option = match option.strip_prefix("--") {
        Some(long) => !long.is_empty() && long.chars().all(|c| c.is_ascii_alphabetic() || c == '-'),
        None => {
            let mut chars = option.chars();
            chars.next() == Some('-')
                && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.next().is_none()
        }
    };
    is_option.then_some((option, value))
}
