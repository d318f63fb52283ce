use std::fs;
use std::io::{IsTerminal, Read};

use crate::ingest::invalid_input_error;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) content: String,
}

impl ResolvedSource {
    fn stdin(content: String) -> Self {
        Self {
            kind: SourceKind::Stdin,
            source_ref: None,
            content,
        }
    }
}

/// Picks exactly one ingest source: a file path, `-` for stdin, or piped stdin.
pub(crate) fn resolve_source(
    path: Option<&str>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    let stdin_body = read_stdin(stdin_override)?.filter(|value| !value.trim().is_empty());

    match path {
        Some("-") => stdin_body.map(ResolvedSource::stdin).ok_or_else(|| {
            invalid_input_error(
                "Path `-` means stdin input, but stdin was empty. Pipe JSON/CSV input or pass a file path.",
            )
        }),
        Some(path_value) => {
            if stdin_body.is_some() {
                return Err(invalid_input_error(
                    "Both stdin and file input were provided. Pass exactly one source: either a file path or piped stdin.",
                ));
            }
            let content = fs::read_to_string(path_value).map_err(|error| {
                ClientError::invalid_argument_with_recovery(
                    &format!("Could not read ingest file `{path_value}`: {error}"),
                    vec![
                        "Verify the path exists and is readable.".to_string(),
                        "Rerun tallyo ingest <path>.".to_string(),
                    ],
                )
            })?;
            Ok(ResolvedSource {
                kind: SourceKind::File,
                source_ref: Some(path_value.to_string()),
                content,
            })
        }
        None => stdin_body.map(ResolvedSource::stdin).ok_or_else(|| {
            invalid_input_error("No ingest source provided. Pass a file path or pipe input via stdin.")
        }),
    }
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec!["Retry with an explicit file path argument.".to_string()],
            )
        })?;
    Ok(Some(buffer))
}
