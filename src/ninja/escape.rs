//! Escaping of paths, values and shell arguments for the Ninja grammar.
//!
//! Ninja recognises `$$`, `$ ` and `$:` as escapes for `$`, space and colon.
//! There is no escape for line terminators or `|` inside a path, so such
//! paths are rejected instead of being written out ambiguously.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// A token that has no representation in a Ninja script.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("{:?} cannot be written to a ninja script: {}", .token, .reason)]
#[diagnostic(
    code(ninjagen::escape::unrepresentable),
    help("rename the file or directory")
)]
pub struct EscapeError {
    pub token: String,
    pub reason: &'static str,
}

fn check_line_terminators(raw: &str) -> Result<(), EscapeError> {
    if raw.contains(['\n', '\r']) {
        return Err(EscapeError {
            token: raw.to_string(),
            reason: "contains a line terminator",
        });
    }
    if raw.contains('\0') {
        return Err(EscapeError {
            token: raw.to_string(),
            reason: "contains a NUL byte",
        });
    }
    Ok(())
}

/// Escape a path used as a `build` input or output.
pub fn escape_path(raw: &str) -> Result<String, EscapeError> {
    check_line_terminators(raw)?;
    if raw.contains('|') {
        return Err(EscapeError {
            token: raw.to_string(),
            reason: "contains `|`, which ninja reads as a dependency separator",
        });
    }
    if raw.is_empty() {
        return Err(EscapeError {
            token: String::new(),
            reason: "is empty",
        });
    }

    let mut out = String::with_capacity(raw.len() + 4);
    for c in raw.chars() {
        match c {
            '$' | ' ' | ':' => {
                out.push('$');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Escape the right hand side of a variable binding. Spaces and colons are
/// literal there, only `$` needs doubling.
pub fn escape_value(raw: &str) -> Result<String, EscapeError> {
    check_line_terminators(raw)?;
    Ok(raw.replace('$', "$$"))
}

/// Quoting convention of the process that finally runs a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStyle {
    /// `/bin/sh -c`
    Posix,
    /// `CreateProcess` argument splitting (MSVCRT rules)
    Windows,
}

/// Quote one argument so the command line splits back into the same argv.
pub fn shell_quote(arg: &str, style: ShellStyle) -> String {
    match style {
        ShellStyle::Posix => {
            let safe = !arg.is_empty()
                && arg.chars().all(|c| {
                    c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c)
                });
            if safe {
                arg.to_string()
            } else {
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
        }
        ShellStyle::Windows => {
            let needs_quotes = arg.is_empty() || arg.contains([' ', '\t', '"']);
            if !needs_quotes {
                return arg.to_string();
            }
            let mut out = String::from("\"");
            let mut backslashes = 0;
            for c in arg.chars() {
                match c {
                    '\\' => backslashes += 1,
                    '"' => {
                        out.push_str(&"\\".repeat(backslashes * 2 + 1));
                        out.push('"');
                        backslashes = 0;
                    }
                    _ => {
                        out.push_str(&"\\".repeat(backslashes));
                        out.push(c);
                        backslashes = 0;
                    }
                }
            }
            out.push_str(&"\\".repeat(backslashes * 2));
            out.push('"');
            out
        }
    }
}

/// Join arguments into one command line fragment.
pub fn shell_join<'a>(args: impl IntoIterator<Item = &'a String>, style: ShellStyle) -> String {
    args.into_iter()
        .map(|a| shell_quote(a, style))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turn an arbitrary name into something usable as a variable or rule name
/// (`[A-Za-z0-9_-]`, which `$name` references accept without braces).
pub fn sanitize_identifier(name: &str) -> String {
    let ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() {
        "_".to_string()
    } else {
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The executor's side of the contract for path tokens.
    fn unescape_path(escaped: &str) -> String {
        let mut out = String::new();
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            if c == '$' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_escape_path() {
        assert_eq!(escape_path("obj/main.o").unwrap(), "obj/main.o");
        assert_eq!(escape_path("my dir/a b.c").unwrap(), "my$ dir/a$ b.c");
        assert_eq!(escape_path("C:\\src\\x.c").unwrap(), "C$:\\src\\x.c");
        assert_eq!(escape_path("$HOME/x").unwrap(), "$$HOME/x");
    }

    #[test]
    fn test_escape_path_is_reversible() {
        for raw in ["a b", "c:/x y/$z", "plain", "$$ :"] {
            assert_eq!(unescape_path(&escape_path(raw).unwrap()), raw);
        }
    }

    #[test]
    fn test_rejects_unrepresentable_paths() {
        assert!(escape_path("a\nb").is_err());
        assert!(escape_path("a\r\nb").is_err());
        assert!(escape_path("a|b").is_err());
        assert!(escape_path("").is_err());
        assert!(escape_value("x\ny").is_err());
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("-DA=$B c:d").unwrap(), "-DA=$$B c:d");
    }

    #[test]
    fn test_shell_quote_posix() {
        assert_eq!(shell_quote("-DFOO=1", ShellStyle::Posix), "-DFOO=1");
        assert_eq!(shell_quote("a b", ShellStyle::Posix), "'a b'");
        assert_eq!(shell_quote("it's", ShellStyle::Posix), r"'it'\''s'");
        assert_eq!(shell_quote("", ShellStyle::Posix), "''");
    }

    #[test]
    fn test_shell_quote_windows() {
        assert_eq!(shell_quote("/DFOO", ShellStyle::Windows), "/DFOO");
        assert_eq!(
            shell_quote("C:\\Program Files\\x", ShellStyle::Windows),
            "\"C:\\Program Files\\x\""
        );
        assert_eq!(shell_quote("a\"b", ShellStyle::Windows), "\"a\\\"b\"");
        assert_eq!(shell_quote("dir with\\", ShellStyle::Windows), "\"dir with\\\\\"");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("my.lib"), "my_lib");
        assert_eq!(sanitize_identifier("a-b_c9"), "a-b_c9");
        assert_eq!(sanitize_identifier(""), "_");
    }
}
