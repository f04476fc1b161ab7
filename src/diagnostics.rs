use std::fmt::Write as _;

use crate::error::Error;
use crate::grammar::ScriptLanguage;

/// ANSI bold on.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened, and
/// how to fix it where there is a fix.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),
        Error::FileTooLarge { file, max_bytes, size_bytes } => format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes (max {max_bytes}).

## Fix

Raise the limit in `.posref.toml`:

    max_file_bytes = {size_bytes}
", file.display()),
        Error::InvalidPosition { column, line } => format!("\
# Error: Invalid Position

`{line}:{column}` is not a valid position. Lines and columns start at 1.
"),
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),
        Error::TomlDe(e) => format!("\
# Error: Invalid Config

`.posref.toml` could not be read:

{e}
"),
        Error::UnknownLanguage { name } => format!("\
# Error: Unknown Language

`{name}` in `.posref.toml` is not a supported language.

## Fix

Use one of: {}
", supported_language_names()),
        Error::UnsupportedLanguage { ext } => render_unsupported_language(ext),
    };
}

/// Diagnostic for an extension with no grammar, listing what is supported.
fn render_unsupported_language(ext: &str) -> String {
    let mut out = format!("\
# Error: Unsupported Language

No grammar is registered for `.{ext}` files.

## Supported extensions

");
    for (language, extensions) in ScriptLanguage::ALL {
        let list = extensions
            .iter()
            .map(|e| return format!(".{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "- {}: {list}", language.name());
    }
    let _ = write!(out, "\
\n## Fix

Map the extension in `.posref.toml`:

    [extensions]
    {ext} = \"powershell\"
");
    return out;
}

/// Comma-separated lowercase language names accepted in config.
fn supported_language_names() -> String {
    return ScriptLanguage::ALL
        .iter()
        .map(|(language, _)| return format!("`{}`", language.name().to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn unsupported_language_lists_extensions() {
        let md = render_error(&Error::UnsupportedLanguage { ext: "py".to_string() });
        assert!(md.starts_with("# Error: Unsupported Language"));
        assert!(md.contains("- PowerShell: .ps1 .psm1 .psd1"));
        assert!(md.contains("- Bash: .sh .bash"));
        assert!(md.contains("py = \"powershell\""));
    }

    #[test]
    fn file_too_large_suggests_limit() {
        let md = render_error(&Error::FileTooLarge {
            file: PathBuf::from("big.ps1"),
            max_bytes: 10,
            size_bytes: 20,
        });
        assert!(md.contains("`big.ps1` is 20 bytes (max 10)"));
        assert!(md.contains("max_file_bytes = 20"));
    }

    #[test]
    fn unknown_language_names_choices() {
        let md = render_error(&Error::UnknownLanguage { name: "ruby".to_string() });
        assert!(md.contains("`powershell`, `bash`"));
    }
}
