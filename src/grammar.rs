/// Tree-sitter grammar resolution by file extension.
use std::collections::HashMap;
use std::path::Path;

use tree_sitter::Language;

use crate::error::Error;

/// Script languages the parser boundary knows how to lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    /// POSIX shell / Bash.
    Bash,
    /// Windows PowerShell and PowerShell 7.
    PowerShell,
}

impl ScriptLanguage {
    /// Every supported language with the extensions mapped to it.
    pub const ALL: [(Self, &'static [&'static str]); 2] = [
        (Self::PowerShell, &["ps1", "psm1", "psd1"]),
        (Self::Bash, &["sh", "bash"]),
    ];

    /// Look up a language by the name used in `.posref.toml`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLanguage` for names other than `bash` or `powershell`.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        return match name.to_ascii_lowercase().as_str() {
            "bash" | "sh" => Ok(Self::Bash),
            "powershell" | "pwsh" => Ok(Self::PowerShell),
            _ => Err(Error::UnknownLanguage {
                name: name.to_string(),
            }),
        };
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        return match self {
            Self::Bash => "Bash",
            Self::PowerShell => "PowerShell",
        };
    }

    /// The tree-sitter grammar for this language.
    pub fn tree_sitter_language(self) -> Language {
        return match self {
            Self::Bash => tree_sitter_bash::LANGUAGE.into(),
            Self::PowerShell => tree_sitter_powershell::LANGUAGE.into(),
        };
    }
}

/// Map a file extension to its script language. `aliases` holds extra
/// extension mappings from configuration and takes precedence.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage` for unknown extensions.
pub fn language_for_path(
    path: &Path,
    aliases: &HashMap<String, ScriptLanguage>,
) -> Result<ScriptLanguage, Error> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");
    let lowered = ext.to_ascii_lowercase();

    if let Some(language) = aliases.get(&lowered) {
        return Ok(*language);
    }

    return ScriptLanguage::ALL
        .iter()
        .find(|(_, extensions)| return extensions.contains(&lowered.as_str()))
        .map(|(language, _)| return *language)
        .ok_or_else(|| return Error::UnsupportedLanguage {
            ext: ext.to_string(),
        });
}
