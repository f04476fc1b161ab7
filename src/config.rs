use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;
use crate::grammar::ScriptLanguage;
use crate::syntax::DEFAULT_MAX_FILE_BYTES;

/// Name of the optional per-directory config file.
pub const CONFIG_FILE_NAME: &str = ".posref.toml";

/// Project configuration loaded from `.posref.toml`.
#[derive(Debug)]
pub struct Config {
    /// Extra extension-to-language mappings, keys lowercased without the dot.
    pub extensions: HashMap<String, ScriptLanguage>,
    /// Whether a config file was actually read.
    pub found: bool,
    /// Match function definitions on their whole declaration by default.
    pub full_definition: bool,
    /// Largest script the parser boundary accepts.
    pub max_file_bytes: u64,
}

/// Raw TOML structure for `.posref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PosrefTomlConfig {
    /// Extension aliases, e.g. `ps1xml = "powershell"`.
    #[serde(default)]
    extensions: HashMap<String, String>,
    /// Default function-definition policy.
    #[serde(default)]
    full_definition: bool,
    /// Size limit override.
    max_file_bytes: Option<u64>,
}

impl Config {
    /// Load config from `.posref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. A file that exists but
    /// is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownLanguage` if an extension alias names an unknown language.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        tracing::debug!(path = %path.display(), "loading config");
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownLanguage` if an extension alias names an unknown language.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: PosrefTomlConfig = toml::from_str(content)?;

        let mut extensions = HashMap::with_capacity(raw.extensions.len());
        for (ext, language) in &raw.extensions {
            let key = ext.trim_start_matches('.').to_ascii_lowercase();
            extensions.insert(key, ScriptLanguage::from_name(language)?);
        }

        return Ok(Self {
            extensions,
            found: true,
            full_definition: raw.full_definition,
            max_file_bytes: raw.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
        });
    }
}

impl Default for Config {
    /// No aliases, name-only function matching, 16 MiB limit.
    fn default() -> Self {
        return Self {
            extensions: HashMap::new(),
            found: false,
            full_definition: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.found);
        assert!(!config.full_definition);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn reads_every_field() {
        let config = Config::parse(
            "full_definition = true\nmax_file_bytes = 1024\n\n[extensions]\n\".PS1XML\" = \"powershell\"\nzsh = \"bash\"\n",
        )
        .unwrap();
        assert!(config.full_definition);
        assert_eq!(config.max_file_bytes, 1024);
        assert_eq!(config.extensions.get("ps1xml"), Some(&ScriptLanguage::PowerShell));
        assert_eq!(config.extensions.get("zsh"), Some(&ScriptLanguage::Bash));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = Config::parse("[extensions]\nrb = \"ruby\"\n").unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage { name } if name == "ruby"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(Config::parse("colour = true\n"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.found);
    }
}
