use std::path::Path;

use serde::Serialize;

use crate::config::{self, Config};
use crate::grammar::ScriptLanguage;

/// One extension alias.
#[derive(Serialize)]
struct AliasJson {
    /// Extension without the dot.
    extension: String,
    /// Language it maps to.
    language: String,
}

/// Snapshot of the working directory's configuration.
struct CurrentState {
    /// Extension aliases from config, sorted.
    aliases: Vec<(String, String)>,
    /// Config could not be loaded; holds the reason.
    config_error: Option<String>,
    /// Whether `.posref.toml` was found and parsed.
    config_found: bool,
    /// Default function-definition policy.
    full_definition: bool,
    /// Size limit in bytes.
    max_file_bytes: u64,
}

/// One exit code.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit code.
    code: u8,
    /// What it means.
    meaning: String,
}

/// Top-level JSON document.
#[derive(Serialize)]
struct InfoJson {
    /// Current directory's settings.
    current_state: StateJson,
    /// Exit code meanings.
    exit_codes: Vec<ExitCodeInfo>,
    /// Grammars and their extensions.
    supported_languages: Vec<LanguageInfo>,
    /// Crate version.
    version: String,
}

/// One supported language.
#[derive(Serialize)]
struct LanguageInfo {
    /// Extensions with leading dots.
    extensions: Vec<String>,
    /// Display name.
    language: String,
}

/// Settings snapshot.
#[derive(Serialize)]
struct StateJson {
    /// Extension alias mappings.
    aliases: Vec<AliasJson>,
    /// Load failure reason, if any.
    config_error: Option<String>,
    /// Whether `.posref.toml` exists and parsed.
    config_found: bool,
    /// Default function-definition policy.
    full_definition: bool,
    /// Size limit in bytes.
    max_file_bytes: u64,
}

/// Load whatever config is present, recording rather than failing on errors.
fn gather_state(root: &Path) -> CurrentState {
    let (config, config_error) = match Config::load(root) {
        Err(e) => (Config::default(), Some(e.to_string())),
        Ok(c) => (c, None),
    };

    let mut aliases: Vec<(String, String)> = config
        .extensions
        .iter()
        .map(|(ext, language)| return (ext.clone(), language.name().to_string()))
        .collect();
    aliases.sort();

    return CurrentState {
        aliases,
        config_error,
        config_found: config.found,
        full_definition: config.full_definition,
        max_file_bytes: config.max_file_bytes,
    };
}

/// Machine-readable reference.
fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            aliases: state
                .aliases
                .iter()
                .map(|(ext, language)| {
                    return AliasJson {
                        extension: ext.clone(),
                        language: language.clone(),
                    };
                })
                .collect(),
            config_error: state.config_error.clone(),
            config_found: state.config_found,
            full_definition: state.full_definition,
            max_file_bytes: state.max_file_bytes,
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Symbol found / listing printed".to_string() },
            ExitCodeInfo { code: 1, meaning: "No symbol at the position".to_string() },
            ExitCodeInfo { code: 2, meaning: "Runtime error".to_string() },
        ],
        supported_languages: ScriptLanguage::ALL
            .iter()
            .map(|(language, extensions)| {
                return LanguageInfo {
                    extensions: extensions.iter().map(|e| return format!(".{e}")).collect(),
                    language: language.name().to_string(),
                };
            })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}

/// Human-readable reference.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_languages();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

/// Exit code table.
fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Symbol found / listing printed |
| 1    | No symbol at the position |
| 2    | Runtime error |
"
    );
}

/// Title, usage, and config reference.
fn print_markdown_header(version: &str) {
    print!(
        "\
# posref {version}

Resolve the function, parameter, or variable under a cursor position in
PowerShell and Bash scripts.

## Usage

    posref at <file> <line> <column>      Symbol at a 1-based position
    posref at ... --full-definition       Match functions on their whole body
    posref symbols <file>                 Every symbol in traversal order
    posref info                           This document

Add `--json` to any command for machine-readable output.

## Configuration ({})

    full_definition = false             # default function-definition policy
    max_file_bytes = 16777216           # refuse larger scripts

    [extensions]
    ps1xml = \"powershell\"               # extra extension -> language

",
        config::CONFIG_FILE_NAME
    );
}

/// Supported languages table.
fn print_markdown_languages() {
    println!("## Supported Languages\n");
    println!("| Extension | Language |");
    println!("|-----------|----------|");
    for (language, extensions) in ScriptLanguage::ALL {
        let list = extensions.iter().map(|e| return format!(".{e}")).collect::<Vec<_>>().join(" ");
        println!("| {list} | {} |", language.name());
    }
    println!();
}

/// Current directory's effective settings.
fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");
    match (&state.config_error, state.config_found) {
        (Some(reason), _) => println!("Config:          .posref.toml (invalid: {reason})"),
        (None, true) => println!("Config:          .posref.toml (found)"),
        (None, false) => println!("Config:          .posref.toml (not found)"),
    }
    println!("Full definition: {}", state.full_definition);
    println!("Max file bytes:  {}", state.max_file_bytes);

    if state.aliases.is_empty() {
        println!("Aliases:         (none)");
    } else {
        let list = state
            .aliases
            .iter()
            .map(|(ext, language)| return format!(".{ext} -> {language}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Aliases:         {list}");
    }
}

/// Output the posref reference document.
pub fn run(json: bool) {
    let state = gather_state(Path::new("."));

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}
