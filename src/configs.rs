//! The fixed registry of supported languages and how to launch their
//! language server, built as a literal table keyed by language name.

use std::collections::{HashMap, HashSet};

use crate::facade::lsp::LanguageServerConfig;

pub fn language_configs() -> HashMap<String, LanguageServerConfig> {
    let mut configs = HashMap::new();

    configs.insert(
        "rust".to_string(),
        LanguageServerConfig {
            start_command: "rust-analyzer".to_string(),
            start_args: None,
            installation_command: Some("rustup component add rust-analyzer".to_string()),
            extensions: vec!["rs".to_string()],
            keywords: keyword_set(&[
                "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if",
                "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
                "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
            ]),
        },
    );

    configs.insert(
        "go".to_string(),
        LanguageServerConfig {
            start_command: "gopls".to_string(),
            start_args: None,
            installation_command: Some("go install golang.org/x/tools/gopls@latest".to_string()),
            extensions: vec!["go".to_string()],
            keywords: keyword_set(&[
                "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
                "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return", "select",
                "struct", "switch", "type", "var",
            ]),
        },
    );

    configs.insert(
        "typescript".to_string(),
        LanguageServerConfig {
            start_command: "typescript-language-server".to_string(),
            start_args: Some("--stdio".to_string()),
            installation_command: Some("npm install -g typescript-language-server typescript".to_string()),
            extensions: vec!["ts".to_string(), "tsx".to_string()],
            keywords: keyword_set(&[
                "break", "case", "catch", "class", "const", "continue", "default", "delete", "do", "else", "enum",
                "export", "extends", "false", "finally", "for", "function", "if", "import", "in", "instanceof",
                "interface", "let", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
                "type", "typeof", "var", "void", "while", "with",
            ]),
        },
    );

    configs
}

fn keyword_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}
