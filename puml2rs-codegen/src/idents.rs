//! Identifier derivation for the generated artifact.

use proc_macro2::Ident;
use quote::format_ident;

/// Keywords that would break the artifact if used verbatim as an
/// identifier. Not exhaustive, only what a state or fragment name can
/// plausibly collide with.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "union", "unsafe", "use", "where", "while", "yield",
];

/// Derives a snake_case method name from an opaque action or guard code
/// fragment. Falls back to `fallback` when nothing usable is left; the
/// caller resolves collisions.
pub fn method_base_name(code: &str, fallback: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for c in code.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let name = words.join("_");
    let name = if name.is_empty() {
        fallback.to_string()
    } else {
        name
    };
    escape(name)
}

/// Turns a diagram state or event name into an enum variant identifier.
/// Names are `\w+` by construction; only digit-leading names and keywords
/// need adjusting.
pub fn variant_ident(name: &str) -> Ident {
    format_ident!("{}", escape(name.to_string()))
}

pub fn method_ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

fn escape(mut name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}
