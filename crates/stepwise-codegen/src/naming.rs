//! Identifier conversion for generated Rust code.

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Convert to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;

    for c in s.chars() {
        if !c.is_alphanumeric() {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'T');
    }
    result
}

/// Convert to a lowercase identifier usable as a field or module name.
pub fn to_snake_ident(s: &str) -> String {
    let mut result: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Escape an identifier that collides with a keyword.
pub fn escape_keyword(ident: &str) -> String {
    if RESERVED.contains(&ident) {
        format!("{}_", ident)
    } else if KEYWORDS.contains(&ident) {
        format!("r#{}", ident)
    } else {
        ident.to_string()
    }
}

/// Rust field name for a column, and whether it differs from the column name.
pub fn field_name(column: &str) -> (String, bool) {
    let ident = escape_keyword(&to_snake_ident(column));
    let renamed = ident.trim_start_matches("r#") != column;
    (ident, renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("users"), "Users");
        assert_eq!(to_pascal_case("feedback_contents"), "FeedbackContents");
        assert_eq!(to_pascal_case("order-items"), "OrderItems");
        assert_eq!(to_pascal_case("2fa_codes"), "T2faCodes");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(field_name("email"), ("email".to_string(), false));
        assert_eq!(field_name("type"), ("r#type".to_string(), false));
        assert_eq!(field_name("self"), ("self_".to_string(), true));
        assert_eq!(field_name("Created At"), ("created_at".to_string(), true));
        assert_eq!(field_name("1st"), ("_1st".to_string(), true));
    }
}
