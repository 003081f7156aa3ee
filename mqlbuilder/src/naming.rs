//! The naming convention shared by every builder: fields are declared in
//! snake_case and rendered in the camelCase the server expects. Leading
//! underscores are kept, so `_id` stays `_id`.

/// Converts a snake_case field name into its camelCase wire spelling.
pub fn to_camel_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..name.len() - trimmed.len()]);
    let mut upper_next = false;
    for c in trimmed.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts a camelCase wire name into its snake_case field spelling.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
