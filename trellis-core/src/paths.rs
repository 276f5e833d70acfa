// Path composition and placeholder handling, shared by the route compiler
// and the documentation generator so the two views never disagree

use crate::RegistrationError;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Compose a base path and a sub-path, collapsing repeated separators.
///
/// The result always starts with `/` and never ends with one (except the
/// bare root).
pub fn compose(base: &str, sub: &str) -> String {
    let mut out = String::with_capacity(base.len() + sub.len() + 2);
    out.push('/');
    for segment in base.split('/').chain(sub.split('/')) {
        if segment.is_empty() {
            continue;
        }
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Validate the `:name` placeholders in a sub-path.
///
/// Each placeholder name must be a plain identifier and unique within the
/// route. Plain segments are never rejected.
pub fn validate_placeholders(path: &str) -> Result<(), RegistrationError> {
    let mut seen: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        let Some(name) = segment.strip_prefix(':') else {
            continue;
        };
        if !PLACEHOLDER_NAME.is_match(name) {
            return Err(RegistrationError::InvalidPlaceholder {
                path: path.to_string(),
                reason: format!("placeholder name {:?} is not a valid identifier", name),
            });
        }
        if seen.contains(&name) {
            return Err(RegistrationError::InvalidPlaceholder {
                path: path.to_string(),
                reason: format!("duplicate placeholder name {:?}", name),
            });
        }
        seen.push(name);
    }
    Ok(())
}

/// Extract the placeholder names of a path, in order of appearance.
pub fn placeholders(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .map(|name| name.to_string())
        .collect()
}

/// Rewrite `:name` placeholders into OpenAPI brace syntax (`{name}`).
pub fn to_brace_syntax(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
