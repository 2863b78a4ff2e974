//! Variable substitution applied to a manifest before decoding
//!
//! Placeholders take the form `{{ $.Name }}` (or `{{ .Name }}`). Only plain
//! variable references are understood; any other action is rejected.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?\.([A-Za-z_][A-Za-z0-9_]*)$").expect("variable pattern is valid")
});

/// Render `document`, replacing every placeholder with its variable
pub fn render(document: &str, variables: &HashMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(document.len());
    let mut rest = document;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);

        let action_start = start + OPEN.len();
        let len = rest[action_start..]
            .find(CLOSE)
            .ok_or(TemplateError::Unclosed(offset + start))?;
        let action = rest[action_start..action_start + len].trim();

        let name = VARIABLE
            .captures(action)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| TemplateError::UnsupportedAction(action.to_string()))?;
        let value = variables
            .get(name)
            .ok_or_else(|| TemplateError::UndefinedVariable(name.to_string()))?;
        out.push_str(value);

        let consumed = action_start + len + CLOSE.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}
