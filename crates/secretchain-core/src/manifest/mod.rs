//! Manifest parsing
//!
//! A manifest is a YAML list of secrets, each with an ordered list of
//! sources:
//!
//! ```yaml
//! - name: jira_token
//!   description: Token for the Jira API
//!   sources:
//!     - type: env
//!       env:
//!         key: JIRA_TOKEN
//!     - type: bash
//!       labels: [deprecated]
//!       bash:
//!         command: cat ~/.jira/token
//! ```

mod error;
mod file;
mod parser;
mod template;

pub use error::{ManifestError, ManifestResult, TemplateError};
pub use file::{ManifestFile, ManifestLevel};
pub use parser::parse_manifest;
pub use template::render as render_template;
