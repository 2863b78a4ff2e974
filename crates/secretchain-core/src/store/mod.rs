//! Secret store: loading, resolution and status reporting

mod error;
mod secrets;
mod status;

pub use error::{SecretsError, SecretsResult};
pub use secrets::{
    assert_secrets, get_secret, get_secret_with, load_secrets, parse_and_load_secrets, reset_secrets,
    AssertOptions, LoadOptions, Secrets,
};
pub use status::{check_secrets, list_secrets, SecretStatus, SecretView};
