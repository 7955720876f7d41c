use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const USERNAME_REGEX_STR: &str = "^[a-z_][a-z0-9_-]{0,31}$";

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(USERNAME_REGEX_STR).unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("A username is required")]
    MissingUsername,
    #[error("Username '{username}' is invalid, must match '{expected_pattern}'")]
    InvalidUsername {
        username: String,
        expected_pattern: &'static str,
    },
}

/// The positional parameters of the provisioner, validated.
#[derive(Clone, Debug)]
pub struct JumpboxInputs {
    username: String,
    ssh_key: String,
}

impl JumpboxInputs {
    /// The SSH key is kept exactly as given. An empty key is allowed, the playbook skips
    /// installing it.
    pub fn new(username: &str, ssh_key: &str) -> Result<Self, InputError> {
        if username.trim().is_empty() {
            return Err(InputError::MissingUsername);
        }

        if !USERNAME_REGEX.is_match(username) {
            return Err(InputError::InvalidUsername {
                username: username.to_string(),
                expected_pattern: USERNAME_REGEX_STR,
            });
        }

        Ok(Self {
            username: username.to_string(),
            ssh_key: ssh_key.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn ssh_key(&self) -> &str {
        &self.ssh_key
    }

    pub fn has_ssh_key(&self) -> bool {
        !self.ssh_key.is_empty()
    }
}
