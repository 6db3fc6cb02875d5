//! Package index lookup
//!
//! One `GET {index}/{name}/json` per run. HTTP 200 means the package exists;
//! any other status means it does not. Only a transport failure is an error.

use crate::error::{FatwheelError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Result of an index lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Missing { status: u16 },
}

impl Availability {
    pub fn from_status(status: u16) -> Self {
        if status == StatusCode::OK.as_u16() {
            Self::Available
        } else {
            Self::Missing { status }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Anything that can say whether a package exists
pub trait PackageIndex: Send {
    fn check(&self, package: &str) -> Result<Availability>;
}

/// PyPI-compatible JSON API
pub struct PypiIndex {
    client: Client,
    index_url: String,
}

impl PypiIndex {
    pub fn new(index_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fatwheel/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            client,
            index_url: index_url.into(),
        })
    }

    pub fn package_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.index_url.trim_end_matches('/'), package)
    }
}

impl PackageIndex for PypiIndex {
    fn check(&self, package: &str) -> Result<Availability> {
        let url = self.package_url(package);
        debug!(%url, "querying package index");
        let response = self.client.get(&url).send().map_err(FatwheelError::Http)?;
        Ok(Availability::from_status(response.status().as_u16()))
    }
}

/// Whether `name` is a plausible distribution name: ASCII letters, digits,
/// `.`, `_` and `-`, starting and ending with a letter or digit.
pub fn is_valid_package_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric() => {
            bytes
                .iter()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        }
        _ => false,
    }
}
