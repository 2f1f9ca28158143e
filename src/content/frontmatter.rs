//! Front-matter parsing and serialization for post files

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

const DELIMITER: &str = "---";

/// Front-matter block at the top of a post file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Posts are drafts unless marked otherwise
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl FrontMatter {
    /// Split a post file into front-matter and body.
    ///
    /// The body is returned exactly as it appears after the closing
    /// delimiter line.
    pub fn parse<'a>(content: &'a str, path: &Path) -> Result<(Self, &'a str)> {
        let rest = content
            .strip_prefix("---\n")
            .or_else(|| content.strip_prefix("---\r\n"))
            .ok_or_else(|| invalid(path, "missing opening '---' line"))?;

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end_matches(['\n', '\r']) == DELIMITER {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];
                let fm = if yaml.trim().is_empty() {
                    FrontMatter::default()
                } else {
                    serde_yaml::from_str(yaml).map_err(|e| invalid(path, e))?
                };
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(invalid(path, "missing closing '---' line"))
    }

    /// Serialize front-matter followed by `body`
    pub fn render(&self, body: &str, path: &Path) -> Result<String> {
        let yaml = serde_yaml::to_string(self).map_err(|e| invalid(path, e))?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
    }

    pub fn parse_created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn parse_modified(&self) -> Option<DateTime<Utc>> {
        self.modified_at.as_deref().and_then(parse_timestamp)
    }
}

/// Format a timestamp the way post files store it
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a timestamp in RFC 3339 or one of the common naive layouts.
/// Naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn invalid(path: &Path, message: impl std::fmt::Display) -> Error {
    Error::FrontMatter {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}
