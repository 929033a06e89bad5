use crate::utils::error::{AppError, Result};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Legislators,
    Candidate { cid: String },
}

impl Route {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let not_found = || AppError::RouteNotFound {
            path: path.to_string(),
        };

        if trimmed.is_empty() {
            return Ok(Route::Legislators);
        }

        match trimmed.strip_prefix("/candidate/") {
            Some(cid) if !cid.is_empty() && cid.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(Route::Candidate {
                    cid: cid.to_string(),
                })
            }
            _ => Err(not_found()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Legislators => "/".to_string(),
            Route::Candidate { cid } => format!("/candidate/{}", cid),
        }
    }

    /// "Go back": every view returns to the legislator list.
    pub fn back(&self) -> Route {
        Route::Legislators
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
