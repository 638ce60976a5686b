use std::fmt;

/// Version details baked in at compile time.
///
/// `STRAWPOLL_COMMIT` and `STRAWPOLL_BUILD_DATE` are optional and usually
/// set by release builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    version: String,
    commit: String,
    date: String,
}

impl BuildInfo {
    pub fn new(version: &str, commit: &str, date: &str) -> Self {
        let version = version.trim();
        Self {
            version: if version.is_empty() {
                "dev".to_string()
            } else {
                version.to_string()
            },
            commit: commit.trim().to_string(),
            date: date.trim().to_string(),
        }
    }

    pub fn current() -> Self {
        Self::new(
            env!("CARGO_PKG_VERSION"),
            option_env!("STRAWPOLL_COMMIT").unwrap_or(""),
            option_env!("STRAWPOLL_BUILD_DATE").unwrap_or(""),
        )
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.commit.is_empty(), self.date.is_empty()) {
            (true, true) => write!(f, "{}", self.version),
            (false, true) => write!(f, "{} ({})", self.version, self.commit),
            (true, false) => write!(f, "{} ({})", self.version, self.date),
            (false, false) => write!(f, "{} ({} {})", self.version, self.commit, self.date),
        }
    }
}
