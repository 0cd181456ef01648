use foundation::ids::LevelIndex;
use streaming::FetchError;

/// What a load was for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Boundaries(LevelIndex),
    Statistics,
}

/// A boundary or statistics load that produced nothing.
///
/// The affected level or dataset keeps its previous state; nothing retries.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadFailure {
    Fetch { target: LoadTarget, error: FetchError },
    Boundaries { level: LevelIndex, url: String, reason: String },
    Statistics { url: String, reason: String },
}

impl LoadFailure {
    pub fn target(&self) -> LoadTarget {
        match self {
            LoadFailure::Fetch { target, .. } => *target,
            LoadFailure::Boundaries { level, .. } => LoadTarget::Boundaries(*level),
            LoadFailure::Statistics { .. } => LoadTarget::Statistics,
        }
    }
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Fetch { target, error } => write!(f, "{target:?} load failed: {error}"),
            LoadFailure::Boundaries { level, url, reason } => {
                write!(f, "boundaries for {level} from {url} unusable: {reason}")
            }
            LoadFailure::Statistics { url, reason } => {
                write!(f, "statistics from {url} unusable: {reason}")
            }
        }
    }
}

impl std::error::Error for LoadFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadFailure::Fetch { error, .. } => Some(error),
            _ => None,
        }
    }
}
