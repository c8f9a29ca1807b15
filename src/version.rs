//! Version string classification for release tags and build identifiers.
use regex::Regex;
use std::sync::LazyLock;

static RELEASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(-[a-zA-Z0-9]+)*\.*(0|[1-9][0-9]*)?$",
    )
    .unwrap()
});

static DOTZERO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.0$").unwrap()
});

static BUILD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,})\+([0-9a-f]{5,40})").unwrap());

static BRANCH_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v([0-9]+\.[0-9]+)\.([0-9]+(-.+)?)").unwrap()
});

/// Kinds of version strings understood by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    /// `vMAJOR.MINOR.PATCH` with optional `-label` and build counter.
    Release,
    /// Exactly `vMAJOR.MINOR.0`: the first release of a new branch.
    DotZero,
    /// CI build counter form `<digits>+<hex>`.
    Build,
}

impl VersionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "release" => Some(Self::Release),
            "dotzero" => Some(Self::DotZero),
            "build" => Some(Self::Build),
            _ => None,
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Release => &RELEASE_REGEX,
            Self::DotZero => &DOTZERO_REGEX,
            Self::Build => &BUILD_REGEX,
        }
    }
}

/// Returns true when `version` matches the grammar of `kind`.
pub fn classify(version: &str, kind: VersionKind) -> bool {
    kind.regex().is_match(version)
}

/// Like [`classify`] but with the kind given by name. Unknown names never
/// match.
pub fn classify_named(version: &str, kind: &str) -> bool {
    VersionKind::from_name(kind)
        .map(|k| classify(version, k))
        .unwrap_or(false)
}

/// The `MAJOR.MINOR` and patch components of a release tag, as used to map
/// tags onto release branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchVersion {
    /// Full text the grammar matched.
    pub matched: String,
    /// `MAJOR.MINOR`, e.g. `1.7`.
    pub major_minor: String,
    /// Patch component including any pre-release suffix, e.g. `0` or
    /// `3-beta.1`.
    pub patch: String,
}

impl BranchVersion {
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = BRANCH_VERSION_REGEX.captures(tag)?;

        Some(Self {
            matched: caps.get(0)?.as_str().to_string(),
            major_minor: caps.get(1)?.as_str().to_string(),
            patch: caps.get(2)?.as_str().to_string(),
        })
    }

    pub fn is_patch_zero(&self) -> bool {
        self.patch == "0"
    }

    /// Name of the release branch this version ships from.
    pub fn branch_name(&self) -> String {
        format!("release-{}", self.major_minor)
    }
}
