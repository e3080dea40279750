//! Target framework monikers, runtime flavors and assembly-variant
//! compatibility.
//!
//! Packages ship one `lib/<moniker>/` directory per target environment. This
//! module classifies those monikers and ranks them against the target of the
//! project being resolved using an explicit compatibility table instead of
//! string ordering.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Serialize, Serializer};

static NET_FRAMEWORK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^net(\d)(\d)(\d)?$").expect("valid regex"));
static NET_CORE_APP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^netcoreapp(\d+)\.(\d+)$").expect("valid regex"));
static NET_STANDARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^netstandard(\d+)\.(\d+)$").expect("valid regex"));
static NET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^net(\d+)\.(\d+)$").expect("valid regex"));

/// Target frameworks that only run on the mono binary layout.
///
/// `netcoreapp3.x` is deliberately absent: those are still shipped with
/// current dotnet SDKs.
pub const MONO_MONIKERS: &[&str] = &[
    "net11",
    "net20",
    "net35",
    "net40",
    "net403",
    "net45",
    "net451",
    "net452",
    "net46",
    "net461",
    "net462",
    "net47",
    "net471",
    "net472",
    "net48",
    "netcoreapp1.0",
    "netcoreapp1.1",
    "netcoreapp2.0",
    "netcoreapp2.1",
    "netcoreapp2.2",
];

/// Broad family of a target framework moniker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkKind {
    /// `net11` .. `net48`
    NetFramework(Version),
    /// `netcoreapp1.0` .. `netcoreapp3.1`
    NetCoreApp(Version),
    /// `net5.0` and later
    Net(Version),
    /// `netstandard1.0` .. `netstandard2.1`
    NetStandard(Version),
    /// Anything else (`portable-*`, platform-suffixed monikers, ...)
    Other,
}

/// How far up the netstandard ladder a target can consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardSupport {
    /// Unknown target; do not filter.
    Any,
    /// netstandard versions up to and including this one.
    UpTo(Version),
    /// The target cannot consume netstandard assemblies at all.
    Unsupported,
}

/// A parsed target framework moniker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFramework {
    moniker: String,
    kind: FrameworkKind,
}

impl TargetFramework {
    /// Parse a moniker. Never fails; unknown shapes become `FrameworkKind::Other`.
    pub fn parse(moniker: &str) -> Self {
        let moniker = moniker.trim().to_ascii_lowercase();
        let kind = classify(&moniker);
        TargetFramework { moniker, kind }
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    pub fn kind(&self) -> &FrameworkKind {
        &self.kind
    }

    /// The highest netstandard version this target can consume.
    pub fn standard_support(&self) -> StandardSupport {
        match &self.kind {
            FrameworkKind::NetStandard(v) => StandardSupport::UpTo(v.clone()),
            FrameworkKind::Net(_) => StandardSupport::UpTo(Version::new(2, 1, 0)),
            FrameworkKind::NetCoreApp(v) => {
                let ceiling = if v.major >= 3 {
                    Version::new(2, 1, 0)
                } else if v.major == 2 {
                    Version::new(2, 0, 0)
                } else {
                    Version::new(1, 6, 0)
                };
                StandardSupport::UpTo(ceiling)
            }
            FrameworkKind::NetFramework(v) => {
                if *v >= Version::new(4, 6, 1) {
                    StandardSupport::UpTo(Version::new(2, 0, 0))
                } else if *v >= Version::new(4, 6, 0) {
                    StandardSupport::UpTo(Version::new(1, 3, 0))
                } else if *v >= Version::new(4, 5, 1) {
                    StandardSupport::UpTo(Version::new(1, 2, 0))
                } else if *v >= Version::new(4, 5, 0) {
                    StandardSupport::UpTo(Version::new(1, 1, 0))
                } else {
                    StandardSupport::Unsupported
                }
            }
            FrameworkKind::Other => StandardSupport::Any,
        }
    }

    /// `major.minor` of the shared runtime a core/net target runs on.
    pub fn runtime_version(&self) -> Option<(u64, u64)> {
        match &self.kind {
            FrameworkKind::NetCoreApp(v) | FrameworkKind::Net(v) => Some((v.major, v.minor)),
            _ => None,
        }
    }

    /// Mono reference-assembly directory name (`net461` => `4.6.1-api`).
    pub fn mono_api_dir(&self) -> Option<String> {
        match &self.kind {
            FrameworkKind::NetFramework(_) => {
                let digits: Vec<String> = self
                    .moniker
                    .trim_start_matches("net")
                    .chars()
                    .map(|c| c.to_string())
                    .collect();
                Some(format!("{}-api", digits.join(".")))
            }
            _ => None,
        }
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.moniker)
    }
}

impl Serialize for TargetFramework {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.moniker)
    }
}

fn number(caps: &regex::Captures<'_>, i: usize) -> u64 {
    caps.get(i)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn classify(moniker: &str) -> FrameworkKind {
    if let Some(c) = NET_FRAMEWORK.captures(moniker) {
        return FrameworkKind::NetFramework(Version::new(number(&c, 1), number(&c, 2), number(&c, 3)));
    }
    if let Some(c) = NET_CORE_APP.captures(moniker) {
        return FrameworkKind::NetCoreApp(Version::new(number(&c, 1), number(&c, 2), 0));
    }
    if let Some(c) = NET_STANDARD.captures(moniker) {
        return FrameworkKind::NetStandard(Version::new(number(&c, 1), number(&c, 2), 0));
    }
    if let Some(c) = NET.captures(moniker) {
        let major = number(&c, 1);
        if major >= 5 {
            return FrameworkKind::Net(Version::new(major, number(&c, 2), 0));
        }
    }
    FrameworkKind::Other
}

/// One of the two supported binary-layout families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFlavor {
    Mono,
    DotNet,
}

impl RuntimeFlavor {
    /// Older framework monikers imply mono, everything else dotnet.
    pub fn for_target(target: &TargetFramework) -> Self {
        if MONO_MONIKERS.contains(&target.moniker()) {
            RuntimeFlavor::Mono
        } else {
            RuntimeFlavor::DotNet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeFlavor::Mono => "mono",
            RuntimeFlavor::DotNet => "dotnet",
        }
    }
}

impl fmt::Display for RuntimeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mono" => Ok(RuntimeFlavor::Mono),
            "dotnet" => Ok(RuntimeFlavor::DotNet),
            _ => Err(format!(
                "invalid runtime flavor '{}'; expected 'mono' or 'dotnet'",
                s
            )),
        }
    }
}

impl Serialize for RuntimeFlavor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Family of a package's `lib/<moniker>` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VariantFamily {
    /// .NET Framework builds; selecting one requires `mscorlib.dll`.
    Legacy,
    /// netstandard builds; selecting one requires `netstandard.dll`.
    Standard,
    /// netcoreapp / net5+ builds, dotnet flavor only.
    Core,
}

/// A recognized assembly variant directory inside a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibVariant {
    pub moniker: String,
    pub family: VariantFamily,
    pub version: Version,
}

impl LibVariant {
    /// Classify a `lib/` subdirectory name; `None` if it is not a family we load.
    pub fn classify(moniker: &str) -> Option<Self> {
        let tf = TargetFramework::parse(moniker);
        let (family, version) = match tf.kind {
            FrameworkKind::NetFramework(v) => (VariantFamily::Legacy, v),
            FrameworkKind::NetStandard(v) => (VariantFamily::Standard, v),
            FrameworkKind::NetCoreApp(v) | FrameworkKind::Net(v) => (VariantFamily::Core, v),
            FrameworkKind::Other => return None,
        };
        Some(LibVariant {
            moniker: tf.moniker,
            family,
            version,
        })
    }

    /// Whether a project targeting `target` on `flavor` can load this variant.
    pub fn is_compatible(&self, target: &TargetFramework, flavor: RuntimeFlavor) -> bool {
        match self.family {
            VariantFamily::Core => {
                flavor == RuntimeFlavor::DotNet
                    && match target.kind() {
                        FrameworkKind::NetCoreApp(t) | FrameworkKind::Net(t) => self.version <= *t,
                        _ => false,
                    }
            }
            VariantFamily::Standard => match target.standard_support() {
                StandardSupport::Any => true,
                StandardSupport::UpTo(ceiling) => self.version <= ceiling,
                StandardSupport::Unsupported => false,
            },
            VariantFamily::Legacy => match target.kind() {
                FrameworkKind::NetFramework(t) => self.version <= *t,
                _ => true,
            },
        }
    }
}

/// Pick the best compatible variant among `monikers`.
///
/// Ranking is Core > Standard > Legacy, then the higher version within a
/// family. Unrecognized or incompatible monikers are never chosen.
pub fn select_variant<'a, I>(monikers: I, target: &TargetFramework, flavor: RuntimeFlavor) -> Option<LibVariant>
where
    I: IntoIterator<Item = &'a str>,
{
    monikers
        .into_iter()
        .filter_map(LibVariant::classify)
        .filter(|v| v.is_compatible(target, flavor))
        .max_by(|a, b| (a.family, &a.version).cmp(&(b.family, &b.version)))
}
