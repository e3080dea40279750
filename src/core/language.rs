//! C# language level and nullable-context settings.

use std::fmt;

use serde::{Serialize, Serializer};

/// C# language version as understood by the compiler service.
///
/// Variants are declared in ascending order so that the derived `Ord`
/// matches the compiler's own numbering: `Default` is the lowest value and
/// the symbolic `LatestMajor` / `Preview` / `Latest` sort above every
/// concrete version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LanguageVersion {
    Default,
    CSharp1,
    CSharp2,
    CSharp3,
    CSharp4,
    CSharp5,
    CSharp6,
    CSharp7,
    CSharp7_1,
    CSharp7_2,
    CSharp7_3,
    CSharp8,
    CSharp9,
    CSharp10,
    CSharp11,
    CSharp12,
    LatestMajor,
    Preview,
    Latest,
}

impl LanguageVersion {
    /// Language level used when neither a props file nor the project sets one.
    pub const BASELINE: LanguageVersion = LanguageVersion::CSharp7_3;

    /// Parse a `<LangVersion>` value. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_ascii_lowercase();
        let lv = match v.as_str() {
            "default" => LanguageVersion::Default,
            "latest" => LanguageVersion::Latest,
            "latestmajor" => LanguageVersion::LatestMajor,
            "preview" => LanguageVersion::Preview,
            "1" | "1.0" | "iso-1" => LanguageVersion::CSharp1,
            "2" | "2.0" | "iso-2" => LanguageVersion::CSharp2,
            "3" | "3.0" => LanguageVersion::CSharp3,
            "4" | "4.0" => LanguageVersion::CSharp4,
            "5" | "5.0" => LanguageVersion::CSharp5,
            "6" | "6.0" => LanguageVersion::CSharp6,
            "7" | "7.0" => LanguageVersion::CSharp7,
            "7.1" => LanguageVersion::CSharp7_1,
            "7.2" => LanguageVersion::CSharp7_2,
            "7.3" => LanguageVersion::CSharp7_3,
            "8" | "8.0" => LanguageVersion::CSharp8,
            "9" | "9.0" => LanguageVersion::CSharp9,
            "10" | "10.0" => LanguageVersion::CSharp10,
            "11" | "11.0" => LanguageVersion::CSharp11,
            "12" | "12.0" => LanguageVersion::CSharp12,
            _ => return None,
        };
        Some(lv)
    }

    /// Apply an optional textual override, keeping `self` when the value
    /// is absent or not recognized.
    pub fn with_override(self, value: Option<&str>) -> Self {
        match value {
            Some(text) => match Self::parse(text) {
                Some(lv) => lv,
                None => {
                    tracing::warn!("ignoring unrecognized LangVersion `{}`", text);
                    self
                }
            },
            None => self,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageVersion::Default => "default",
            LanguageVersion::CSharp1 => "1",
            LanguageVersion::CSharp2 => "2",
            LanguageVersion::CSharp3 => "3",
            LanguageVersion::CSharp4 => "4",
            LanguageVersion::CSharp5 => "5",
            LanguageVersion::CSharp6 => "6",
            LanguageVersion::CSharp7 => "7.0",
            LanguageVersion::CSharp7_1 => "7.1",
            LanguageVersion::CSharp7_2 => "7.2",
            LanguageVersion::CSharp7_3 => "7.3",
            LanguageVersion::CSharp8 => "8.0",
            LanguageVersion::CSharp9 => "9.0",
            LanguageVersion::CSharp10 => "10.0",
            LanguageVersion::CSharp11 => "11.0",
            LanguageVersion::CSharp12 => "12.0",
            LanguageVersion::LatestMajor => "latestmajor",
            LanguageVersion::Preview => "preview",
            LanguageVersion::Latest => "latest",
        }
    }
}

impl Default for LanguageVersion {
    fn default() -> Self {
        LanguageVersion::BASELINE
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LanguageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Parse a `<Nullable>` value into the nullable-reference-types flag.
///
/// Only `enable` and `disable` are recognized; anything else leaves
/// `current` untouched.
pub fn parse_nullable(value: Option<&str>, current: bool) -> bool {
    let Some(text) = value else {
        return current;
    };
    match text.trim().to_ascii_lowercase().as_str() {
        "enable" => true,
        "disable" => false,
        other => {
            tracing::warn!("ignoring unrecognized Nullable `{}`", other);
            current
        }
    }
}
