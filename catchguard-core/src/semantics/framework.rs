//! Target-framework version extraction
//!
//! Parses the framework moniker string carried by the assembly-level
//! target-framework attribute. Matching is linear-time; any input that does
//! not carry a `Version=vN.N[.N[.N]]` component yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Compilation;
use super::types::ConstValue;

/// Fully qualified name of the assembly-level target-framework attribute
pub const TARGET_FRAMEWORK_ATTRIBUTE: &str = "System.Runtime.Versioning.TargetFrameworkAttribute";

static FRAMEWORK_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Version=v([0-9.]+)").expect("framework version pattern"));

/// Parsed framework version (major.minor[.build[.revision]])
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

/// Framework version of the compilation, read from its target-framework
/// attribute; `None` when the attribute or its version component is absent.
pub fn framework_version(compilation: &Compilation) -> Option<FrameworkVersion> {
    let attribute_type = compilation.type_by_metadata_name(TARGET_FRAMEWORK_ATTRIBUTE)?;
    let attribute = compilation
        .assembly_attributes
        .iter()
        .find(|a| a.class == Some(attribute_type))?;
    // Constructor signature: (string frameworkName)
    match attribute.ctor_args.first()? {
        ConstValue::Str(name) => parse_framework_name(name),
        _ => None,
    }
}

/// Parse a framework moniker such as
/// `.NETFramework,Version=v4.5.2,Profile=Client`.
pub fn parse_framework_name(framework_name: &str) -> Option<FrameworkVersion> {
    let captures = FRAMEWORK_VERSION_PATTERN.captures(framework_name)?;
    parse_version(&captures[1])
}

fn parse_version(text: &str) -> Option<FrameworkVersion> {
    let mut parts = text.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let build = match parts.next() {
        Some(part) => Some(part.parse().ok()?),
        None => None,
    };
    let revision = match parts.next() {
        Some(part) => Some(part.parse().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(FrameworkVersion {
        major,
        minor,
        build,
        revision,
    })
}
