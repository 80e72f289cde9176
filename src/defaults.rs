//! Implicit values of unset fields.
//!
//! A default depends only on the project keyword, the platform token and
//! the configuration name of a `"Name|Platform"` key.  Values equal to their
//! default are never written to the project file, so these tables must
//! match what Visual Studio assumes when an element is absent.

use crate::condition::split_configuration_key;
use crate::error::{ProjectError, Result};
use crate::metadata::{self, FieldSpec, FieldValue};
use crate::model::{DebugInformationFormat, ExceptionHandling, GenerateDebugInformation, Keyword, Project, ThumbMode};

/// Inputs of every default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultContext<'a> {
    pub keyword: Keyword,
    /// e.g. `Debug`
    pub configuration: &'a str,
    /// e.g. `x64`
    pub platform: &'a str,
}

impl<'a> DefaultContext<'a> {
    pub fn new(keyword: Keyword, key: &'a str) -> Result<Self> {
        let (configuration, platform) = split_configuration_key(key)?;
        Ok(Self {
            keyword,
            configuration,
            platform,
        })
    }
}

/// Resolve the default of the field named `field` (builder name) for one
/// configuration of `project`, as wire text.
pub fn resolve_default(project: &Project, field: &str, configuration: &str) -> Result<String> {
    let spec = metadata::configuration_field(field)
        .map(|f| f.spec())
        .ok_or_else(|| ProjectError::UnknownField {
            field: field.to_string(),
            context: format!("project '{}'", project.name),
        })?;

    let ctx = DefaultContext::new(project.keyword, configuration)?;
    resolve_spec(spec, &ctx).ok_or_else(|| ProjectError::UnresolvableDefault {
        field: field.to_string(),
        configuration: configuration.to_string(),
        project: project.name.clone(),
    })
}

/// `None` when the field has no policy or the policy has no value here.
pub fn resolve_spec(spec: &FieldSpec, ctx: &DefaultContext<'_>) -> Option<String> {
    spec.default.as_ref().and_then(|policy| policy.resolve(ctx))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Typed policies
// ═══════════════════════════════════════════════════════════════════════════════

pub fn out_dir_default(keyword: Keyword) -> &'static str {
    if keyword.is_mobile() {
        "$(SolutionDir)$(Platform)\\$(Configuration)\\"
    } else {
        "$(SolutionDir)$(Configuration)\\"
    }
}

pub fn int_dir_default(keyword: Keyword) -> &'static str {
    if keyword.is_mobile() {
        "$(Platform)\\$(Configuration)\\"
    } else {
        "$(Configuration)\\"
    }
}

pub fn target_name_default(keyword: Keyword) -> &'static str {
    if keyword.is_mobile() {
        "lib$(RootNamespace)"
    } else {
        "$(ProjectName)"
    }
}

pub fn target_ext_default(keyword: Keyword) -> &'static str {
    if keyword.is_mobile() { ".so" } else { ".dll" }
}

pub fn platform_toolset_default(keyword: Keyword) -> &'static str {
    if keyword.is_mobile() { "Clang_3_8" } else { "v140" }
}

/// Android projects have no default format; `None` means it must be set.
pub fn debug_information_format_default(platform: &str) -> Option<DebugInformationFormat> {
    match platform {
        "Win32" | "x86" => Some(DebugInformationFormat::EditAndContinue),
        "x64" => Some(DebugInformationFormat::ProgramDatabase),
        _ => None,
    }
}

/// `android-21` for 64-bit architectures, `android-19` otherwise.
pub fn android_api_level_default(platform: &str) -> &'static str {
    if platform.contains("64") {
        "android-21"
    } else {
        "android-19"
    }
}

pub fn thumb_mode_default(platform: &str) -> ThumbMode {
    if platform.contains("64") {
        ThumbMode::NotSpecified
    } else {
        ThumbMode::Thumb
    }
}

pub fn generate_debug_information_default(configuration: &str) -> GenerateDebugInformation {
    if configuration.to_ascii_lowercase().contains("debug") {
        GenerateDebugInformation::OptimizeForFasterLinking
    } else {
        GenerateDebugInformation::OptimizeForDebugging
    }
}

pub fn exception_handling_default(keyword: Keyword) -> ExceptionHandling {
    if keyword.is_mobile() {
        ExceptionHandling::NoExceptionHandling
    } else {
        ExceptionHandling::Sync
    }
}

/// Adapters from the typed policies to [`metadata::DefaultFn`].
pub(crate) mod policy {
    use super::*;

    pub fn out_dir(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(out_dir_default(ctx.keyword).to_string())
    }

    pub fn int_dir(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(int_dir_default(ctx.keyword).to_string())
    }

    pub fn target_name(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(target_name_default(ctx.keyword).to_string())
    }

    pub fn target_ext(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(target_ext_default(ctx.keyword).to_string())
    }

    pub fn platform_toolset(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(platform_toolset_default(ctx.keyword).to_string())
    }

    pub fn debug_information_format(ctx: &DefaultContext<'_>) -> Option<String> {
        debug_information_format_default(ctx.platform).map(|v| v.to_wire(ctx.keyword))
    }

    pub fn android_api_level(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(android_api_level_default(ctx.platform).to_string())
    }

    pub fn thumb_mode(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(thumb_mode_default(ctx.platform).to_wire(ctx.keyword))
    }

    pub fn generate_debug_information(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(generate_debug_information_default(ctx.configuration).to_wire(ctx.keyword))
    }

    pub fn exception_handling(ctx: &DefaultContext<'_>) -> Option<String> {
        Some(exception_handling_default(ctx.keyword).to_wire(ctx.keyword))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn project(keyword: Keyword) -> Project {
        let mut p = Project::new("native");
        p.keyword = keyword;
        p
    }

    #[test]
    fn arm64_and_arm_mobile_defaults() {
        let p = project(Keyword::Android);
        assert_eq!(resolve_default(&p, "AndroidAPILevel", "Debug|ARM64").unwrap(), "android-21");
        assert_eq!(resolve_default(&p, "ThumbMode", "Debug|ARM64").unwrap(), "NotSpecified");
        assert_eq!(resolve_default(&p, "AndroidAPILevel", "Debug|ARM").unwrap(), "android-19");
        assert_eq!(resolve_default(&p, "ThumbMode", "Debug|ARM").unwrap(), "Thumb");
    }

    #[test]
    fn directory_templates_follow_keyword() {
        let desktop = project(Keyword::Win32Proj);
        let mobile = project(Keyword::Android);
        assert_eq!(
            resolve_default(&desktop, "OutDir", "Debug|Win32").unwrap(),
            "$(SolutionDir)$(Configuration)\\"
        );
        assert_eq!(
            resolve_default(&mobile, "OutDir", "Debug|ARM").unwrap(),
            "$(SolutionDir)$(Platform)\\$(Configuration)\\"
        );
        assert_eq!(resolve_default(&desktop, "IntDir", "Debug|Win32").unwrap(), "$(Configuration)\\");
        assert_eq!(resolve_default(&mobile, "TargetName", "Debug|ARM").unwrap(), "lib$(RootNamespace)");
        assert_eq!(resolve_default(&mobile, "TargetExt", "Debug|ARM").unwrap(), ".so");
        assert_eq!(resolve_default(&desktop, "PlatformToolset", "Debug|x64").unwrap(), "v140");
        // packaging projects take the desktop column
        let package = project(Keyword::GradlePackage);
        assert_eq!(resolve_default(&package, "TargetExt", "Debug|ARM").unwrap(), ".dll");
    }

    #[test]
    fn debug_information_format_by_platform() {
        let desktop = project(Keyword::Win32Proj);
        assert_eq!(
            resolve_default(&desktop, "DebugInformationFormat", "Debug|Win32").unwrap(),
            "EditAndContinue"
        );
        assert_eq!(
            resolve_default(&desktop, "DebugInformationFormat", "Debug|x64").unwrap(),
            "ProgramDatabase"
        );

        let mobile = project(Keyword::Android);
        let err = resolve_default(&mobile, "DebugInformationFormat", "Debug|ARM").unwrap_err();
        assert!(matches!(
            err,
            ProjectError::UnresolvableDefault { ref field, ref configuration, .. }
                if field == "DebugInformationFormat" && configuration == "Debug|ARM"
        ));
    }

    #[test]
    fn configuration_name_drives_debug_information() {
        let p = project(Keyword::Win32Proj);
        assert_eq!(
            resolve_default(&p, "GenerateDebugInformation", "MyDebugBuild|x64").unwrap(),
            "DebugFastLink"
        );
        assert_eq!(resolve_default(&p, "GenerateDebugInformation", "Release|x64").unwrap(), "true");
    }

    #[test]
    fn exception_handling_spelled_per_keyword() {
        assert_eq!(
            resolve_default(&project(Keyword::Win32Proj), "ExceptionHandling", "Debug|x64").unwrap(),
            "Sync"
        );
        assert_eq!(
            resolve_default(&project(Keyword::Android), "ExceptionHandling", "Debug|ARM").unwrap(),
            "Disabled"
        );
    }

    #[test]
    fn static_defaults_and_fields_without_policy() {
        let p = project(Keyword::Win32Proj);
        assert_eq!(resolve_default(&p, "CharacterSet", "Debug|x64").unwrap(), "Unicode");
        assert_eq!(resolve_default(&p, "UseOfMfc", "Debug|x64").unwrap(), "false");
        assert_eq!(resolve_default(&p, "PrecompiledHeaderFile", "Debug|x64").unwrap(), "stdafx.h");
        assert!(matches!(
            resolve_default(&p, "RuntimeLibrary", "Debug|x64"),
            Err(ProjectError::UnresolvableDefault { .. })
        ));
        assert!(matches!(
            resolve_default(&p, "Bogus", "Debug|x64"),
            Err(ProjectError::UnknownField { .. })
        ));
        assert!(matches!(
            resolve_default(&p, "CharacterSet", "Debug"),
            Err(ProjectError::MalformedConfigurationKey(_))
        ));
    }
}
