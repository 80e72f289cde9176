//! Static mapping between model fields and `.vcxproj` elements.
//!
//! Each settable field has one [`Field`] row: the name the builder API uses,
//! the element it is stored in, the section (property group or
//! item-definition wrapper) it belongs to, how lists are joined, accessors
//! converting to and from wire text, and an optional default policy.
//!
//! Enumerations implement [`XmlEnum`] through the `xml_enum!` macro, which
//! records the variant name, the wire text and an optional scripting short
//! tag per variant.  Lookups take the project [`Keyword`] because a few
//! enumerants are spelled differently for desktop and Android toolchains.

use crate::defaults::{self, DefaultContext};
use crate::model::{Configuration, CustomBuildRule, FileConfigurationInfo, Keyword};

// ═══════════════════════════════════════════════════════════════════════════════
//  Value conversion
// ═══════════════════════════════════════════════════════════════════════════════

/// Conversion between a field value and its text in the project file.
pub trait FieldValue: Sized {
    fn to_wire(&self, keyword: Keyword) -> String;
    fn from_wire(text: &str, keyword: Keyword) -> Option<Self>;
}

impl FieldValue for String {
    fn to_wire(&self, _keyword: Keyword) -> String {
        self.clone()
    }

    fn from_wire(text: &str, _keyword: Keyword) -> Option<Self> {
        Some(text.to_string())
    }
}

impl FieldValue for bool {
    fn to_wire(&self, _keyword: Keyword) -> String {
        String::from(if *self { "true" } else { "false" })
    }

    fn from_wire(text: &str, _keyword: Keyword) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

/// Enumeration with a display table.  Implemented by `xml_enum!`.
pub trait XmlEnum: Copy + PartialEq + 'static {
    /// `(variant, enumerant name, wire text)`
    const VARIANTS: &'static [(Self, &'static str, &'static str)];
    /// `(variant, scripting short tag)`; never used for file emission.
    const SCRIPT_TAGS: &'static [(Self, &'static str)];

    /// Map to the enumerant the keyword actually uses.
    fn qualify(self, _keyword: Keyword) -> Self {
        self
    }

    /// Wire text under `keyword`, after [`XmlEnum::qualify`].
    fn wire_for(self, _keyword: Keyword) -> &'static str {
        self.wire()
    }

    fn name(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(v, _, _)| *v == self)
            .map_or("", |(_, name, _)| *name)
    }

    /// Keyword-independent wire text.
    fn wire(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(v, _, _)| *v == self)
            .map_or("", |(_, _, wire)| *wire)
    }

    fn display(self, keyword: Keyword) -> &'static str {
        self.qualify(keyword).wire_for(keyword)
    }

    /// Accepts the keyword's wire text, then the enumerant name, then the
    /// plain wire text.
    fn parse(text: &str, keyword: Keyword) -> Option<Self> {
        let rows = Self::VARIANTS.iter();
        rows.clone()
            .find(|(v, _, _)| v.wire_for(keyword) == text)
            .or_else(|| rows.clone().find(|(_, name, _)| *name == text))
            .or_else(|| rows.clone().find(|(_, _, wire)| *wire == text))
            .map(|(v, _, _)| v.qualify(keyword))
    }

    fn script_tag(self) -> Option<&'static str> {
        Self::SCRIPT_TAGS
            .iter()
            .find(|(v, _)| *v == self)
            .map(|(_, tag)| *tag)
    }

    /// `"size"` resolves to `MinSpace` on desktop and `MinSize` on Android.
    fn from_script_tag(tag: &str, keyword: Keyword) -> Option<Self> {
        Self::SCRIPT_TAGS
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(v, _)| v.qualify(keyword))
    }
}

/// Declare an enumeration together with its [`XmlEnum`] display table.
///
/// ```ignore
/// xml_enum! {
///     pub enum Optimization {
///         MinSpace => "MinSpace" as "size",
///         MaxSpeed => "MaxSpeed" as "speed",
///     }
///     qualify = optimization_for_keyword;
/// }
/// ```
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal $(as $tag:literal)? ),* $(,)?
        }
        $(qualify = $qualify:path;)?
        $(wire_for = $wire_for:path;)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $crate::metadata::XmlEnum for $name {
            const VARIANTS: &'static [(Self, &'static str, &'static str)] =
                &[ $( ($name::$variant, stringify!($variant), $wire) ),* ];
            const SCRIPT_TAGS: &'static [(Self, &'static str)] =
                &[ $( $( ($name::$variant, $tag), )? )* ];

            $(
                fn qualify(self, keyword: $crate::model::Keyword) -> Self {
                    $qualify(self, keyword)
                }
            )?
            $(
                fn wire_for(self, keyword: $crate::model::Keyword) -> &'static str {
                    $wire_for(self, keyword)
                }
            )?
        }

        impl $crate::metadata::FieldValue for $name {
            fn to_wire(&self, keyword: $crate::model::Keyword) -> String {
                <Self as $crate::metadata::XmlEnum>::display(*self, keyword).to_string()
            }

            fn from_wire(text: &str, keyword: $crate::model::Keyword) -> Option<Self> {
                <Self as $crate::metadata::XmlEnum>::parse(text, keyword)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(<Self as $crate::metadata::XmlEnum>::name(*self))
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Field rows
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a field lives in the project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `<PropertyGroup Label="Configuration">`
    Configuration,
    /// Unlabeled conditional `<PropertyGroup>`.
    General,
    ClCompile,
    Link,
    PreBuildEvent,
    PreLinkEvent,
    PostBuildEvent,
    AntPackage,
    GradlePackage,
    /// Children of a `<CustomBuild>` item.
    CustomBuild,
}

impl Section {
    /// Wrappers of an `<ItemDefinitionGroup>`, in emission order.
    pub const ITEM_DEFINITIONS: [Section; 7] = [
        Section::ClCompile,
        Section::Link,
        Section::PreBuildEvent,
        Section::PreLinkEvent,
        Section::PostBuildEvent,
        Section::AntPackage,
        Section::GradlePackage,
    ];

    /// Element name of an item-definition wrapper.
    pub fn wrapper(self) -> Option<&'static str> {
        match self {
            Section::ClCompile => Some("ClCompile"),
            Section::Link => Some("Link"),
            Section::PreBuildEvent => Some("PreBuildEvent"),
            Section::PreLinkEvent => Some("PreLinkEvent"),
            Section::PostBuildEvent => Some("PostBuildEvent"),
            Section::AntPackage => Some("AntPackage"),
            Section::GradlePackage => Some("GradlePackage"),
            Section::Configuration | Section::General | Section::CustomBuild => None,
        }
    }

    /// `Configuration` or `General`.
    pub fn is_property_group(self) -> bool {
        matches!(self, Section::Configuration | Section::General)
    }

    pub fn from_wrapper(element: &str) -> Option<Section> {
        Self::ITEM_DEFINITIONS
            .into_iter()
            .find(|s| s.wrapper() == Some(element))
    }
}

/// How a list-valued field is joined and which token re-inherits the
/// values from property sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFormat {
    pub separator: &'static str,
    pub inherit: &'static str,
}

impl ListFormat {
    /// `"A;B"` → `"A;B;%(PreprocessorDefinitions)"`
    pub fn join(&self, value: &str) -> String {
        format!("{value}{}{}", self.separator, self.inherit)
    }

    /// Inverse of [`ListFormat::join`]; text without the token is returned as is.
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        if text == self.inherit {
            return "";
        }
        text.strip_suffix(self.inherit)
            .and_then(|t| t.strip_suffix(self.separator))
            .unwrap_or(text)
    }
}

pub type DefaultFn = fn(&DefaultContext<'_>) -> Option<String>;

/// Implicit value of a field that was never set.
#[derive(Debug, Clone, Copy)]
pub enum DefaultPolicy {
    /// Same wire text for every keyword and platform.
    Fixed(&'static str),
    /// Depends on keyword, platform or configuration name.  `None` means no
    /// default exists and the field must be set explicitly.
    Computed(DefaultFn),
}

impl DefaultPolicy {
    pub fn resolve(&self, ctx: &DefaultContext<'_>) -> Option<String> {
        match self {
            DefaultPolicy::Fixed(text) => Some(text.to_string()),
            DefaultPolicy::Computed(policy) => policy(ctx),
        }
    }
}

/// Type-independent part of a field row.
#[derive(Debug)]
pub struct FieldSpec {
    /// Builder API name, e.g. `ClCompile_AdditionalOptions`.
    pub name: &'static str,
    /// Element name in the project file, e.g. `AdditionalOptions`.
    pub element: &'static str,
    pub section: Section,
    pub list: Option<ListFormat>,
    pub default: Option<DefaultPolicy>,
}

pub struct Field<T: 'static> {
    pub spec: FieldSpec,
    /// Wire text of the value, `None` when unset.
    pub get: fn(&T, Keyword) -> Option<String>,
    /// Store wire text; `false` when the text is not a valid value.
    pub set: fn(&mut T, &str, Keyword) -> bool,
}

/// A field of [`Configuration`], either project-only or one of the shared
/// [`FileConfigurationInfo`] fields reached through `Configuration::common`.
#[derive(Clone, Copy)]
pub enum ConfigurationField {
    Project(&'static Field<Configuration>),
    Shared(&'static Field<FileConfigurationInfo>),
}

impl ConfigurationField {
    pub fn spec(self) -> &'static FieldSpec {
        match self {
            ConfigurationField::Project(f) => &f.spec,
            ConfigurationField::Shared(f) => &f.spec,
        }
    }

    pub fn get(self, cfg: &Configuration, keyword: Keyword) -> Option<String> {
        match self {
            ConfigurationField::Project(f) => (f.get)(cfg, keyword),
            ConfigurationField::Shared(f) => (f.get)(&cfg.common, keyword),
        }
    }

    pub fn set(self, cfg: &mut Configuration, text: &str, keyword: Keyword) -> bool {
        match self {
            ConfigurationField::Project(f) => (f.set)(cfg, text, keyword),
            ConfigurationField::Shared(f) => (f.set)(&mut cfg.common, text, keyword),
        }
    }
}

// ─── Row macros ──────────────────────────────────────────────────────────────

macro_rules! element_or_name {
    ($name:literal) => {
        $name
    };
    ($name:literal, $element:literal) => {
        $element
    };
}

macro_rules! optional {
    () => {
        None
    };
    ($policy:expr) => {
        Some($policy)
    };
}

/// `Option<T>` field converted through [`FieldValue`].
macro_rules! scalar {
    ($owner:ty, $name:literal $(=> $element:literal)?, $section:ident, $($field:ident).+ $(, default = $default:expr)?) => {
        Field::<$owner> {
            spec: FieldSpec {
                name: $name,
                element: element_or_name!($name $(, $element)?),
                section: Section::$section,
                list: None,
                default: optional!($($default)?),
            },
            get: |o: &$owner, keyword: Keyword| {
                o.$($field).+.as_ref().map(|v| FieldValue::to_wire(v, keyword))
            },
            set: |o: &mut $owner, text: &str, keyword: Keyword| match FieldValue::from_wire(text, keyword) {
                Some(v) => {
                    o.$($field).+ = Some(v);
                    true
                }
                None => false,
            },
        }
    };
}

/// `String` field where the empty string means unset.
macro_rules! text {
    ($owner:ty, $name:literal $(=> $element:literal)?, $section:ident, $($field:ident).+ $(, list = ($sep:literal, $inherit:literal))?) => {
        Field::<$owner> {
            spec: FieldSpec {
                name: $name,
                element: element_or_name!($name $(, $element)?),
                section: Section::$section,
                list: optional!($(ListFormat { separator: $sep, inherit: $inherit })?),
                default: None,
            },
            get: |o: &$owner, _: Keyword| {
                let value = &o.$($field).+;
                (!value.is_empty()).then(|| value.clone())
            },
            set: |o: &mut $owner, text: &str, _: Keyword| {
                o.$($field).+ = text.to_string();
                true
            },
        }
    };
}

use DefaultPolicy::{Computed, Fixed};

// ═══════════════════════════════════════════════════════════════════════════════
//  Tables
// ═══════════════════════════════════════════════════════════════════════════════

/// Fields that can be overridden per file.  At project scope they live in
/// `Configuration::common` and their defaults apply.
pub static FILE_FIELDS: &[Field<FileConfigurationInfo>] = &[
    scalar!(FileConfigurationInfo, "PrecompiledHeader", ClCompile, precompiled_header, default = Fixed("NotUsing")),
    scalar!(FileConfigurationInfo, "PrecompiledHeaderFile", ClCompile, precompiled_header_file, default = Fixed("stdafx.h")),
    scalar!(FileConfigurationInfo, "ExcludedFromBuild", ClCompile, excluded_from_build, default = Fixed("false")),
    text!(FileConfigurationInfo, "PreprocessorDefinitions", ClCompile, preprocessor_definitions, list = (";", "%(PreprocessorDefinitions)")),
    text!(FileConfigurationInfo, "AdditionalIncludeDirectories", ClCompile, additional_include_directories, list = (";", "%(AdditionalIncludeDirectories)")),
    text!(FileConfigurationInfo, "DisableSpecificWarnings", ClCompile, disable_specific_warnings, list = (";", "%(DisableSpecificWarnings)")),
    scalar!(FileConfigurationInfo, "ExceptionHandling", ClCompile, exception_handling, default = Computed(defaults::policy::exception_handling)),
    scalar!(FileConfigurationInfo, "BasicRuntimeChecks", ClCompile, basic_runtime_checks, default = Fixed("Default")),
    scalar!(FileConfigurationInfo, "ShowIncludes", ClCompile, show_includes, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "CompileAs", ClCompile, compile_as, default = Fixed("Default")),
    scalar!(FileConfigurationInfo, "Optimization", ClCompile, optimization, default = Fixed("MaxSpeed")),
    scalar!(FileConfigurationInfo, "RuntimeLibrary", ClCompile, runtime_library),
    scalar!(FileConfigurationInfo, "FunctionLevelLinking", ClCompile, function_level_linking, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "MinimalRebuild", ClCompile, minimal_rebuild),
    scalar!(FileConfigurationInfo, "IntrinsicFunctions", ClCompile, intrinsic_functions, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "DebugInformationFormat", ClCompile, debug_information_format, default = Computed(defaults::policy::debug_information_format)),
    scalar!(FileConfigurationInfo, "MultiProcessorCompilation", ClCompile, multi_processor_compilation, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "RuntimeTypeInfo", ClCompile, runtime_type_info, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "CLanguageStandard", ClCompile, c_language_standard),
    scalar!(FileConfigurationInfo, "CppLanguageStandard", ClCompile, cpp_language_standard),
    scalar!(FileConfigurationInfo, "ObjectFileName", ClCompile, object_file_name),
    scalar!(FileConfigurationInfo, "XMLDocumentationFileName", ClCompile, xml_documentation_file_name),
    text!(FileConfigurationInfo, "ClCompile_AdditionalOptions" => "AdditionalOptions", ClCompile, compiler_options, list = (" ", "%(AdditionalOptions)")),
    text!(FileConfigurationInfo, "AdditionalDependencies", Link, additional_dependencies, list = (";", "%(AdditionalDependencies)")),
    text!(FileConfigurationInfo, "LibraryDependencies", Link, library_dependencies, list = (";", "%(LibraryDependencies)")),
    text!(FileConfigurationInfo, "AdditionalLibraryDirectories", Link, additional_library_directories, list = (";", "%(AdditionalLibraryDirectories)")),
    scalar!(FileConfigurationInfo, "EnableCOMDATFolding", Link, enable_comdat_folding, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "OptimizeReferences", Link, optimize_references, default = Fixed("false")),
    scalar!(FileConfigurationInfo, "Profile", Link, profile, default = Fixed("false")),
    text!(FileConfigurationInfo, "Link_AdditionalOptions" => "AdditionalOptions", Link, linker_options, list = (" ", "%(AdditionalOptions)")),
];

/// Fields that only exist at project scope.
pub static CONFIGURATION_FIELDS: &[Field<Configuration>] = &[
    // ── Label="Configuration" ──
    scalar!(Configuration, "ConfigurationType", Configuration, configuration_type, default = Fixed("Application")),
    scalar!(Configuration, "UseDebugLibraries", Configuration, use_debug_libraries, default = Fixed("false")),
    scalar!(Configuration, "PlatformToolset", Configuration, platform_toolset, default = Computed(defaults::policy::platform_toolset)),
    scalar!(Configuration, "WholeProgramOptimization", Configuration, whole_program_optimization, default = Fixed("false")),
    scalar!(Configuration, "CharacterSet", Configuration, character_set, default = Fixed("Unicode")),
    scalar!(Configuration, "UseOfMfc", Configuration, use_of_mfc, default = Fixed("false")),
    scalar!(Configuration, "AndroidAPILevel", Configuration, android_api_level, default = Computed(defaults::policy::android_api_level)),
    scalar!(Configuration, "UseOfStl", Configuration, use_of_stl, default = Fixed("gnustl_static")),
    scalar!(Configuration, "ThumbMode", Configuration, thumb_mode, default = Computed(defaults::policy::thumb_mode)),
    // ── General ──
    scalar!(Configuration, "LinkIncremental", General, link_incremental, default = Fixed("true")),
    scalar!(Configuration, "OutDir", General, out_dir, default = Computed(defaults::policy::out_dir)),
    scalar!(Configuration, "IntDir", General, int_dir, default = Computed(defaults::policy::int_dir)),
    scalar!(Configuration, "TargetName", General, target_name, default = Computed(defaults::policy::target_name)),
    scalar!(Configuration, "TargetExt", General, target_ext, default = Computed(defaults::policy::target_ext)),
    text!(Configuration, "IncludePath", General, include_path, list = (";", "$(IncludePath)")),
    text!(Configuration, "ExecutablePath", General, executable_path, list = (";", "$(ExecutablePath)")),
    text!(Configuration, "ReferencePath", General, reference_path, list = (";", "$(ReferencePath)")),
    text!(Configuration, "LibraryPath", General, library_path, list = (";", "$(LibraryPath)")),
    text!(Configuration, "SourcePath", General, source_path, list = (";", "$(SourcePath)")),
    text!(Configuration, "ExcludePath", General, exclude_path, list = (";", "$(ExcludePath)")),
    scalar!(Configuration, "PreBuildEventUseInBuild", General, pre_build_event.use_in_build, default = Fixed("true")),
    scalar!(Configuration, "PreLinkEventUseInBuild", General, pre_link_event.use_in_build, default = Fixed("true")),
    scalar!(Configuration, "PostBuildEventUseInBuild", General, post_build_event.use_in_build, default = Fixed("true")),
    // ── ItemDefinitionGroup ──
    scalar!(Configuration, "WarningLevel", ClCompile, warning_level, default = Fixed("Level1")),
    scalar!(Configuration, "SubSystem", Link, sub_system, default = Fixed("NotSet")),
    scalar!(Configuration, "GenerateDebugInformation", Link, generate_debug_information, default = Computed(defaults::policy::generate_debug_information)),
    text!(Configuration, "ModuleDefinitionFile", Link, module_definition_file),
    text!(Configuration, "PreBuildEvent" => "Command", PreBuildEvent, pre_build_event.command),
    text!(Configuration, "PreLinkEvent" => "Command", PreLinkEvent, pre_link_event.command),
    text!(Configuration, "PostBuildEvent" => "Command", PostBuildEvent, post_build_event.command),
    scalar!(Configuration, "AndroidAppLibName", AntPackage, android_app_lib_name),
    scalar!(Configuration, "ProjectDirectory", GradlePackage, gradle.project_directory, default = Fixed("$(ProjectDir)app\\")),
    scalar!(Configuration, "GradleVersion", GradlePackage, gradle.gradle_version),
    scalar!(Configuration, "ToolName", GradlePackage, gradle.tool_name),
    scalar!(Configuration, "GradlePlugin", GradlePackage, gradle.gradle_plugin),
    scalar!(Configuration, "Gradle_AndroidAppLibName" => "AndroidAppLibName", GradlePackage, gradle.android_app_lib_name),
    scalar!(Configuration, "ApplicationName", GradlePackage, gradle.application_name),
    scalar!(Configuration, "ApkFileName", GradlePackage, gradle.apk_file_name),
    scalar!(Configuration, "AdditionalOptions", GradlePackage, gradle.additional_options),
];

/// Children of a `<CustomBuild>` item.  Values equal to the
/// [`CustomBuildRule`] defaults read back as unset.
pub static CUSTOM_BUILD_FIELDS: &[Field<CustomBuildRule>] = &[
    text!(CustomBuildRule, "Command", CustomBuild, command),
    Field {
        spec: FieldSpec {
            name: "Message",
            element: "Message",
            section: Section::CustomBuild,
            list: None,
            default: Some(Fixed(crate::model::DEFAULT_CUSTOM_BUILD_MESSAGE)),
        },
        get: |r: &CustomBuildRule, _: Keyword| Some(r.message.clone()),
        set: |r: &mut CustomBuildRule, text: &str, _: Keyword| {
            r.message = text.to_string();
            true
        },
    },
    text!(CustomBuildRule, "Outputs", CustomBuild, outputs),
    text!(CustomBuildRule, "AdditionalInputs", CustomBuild, additional_inputs),
    Field {
        spec: FieldSpec {
            name: "LinkObjects",
            element: "LinkObjects",
            section: Section::CustomBuild,
            list: None,
            default: Some(Fixed("true")),
        },
        get: |r: &CustomBuildRule, keyword: Keyword| Some(r.link_objects.to_wire(keyword)),
        set: |r: &mut CustomBuildRule, text: &str, keyword: Keyword| match bool::from_wire(text, keyword) {
            Some(v) => {
                r.link_objects = v;
                true
            }
            None => false,
        },
    },
    Field {
        spec: FieldSpec {
            name: "ExcludedFromBuild",
            element: "ExcludedFromBuild",
            section: Section::CustomBuild,
            list: None,
            default: Some(Fixed("false")),
        },
        get: |r: &CustomBuildRule, keyword: Keyword| Some(r.excluded_from_build.to_wire(keyword)),
        set: |r: &mut CustomBuildRule, text: &str, keyword: Keyword| match bool::from_wire(text, keyword) {
            Some(v) => {
                r.excluded_from_build = v;
                true
            }
            None => false,
        },
    },
];

// ═══════════════════════════════════════════════════════════════════════════════
//  Lookup
// ═══════════════════════════════════════════════════════════════════════════════

/// Project-only fields first, then the shared ones.
pub fn configuration_fields() -> impl Iterator<Item = ConfigurationField> {
    CONFIGURATION_FIELDS
        .iter()
        .map(ConfigurationField::Project)
        .chain(FILE_FIELDS.iter().map(ConfigurationField::Shared))
}

/// By builder name.
pub fn configuration_field(name: &str) -> Option<ConfigurationField> {
    configuration_fields().find(|f| f.spec().name == name)
}

/// By element name, inside a group or wrapper of section `hint`.
///
/// The two property groups are interchangeable (a `Label="Configuration"`
/// field found in the unlabeled group still loads), item-definition
/// wrappers are not: an element under the wrong wrapper is unknown.
pub fn configuration_element(element: &str, hint: Section) -> Option<ConfigurationField> {
    let mut fallback = None;
    for candidate in configuration_fields().filter(|f| f.spec().element == element) {
        let section = candidate.spec().section;
        if section == hint {
            return Some(candidate);
        }
        if hint.is_property_group() && section.is_property_group() {
            fallback.get_or_insert(candidate);
        }
    }
    fallback
}

pub fn file_field(name: &str) -> Option<&'static Field<FileConfigurationInfo>> {
    FILE_FIELDS.iter().find(|f| f.spec.name == name)
}

/// Element lookup inside a file item.  Items carry no wrapper, so any
/// section matches; `AdditionalOptions` is the compiler's.
pub fn file_element(element: &str) -> Option<&'static Field<FileConfigurationInfo>> {
    let mut candidates = FILE_FIELDS.iter().filter(|f| f.spec.element == element);
    let first = candidates.next()?;
    if first.spec.section == Section::ClCompile {
        return Some(first);
    }
    candidates.find(|f| f.spec.section == Section::ClCompile).or(Some(first))
}

/// Custom-build rule fields use the element name as builder name.
pub fn custom_build_field(name: &str) -> Option<&'static Field<CustomBuildRule>> {
    CUSTOM_BUILD_FIELDS.iter().find(|f| f.spec.name == name)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
