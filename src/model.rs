//! In-memory object graph of a multi-configuration Visual C++ project.
//!
//! Every scalar setting is an `Option`: `None` means "not set, use the
//! project default" and is never written to the project file.  List-valued
//! settings are `;`-joined strings where the empty string means "not set".

use std::path::{Path, PathBuf};

use crate::condition::split_configuration_key;
use crate::error::{ProjectError, Result};
use crate::metadata::{self, XmlEnum};

// ═══════════════════════════════════════════════════════════════════════════════
//  Keyword
// ═══════════════════════════════════════════════════════════════════════════════

xml_enum! {
    /// Platform family of a project.  Selects default-value policy and the
    /// spelling of a few keyword-qualified enumerants.
    #[derive(Default)]
    pub enum Keyword {
        /// Solution folders and projects that never declared one.
        #[default]
        None => "None",
        Win32Proj => "Win32Proj",
        Android => "Android",
        MfcProj => "MFCProj",
        /// Android packaging project (ant).
        AntPackage => "AntPackage",
        /// Android packaging project (gradle).
        GradlePackage => "GradlePackage",
    }
}

impl Keyword {
    /// Android native projects use clang/gcc defaults and spelling.
    pub fn is_mobile(self) -> bool {
        self == Keyword::Android
    }

    pub fn is_packaging(self) -> bool {
        matches!(self, Keyword::AntPackage | Keyword::GradlePackage)
    }

    /// Platform tokens accepted by [`Project::set_configurations`].
    pub fn platforms(self) -> &'static [&'static str] {
        if self.is_mobile() || self.is_packaging() {
            &["ARM", "ARM64", "x86", "x64"]
        } else {
            &["Win32", "x64"]
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Enumerations
// ═══════════════════════════════════════════════════════════════════════════════

xml_enum! {
    /// Kind of a file entry; the item element name in the project file.
    pub enum Category {
        /// Header file (.h)
        ClInclude => "ClInclude",
        /// Source file (.cpp)
        ClCompile => "ClCompile",
        /// Any file processed by a custom build step.
        CustomBuild => "CustomBuild",
        /// .def / .bat and everything else that is only listed.
        None => "None",
        Text => "Text",
        ResourceCompile => "ResourceCompile",
        Image => "Image",
        Content => "Content",
        AntBuildXml => "AntBuildXml",
        AndroidManifest => "AndroidManifest",
        AntProjectPropertiesFile => "AntProjectPropertiesFile",
        /// Reference to another project, carries its guid.
        ProjectReference => "ProjectReference",
        /// .NET assembly reference.
        Reference => "Reference",
        Compile => "Compile",
        GradleTemplate => "GradleTemplate",
        JavaCompile => "JavaCompile",
    }
}

xml_enum! {
    pub enum PrecompiledHeader {
        Create => "Create",
        Use => "Use",
        NotUsing => "NotUsing",
    }
}

xml_enum! {
    /// Exception handling model.  Desktop and Android toolchains spell the
    /// same model differently, see [`exception_handling_wire`].
    pub enum ExceptionHandling {
        /// /EHa
        Async => "Async",
        /// /EHs, `-fexceptions` on Android
        SyncCThrow => "SyncCThrow",
        /// /EHsc
        Sync => "Sync",
        /// /EH-, `-fno-exceptions` on Android
        NoExceptionHandling => "false",
        /// `-funwind-tables`
        UnwindTables => "UnwindTables",
    }
    qualify = exception_handling_for_keyword;
    wire_for = exception_handling_wire;
}

fn exception_handling_for_keyword(value: ExceptionHandling, keyword: Keyword) -> ExceptionHandling {
    use ExceptionHandling::*;
    match (keyword.is_mobile(), value) {
        (true, Async | Sync) => SyncCThrow,
        (false, UnwindTables) => SyncCThrow,
        _ => value,
    }
}

fn exception_handling_wire(value: ExceptionHandling, keyword: Keyword) -> &'static str {
    use ExceptionHandling::*;
    if !keyword.is_mobile() {
        return value.wire();
    }
    match value {
        NoExceptionHandling => "Disabled",
        UnwindTables => "UnwindTables",
        Async | Sync | SyncCThrow => "Enabled",
    }
}

xml_enum! {
    /// Run-time error checks.
    pub enum BasicRuntimeChecks {
        /// /RTCs
        StackFrameRuntimeCheck => "StackFrameRuntimeCheck",
        /// /RTCu
        UninitializedLocalUsageCheck => "UninitializedLocalUsageCheck",
        /// /RTC1
        EnableFastChecks => "EnableFastChecks",
        Default => "Default",
    }
}

xml_enum! {
    pub enum WarningLevel {
        TurnOffAllWarnings => "TurnOffAllWarnings",
        Level1 => "Level1",
        Level2 => "Level2",
        Level3 => "Level3",
        Level4 => "Level4",
        EnableAllWarnings => "EnableAllWarnings",
    }
}

xml_enum! {
    pub enum DebugInformationFormat {
        /// /ZI, windows only
        EditAndContinue => "EditAndContinue",
        None => "None",
        OldStyle => "OldStyle",
        /// /Zi, windows only
        ProgramDatabase => "ProgramDatabase",
        /// Android only
        LineNumber => "LineNumber",
        /// Android only
        FullDebug => "FullDebug",
    }
}

xml_enum! {
    pub enum CLanguageStandard {
        C89 => "c89",
        C99 => "c99",
        C11 => "c11",
        Gnu99 => "gnu99",
        Gnu11 => "gnu11",
    }
}

xml_enum! {
    pub enum CppLanguageStandard {
        Cpp98 => "c++98",
        Cpp11 => "c++11",
        Cpp1y => "c++1y",
        Gnupp98 => "gnu++98",
        Gnupp11 => "gnu++11",
        Gnupp1y => "gnu++1y",
    }
}

xml_enum! {
    pub enum CompileAs {
        Default => "Default" as "default",
        /// -x c++
        CompileAsCpp => "CompileAsCpp" as "cpp",
        /// -x c
        CompileAsC => "CompileAsC" as "c",
    }
}

xml_enum! {
    /// Optimization level.  `MinSpace` and `MinSize` both mean "minimize
    /// size"; the first is the desktop spelling, the second the Android one.
    pub enum Optimization {
        Custom => "Custom" as "custom",
        Disabled => "Disabled" as "off",
        MinSpace => "MinSpace" as "size",
        MinSize => "MinSize" as "size",
        MaxSpeed => "MaxSpeed" as "speed",
        Full => "Full" as "on",
    }
    qualify = optimization_for_keyword;
}

fn optimization_for_keyword(value: Optimization, keyword: Keyword) -> Optimization {
    match (keyword.is_mobile(), value) {
        (true, Optimization::MinSpace) => Optimization::MinSize,
        (false, Optimization::MinSize) => Optimization::MinSpace,
        _ => value,
    }
}

xml_enum! {
    pub enum RuntimeLibrary {
        /// /MT
        MultiThreaded => "MultiThreaded",
        /// /MTd
        MultiThreadedDebug => "MultiThreadedDebug",
        /// /MD
        MultiThreadedDll => "MultiThreadedDLL",
        /// /MDd
        MultiThreadedDebugDll => "MultiThreadedDebugDLL",
    }
}

xml_enum! {
    pub enum ConfigurationType {
        /// .exe
        Application => "Application" as "Application",
        /// .dll
        DynamicLibrary => "DynamicLibrary" as "SharedLib",
        /// .lib / .a
        StaticLibrary => "StaticLibrary" as "StaticLib",
        /// gradle library (.aar/.jar)
        Library => "Library" as "Library",
        Utility => "Utility" as "Utility",
    }
}

xml_enum! {
    pub enum CharacterSet {
        NotSet => "NotSet" as "NotSet",
        Unicode => "Unicode" as "Unicode",
        MultiByte => "MultiByte" as "MBCS",
    }
}

xml_enum! {
    pub enum UseOfMfc {
        /// Standard Windows libraries, no MFC.
        None => "false",
        Static => "Static",
        Dynamic => "Dynamic",
    }
}

xml_enum! {
    pub enum WholeProgramOptimization {
        NoWholeProgramOptimization => "false",
        /// /GL
        UseLinkTimeCodeGeneration => "true",
        ProfileGuidedInstrument => "PGInstrument",
        ProfileGuidedOptimize => "PGOptimize",
        ProfileGuidedUpdate => "PGUpdate",
    }
}

xml_enum! {
    pub enum SubSystem {
        NotSet => "NotSet",
        Windows => "Windows",
        Console => "Console",
        Native => "Native",
        EfiApplication => "EFI Application",
        EfiBootServiceDriver => "EFI Boot Service Driver",
        EfiRom => "EFI ROM",
        EfiRuntime => "EFI Runtime",
        Posix => "POSIX",
    }
}

xml_enum! {
    pub enum GenerateDebugInformation {
        No => "false" as "off",
        OptimizeForDebugging => "true" as "on",
        OptimizeForFasterLinking => "DebugFastLink" as "fastlink",
    }
}

xml_enum! {
    /// C++ runtime used by Android projects.
    pub enum UseOfStl {
        System => "system",
        GabiCppStatic => "gabi++_static",
        GabiCppShared => "gabi++_shared",
        StlportStatic => "stlport_static",
        StlportShared => "stlport_shared",
        GnustlStatic => "gnustl_static",
        GnustlShared => "gnustl_shared",
        CppStatic => "c++_static",
        CppShared => "c++_shared",
    }
}

xml_enum! {
    /// ARM or Thumb execution mode.
    pub enum ThumbMode {
        Disabled => "Disabled",
        Thumb => "Thumb",
        Arm => "ARM",
        NotSpecified => "NotSpecified",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════════════════

// ─── FileConfigurationInfo ───────────────────────────────────────────────────

/// Settings that can be given project-wide or overridden for a single file
/// in a single configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfigurationInfo {
    pub precompiled_header: Option<PrecompiledHeader>,
    pub precompiled_header_file: Option<String>,
    pub excluded_from_build: Option<bool>,
    pub preprocessor_definitions: String,
    pub additional_include_directories: String,
    pub disable_specific_warnings: String,
    pub exception_handling: Option<ExceptionHandling>,
    pub basic_runtime_checks: Option<BasicRuntimeChecks>,
    pub show_includes: Option<bool>,
    pub compile_as: Option<CompileAs>,
    pub optimization: Option<Optimization>,
    pub runtime_library: Option<RuntimeLibrary>,
    pub function_level_linking: Option<bool>,
    pub minimal_rebuild: Option<bool>,
    pub intrinsic_functions: Option<bool>,
    pub debug_information_format: Option<DebugInformationFormat>,
    pub multi_processor_compilation: Option<bool>,
    pub runtime_type_info: Option<bool>,
    pub c_language_standard: Option<CLanguageStandard>,
    pub cpp_language_standard: Option<CppLanguageStandard>,
    pub object_file_name: Option<String>,
    pub xml_documentation_file_name: Option<String>,
    /// `<ClCompile><AdditionalOptions>`, space separated.
    pub compiler_options: String,
    pub additional_dependencies: String,
    /// Android: libraries to link.
    pub library_dependencies: String,
    pub additional_library_directories: String,
    pub enable_comdat_folding: Option<bool>,
    pub optimize_references: Option<bool>,
    pub profile: Option<bool>,
    /// `<Link><AdditionalOptions>`, space separated.
    pub linker_options: String,
    /// Only used by files of [`Category::CustomBuild`].
    pub custom_build_rule: Option<CustomBuildRule>,
}

impl FileConfigurationInfo {
    /// A fresh per-file override.  The precompiled-header mode follows the
    /// project, every other field starts unset.
    pub fn seeded_from(project: &FileConfigurationInfo) -> Self {
        Self {
            precompiled_header: project.precompiled_header,
            ..Default::default()
        }
    }
}

// ─── CustomBuildRule ─────────────────────────────────────────────────────────

pub const DEFAULT_CUSTOM_BUILD_MESSAGE: &str = "Performing Custom Build Tools";

#[derive(Debug, Clone, PartialEq)]
pub struct CustomBuildRule {
    pub command: String,
    /// Empty string suppresses the message.
    pub message: String,
    pub outputs: String,
    pub additional_inputs: String,
    /// Pass outputs with a linkable extension on to the linker.
    pub link_objects: bool,
    pub excluded_from_build: bool,
}

impl Default for CustomBuildRule {
    fn default() -> Self {
        Self {
            command: String::new(),
            message: DEFAULT_CUSTOM_BUILD_MESSAGE.to_string(),
            outputs: String::new(),
            additional_inputs: String::new(),
            link_objects: true,
            excluded_from_build: false,
        }
    }
}

// ─── BuildEvent ──────────────────────────────────────────────────────────────

/// Pre-build, pre-link or post-build step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildEvent {
    pub command: String,
    /// `None` means enabled.
    pub use_in_build: Option<bool>,
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings of one `"Name|Platform"` configuration.
///
/// `common` holds the project-wide values of everything a file may
/// override; the remaining fields only exist at project scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    pub common: FileConfigurationInfo,

    // ── Label="Configuration" ──
    pub configuration_type: Option<ConfigurationType>,
    pub use_debug_libraries: Option<bool>,
    pub platform_toolset: Option<String>,
    pub whole_program_optimization: Option<WholeProgramOptimization>,
    pub character_set: Option<CharacterSet>,
    pub use_of_mfc: Option<UseOfMfc>,
    /// e.g. `android-22`
    pub android_api_level: Option<String>,
    pub use_of_stl: Option<UseOfStl>,
    pub thumb_mode: Option<ThumbMode>,

    // ── General ──
    pub link_incremental: Option<bool>,
    pub out_dir: Option<String>,
    pub int_dir: Option<String>,
    pub target_name: Option<String>,
    pub target_ext: Option<String>,
    pub include_path: String,
    pub executable_path: String,
    pub reference_path: String,
    pub library_path: String,
    pub source_path: String,
    pub exclude_path: String,

    // ── Compiler / linker ──
    pub warning_level: Option<WarningLevel>,
    pub sub_system: Option<SubSystem>,
    pub generate_debug_information: Option<GenerateDebugInformation>,
    pub module_definition_file: String,

    // ── Build events ──
    pub pre_build_event: BuildEvent,
    pub pre_link_event: BuildEvent,
    pub post_build_event: BuildEvent,

    // ── Packaging ──
    /// Ant packaging only.
    pub android_app_lib_name: Option<String>,
    pub gradle: GradleSettings,
}

/// `<GradlePackage>` settings of a gradle packaging project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradleSettings {
    /// `None` means `$(ProjectDir)app\`.
    pub project_directory: Option<String>,
    pub gradle_version: Option<String>,
    /// Usually `gradlew.bat`.
    pub tool_name: Option<String>,
    pub gradle_plugin: Option<String>,
    pub android_app_lib_name: Option<String>,
    pub application_name: Option<String>,
    pub apk_file_name: Option<String>,
    pub additional_options: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Files
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// Relative to the project file.
    pub path: String,
    pub category: Category,
    /// Referenced project guid, [`Category::ProjectReference`] only.
    pub project_ref: Option<String>,
    /// Assembly location, [`Category::Reference`] only.
    pub hint_path: Option<String>,
    /// One slot per project configuration; `None` means no override.
    pub file_config: Vec<Option<FileConfigurationInfo>>,
}

impl FileInfo {
    pub fn new(path: impl Into<String>, category: Category, configuration_count: usize) -> Self {
        Self {
            path: path.into(),
            category,
            project_ref: None,
            hint_path: None,
            file_config: vec![None; configuration_count],
        }
    }

    /// `true` when no configuration carries an override.
    pub fn has_overrides(&self) -> bool {
        self.file_config.iter().any(Option::is_some)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Project
// ═══════════════════════════════════════════════════════════════════════════════

/// What a solution entry is.  Each kind has a fixed solution host guid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectKind {
    #[default]
    Project,
    Folder,
    Packaging,
}

const HOST_GUID_PROJECT: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";
const HOST_GUID_FOLDER: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";
const HOST_GUID_PACKAGING: &str = "{39E2626F-3545-4960-A6E8-258AD8476CE5}";

impl ProjectKind {
    pub fn host_guid(self) -> &'static str {
        match self {
            ProjectKind::Project => HOST_GUID_PROJECT,
            ProjectKind::Folder => HOST_GUID_FOLDER,
            ProjectKind::Packaging => HOST_GUID_PACKAGING,
        }
    }

    pub fn from_host_guid(guid: &str) -> Result<Self> {
        match guid {
            HOST_GUID_PROJECT => Ok(ProjectKind::Project),
            HOST_GUID_FOLDER => Ok(ProjectKind::Folder),
            HOST_GUID_PACKAGING => Ok(ProjectKind::Packaging),
            _ => Err(ProjectError::InvalidHostGuid(guid.to_string())),
        }
    }
}

/// Source language; decides the project file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Cpp,
    CSharp,
}

impl Language {
    pub fn extension(self) -> &'static str {
        match self {
            Language::Cpp => ".vcxproj",
            Language::CSharp => ".csproj",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub name: String,
    /// e.g. `{65787061-7400-0000-0000-000000000000}`
    pub guid: String,
    /// Sub-folder and file name, without extension when `language` is set.
    pub relative_path: Option<String>,
    pub language: Option<Language>,
    pub kind: ProjectKind,
    pub keyword: Keyword,
    /// Directory of the owning solution, used to resolve `relative_path`.
    pub solution_dir: Option<PathBuf>,
    /// Projects grouped under this solution folder.
    pub children: Vec<Project>,
    /// `"Name|Platform"` keys in declaration order.  Change through
    /// [`Project::set_configurations`], which keeps `project_config` and every
    /// `FileInfo::file_config` the same length; [`crate::emit`] rejects a
    /// project where they differ.
    pub configurations: Vec<String>,
    /// Same length and order as `configurations`.
    pub project_config: Vec<Configuration>,
    pub files: Vec<FileInfo>,
    /// Guids of projects this one depends on.
    pub dependencies: Option<Vec<String>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A solution folder: groups child projects, produces no project file.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProjectKind::Folder,
            ..Default::default()
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ProjectKind::Folder
    }

    pub fn host_guid(&self) -> &'static str {
        self.kind.host_guid()
    }

    pub fn add_child(&mut self, child: Project) {
        self.children.push(child);
    }

    pub fn set_location(&mut self, relative_path: impl Into<String>, language: Option<Language>) {
        self.relative_path = Some(relative_path.into());
        self.language = language;
    }

    /// Relative path including the language extension, with `\` separators.
    pub fn relative_path(&self) -> Result<String> {
        let path = self
            .relative_path
            .as_deref()
            .ok_or_else(|| ProjectError::MissingLocation {
                project: self.name.clone(),
            })?
            .replace('/', "\\");

        Ok(match self.language {
            Some(lang) => path + lang.extension(),
            None => path,
        })
    }

    /// Location of the project file on disk.  The solution directory wins
    /// over `work_dir` when the project belongs to a solution.
    pub fn storage_path(&self, work_dir: &Path) -> Result<PathBuf> {
        let relative = self.relative_path()?;
        let root = self.solution_dir.as_deref().unwrap_or(work_dir);
        Ok(relative.split('\\').filter(|s| !s.is_empty()).fold(root.to_path_buf(), |p, s| p.join(s)))
    }

    // ─── Configuration axis ──────────────────────────────────────────────

    pub fn configuration_index(&self, key: &str) -> Option<usize> {
        self.configurations.iter().position(|c| c == key)
    }

    /// Distinct configuration names (e.g. `["Debug", "Release"]`) in order.
    pub fn configuration_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in self.configurations.iter().filter_map(|c| c.split_once('|')) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Distinct platforms (e.g. `["Win32", "x64"]`) in order.
    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = Vec::new();
        for (_, platform) in self.configurations.iter().filter_map(|c| c.split_once('|')) {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        platforms
    }

    /// Replace the configuration axis.
    ///
    /// Settings (project-wide and per file) of keys that survive are kept,
    /// new keys start with empty settings.  Platforms must belong to the
    /// project keyword.
    pub fn set_configurations(&mut self, keys: &[&str]) -> Result<()> {
        for (i, key) in keys.iter().enumerate() {
            let (_, platform) = split_configuration_key(key)?;
            if !self.keyword.platforms().contains(&platform) {
                return Err(ProjectError::UnsupportedPlatform {
                    platform: platform.to_string(),
                    keyword: self.keyword.wire().to_string(),
                    project: self.name.clone(),
                });
            }
            if keys[..i].contains(key) {
                return Err(ProjectError::DuplicateConfiguration {
                    configuration: key.to_string(),
                    project: self.name.clone(),
                });
            }
        }

        let old_index: Vec<Option<usize>> = keys.iter().map(|k| self.configuration_index(k)).collect();

        let mut old_config: Vec<Option<Configuration>> =
            std::mem::take(&mut self.project_config).into_iter().map(Some).collect();
        self.project_config = old_index
            .iter()
            .map(|i| i.and_then(|i| old_config[i].take()).unwrap_or_default())
            .collect();

        for file in &mut self.files {
            let mut old_slots = std::mem::take(&mut file.file_config);
            old_slots.resize(self.configurations.len(), None);
            file.file_config = old_index
                .iter()
                .map(|i| i.and_then(|i| old_slots[i].take()))
                .collect();
        }

        self.configurations = keys.iter().map(|k| k.to_string()).collect();
        Ok(())
    }

    // ─── Files ───────────────────────────────────────────────────────────

    pub fn add_file(&mut self, path: impl Into<String>, category: Category) -> &mut FileInfo {
        let count = self.configurations.len();
        self.files.push(FileInfo::new(path, category, count));
        let last = self.files.len() - 1;
        &mut self.files[last]
    }

    pub fn add_project_reference(&mut self, path: impl Into<String>, guid: impl Into<String>) {
        self.add_file(path, Category::ProjectReference).project_ref = Some(guid.into());
    }

    fn file_index(&self, path: &str) -> Result<usize> {
        let wanted = path.replace('/', "\\");
        self.files
            .iter()
            .position(|f| f.path.replace('/', "\\") == wanted)
            .ok_or_else(|| ProjectError::UnknownFile {
                path: path.to_string(),
                project: self.name.clone(),
            })
    }

    /// Configuration indices addressed by `configuration` (`None` = all).
    fn target_indices(&self, configuration: Option<&str>) -> Result<Vec<usize>> {
        match configuration {
            None => Ok((0..self.configurations.len()).collect()),
            Some(key) => self
                .configuration_index(key)
                .map(|i| vec![i])
                .ok_or_else(|| ProjectError::UnknownConfiguration {
                    configuration: key.to_string(),
                    project: self.name.clone(),
                }),
        }
    }

    /// Per-file override for one configuration, created on first use.
    ///
    /// # Panics
    ///
    /// If `file` or `configuration` is out of range.
    pub fn file_configuration_mut(&mut self, file: usize, configuration: usize) -> &mut FileConfigurationInfo {
        let project = &self.project_config[configuration].common;
        self.files[file].file_config[configuration]
            .get_or_insert_with(|| FileConfigurationInfo::seeded_from(project))
    }

    // ─── Field setters (builder API) ─────────────────────────────────────

    /// Set a project-scope field by its table name, for one configuration or
    /// for all of them.
    pub fn set_field(&mut self, field: &str, value: &str, configuration: Option<&str>) -> Result<()> {
        let spec = metadata::configuration_field(field).ok_or_else(|| ProjectError::UnknownField {
            field: field.to_string(),
            context: format!("project '{}'", self.name),
        })?;

        for i in self.target_indices(configuration)? {
            if !spec.set(&mut self.project_config[i], value, self.keyword) {
                return Err(self.invalid_value(field, value, i));
            }
        }
        Ok(())
    }

    /// Set a per-file override by its table name.  Custom-build files also
    /// accept the custom-build rule fields (`Command`, `Outputs`, …).
    pub fn set_file_field(
        &mut self,
        path: &str,
        field: &str,
        value: &str,
        configuration: Option<&str>,
    ) -> Result<()> {
        let file = self.file_index(path)?;
        let keyword = self.keyword;

        let rule_field = (self.files[file].category == Category::CustomBuild)
            .then(|| metadata::custom_build_field(field))
            .flatten();
        let file_field = metadata::file_field(field);
        if rule_field.is_none() && file_field.is_none() {
            return Err(ProjectError::UnknownField {
                field: field.to_string(),
                context: format!("file '{path}' of project '{}'", self.name),
            });
        }

        for i in self.target_indices(configuration)? {
            let fci = self.file_configuration_mut(file, i);
            let ok = match rule_field {
                Some(rf) => (rf.set)(fci.custom_build_rule.get_or_insert_with(Default::default), value, keyword),
                None => file_field.is_some_and(|ff| (ff.set)(fci, value, keyword)),
            };
            if !ok {
                return Err(self.invalid_value(field, value, i));
            }
        }
        Ok(())
    }

    fn invalid_value(&self, field: &str, value: &str, configuration: usize) -> ProjectError {
        ProjectError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            configuration: self.configurations[configuration].clone(),
            project: self.name.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
