//! `.vcxproj` text → object graph.
//!
//! Parsing is done with `roxmltree` in two passes over the root children:
//! the first collects the configuration axis and the `Globals` group (the
//! keyword decides how some enumerants are spelled), the second binds every
//! conditional group and file override to its configuration slot by key.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::condition::{configuration_key, split_configuration_key};
use crate::error::{ProjectError, Result};
use crate::metadata::{self, FieldValue, Section};
use crate::model::{Category, Keyword, Project};

// ═══════════════════════════════════════════════════════════════════════════════
//  Diagnostics
// ═══════════════════════════════════════════════════════════════════════════════

/// Schema the loader does not know.  Logged and skipped, or fatal in strict
/// mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownElement { element: String, context: String },
    UnknownGroup { label: String },
    UnknownCategory { category: String, path: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownElement { element, context } => write!(f, "unknown element <{element}> in {context}"),
            Diagnostic::UnknownGroup { label } => write!(f, "unknown group label '{label}'"),
            Diagnostic::UnknownCategory { category, path } => write!(f, "unknown file category <{category}> for '{path}'"),
        }
    }
}

impl Diagnostic {
    fn into_error(self) -> ProjectError {
        match self {
            Diagnostic::UnknownElement { element, context } => ProjectError::UnknownField { field: element, context },
            Diagnostic::UnknownGroup { label } => ProjectError::UnknownField {
                field: label,
                context: "group label".to_string(),
            },
            Diagnostic::UnknownCategory { category, path } => ProjectError::UnknownField {
                field: category,
                context: format!("file category of '{path}'"),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ProjectLoader
// ═══════════════════════════════════════════════════════════════════════════════

/// Loads project files into [`Project`]s.
///
/// # Example
/// ```no_run
/// use vcxproj_rs::ProjectLoader;
///
/// let project = ProjectLoader::new()
///     .strict(true)
///     .on_diagnostic(|d| eprintln!("{d}"))
///     .load("engine.vcxproj", None)
///     .unwrap();
/// ```
#[derive(Default)]
pub struct ProjectLoader {
    strict: bool,
    on_diagnostic: Option<Box<dyn Fn(&Diagnostic)>>,
}

impl fmt::Debug for ProjectLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectLoader")
            .field("strict", &self.strict)
            .field("on_diagnostic", &self.on_diagnostic.is_some())
            .finish()
    }
}

impl ProjectLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on unknown elements, labels and categories instead of skipping
    /// them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Called for every [`Diagnostic`] in addition to the `warn!` event.
    pub fn on_diagnostic(mut self, callback: impl Fn(&Diagnostic) + 'static) -> Self {
        self.on_diagnostic = Some(Box::new(callback));
        self
    }

    /// Load a project file from disk; `Ok(None)` when it does not exist.
    ///
    /// When `existing` is given its identity (name, location, kind, solution
    /// folder tree, dependencies) is kept and everything else comes from the
    /// file.  Without a name the project is named after `RootNamespace`, or
    /// after the file stem.
    pub fn load(&self, path: impl AsRef<Path>, existing: Option<Project>) -> Result<Option<Project>> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "project file does not exist");
            return Ok(None);
        }
        let source = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path.file_stem().and_then(|s| s.to_str());
        self.parse_named(&source, existing, stem).map(Some)
    }

    /// Parse project-file text.
    pub fn parse(&self, source: &str, existing: Option<Project>) -> Result<Project> {
        self.parse_named(source, existing, None)
    }

    fn parse_named(&self, source: &str, existing: Option<Project>, stem: Option<&str>) -> Result<Project> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let doc = roxmltree::Document::parse(source)?;
        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(ProjectError::NotAProjectFile {
                root: root.tag_name().name().to_string(),
            });
        }

        let mut project = existing.unwrap_or_default();
        project.configurations.clear();
        project.project_config.clear();
        project.files.clear();

        let mut state = LoadState {
            loader: self,
            project,
            root_namespace: None,
        };
        state.parse_header(root)?;
        state.parse_body(root)?;

        let mut project = state.project;
        if project.name.is_empty() {
            project.name = state.root_namespace.or(stem.map(String::from)).unwrap_or_default();
        }
        debug!(
            project = %project.name,
            configurations = project.configurations.len(),
            files = project.files.len(),
            "loaded project"
        );
        Ok(project)
    }

    fn report(&self, diagnostic: Diagnostic) -> Result<()> {
        warn!(strict = self.strict, "{diagnostic}");
        if let Some(callback) = &self.on_diagnostic {
            callback(&diagnostic);
        }
        if self.strict {
            return Err(diagnostic.into_error());
        }
        Ok(())
    }
}

/// Load with a default (non-strict) loader.
pub fn load_project(path: impl AsRef<Path>) -> Result<Option<Project>> {
    ProjectLoader::new().load(path, None)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Parsing – roxmltree → Project
// ═══════════════════════════════════════════════════════════════════════════════

struct LoadState<'l> {
    loader: &'l ProjectLoader,
    project: Project,
    root_namespace: Option<String>,
}

fn elements<'a, 'input>(node: roxmltree::Node<'a, 'input>) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn text<'a>(node: &roxmltree::Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}

impl LoadState<'_> {
    // ─── Pass 1: configuration axis and globals ──────────────────────────

    fn parse_header(&mut self, root: roxmltree::Node) -> Result<()> {
        for group in elements(root) {
            match (group.tag_name().name(), group.attribute("Label")) {
                ("ItemGroup", Some("ProjectConfigurations")) => {
                    for item in elements(group) {
                        self.add_configuration(item.attribute("Include").unwrap_or(""))?;
                    }
                }
                ("PropertyGroup", Some("Globals")) => self.parse_globals(group)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn add_configuration(&mut self, key: &str) -> Result<()> {
        split_configuration_key(key)?;
        if self.project.configuration_index(key).is_some() {
            return Err(ProjectError::DuplicateConfiguration {
                configuration: key.to_string(),
                project: self.project.name.clone(),
            });
        }
        self.project.configurations.push(key.to_string());
        self.project.project_config.push(Default::default());
        Ok(())
    }

    fn parse_globals(&mut self, group: roxmltree::Node) -> Result<()> {
        for child in elements(group) {
            let value = text(&child);
            match child.tag_name().name() {
                "ProjectGuid" => self.project.guid = value.to_string(),
                "Keyword" => {
                    self.project.keyword =
                        Keyword::from_wire(value, Keyword::None).ok_or_else(|| ProjectError::InvalidValue {
                            field: "Keyword".to_string(),
                            value: value.to_string(),
                            configuration: String::new(),
                            project: self.project.name.clone(),
                        })?;
                }
                "AndroidBuildType" => {
                    self.project.keyword = match value {
                        "Ant" => Keyword::AntPackage,
                        "Gradle" => Keyword::GradlePackage,
                        _ => {
                            return Err(ProjectError::InvalidValue {
                                field: "AndroidBuildType".to_string(),
                                value: value.to_string(),
                                configuration: String::new(),
                                project: self.project.name.clone(),
                            });
                        }
                    };
                }
                "RootNamespace" => self.root_namespace = Some(value.to_string()),
                "IgnoreWarnCompileDuplicatedFilename" | "ApplicationType" | "ApplicationTypeRevision" => {}
                other => self.loader.report(Diagnostic::UnknownElement {
                    element: other.to_string(),
                    context: "Globals".to_string(),
                })?,
            }
        }
        Ok(())
    }

    // ─── Pass 2: settings and files ──────────────────────────────────────

    fn parse_body(&mut self, root: roxmltree::Node) -> Result<()> {
        for group in elements(root) {
            let label = group.attribute("Label");
            match group.tag_name().name() {
                "ItemGroup" if label == Some("ProjectConfigurations") => {}
                "ItemGroup" => self.parse_files(group)?,
                "PropertyGroup" => match label {
                    Some("Globals") | Some("UserMacros") => {}
                    Some("Configuration") => self.parse_settings(group, Section::Configuration)?,
                    None if group.attribute("Condition").is_some() => self.parse_settings(group, Section::General)?,
                    None => debug!("skipping unconditional property group"),
                    Some(other) => self.loader.report(Diagnostic::UnknownGroup {
                        label: other.to_string(),
                    })?,
                },
                "ItemDefinitionGroup" => self.parse_item_definitions(group)?,
                "Import" | "ImportGroup" | "ProjectExtensions" => {}
                other => self.loader.report(Diagnostic::UnknownElement {
                    element: other.to_string(),
                    context: "Project".to_string(),
                })?,
            }
        }
        Ok(())
    }

    /// Configuration index a conditional node binds to.  Keys not in the
    /// axis are skipped.
    fn slot(&self, node: &roxmltree::Node) -> Result<Option<usize>> {
        let Some(condition) = node.attribute("Condition") else {
            return Ok(None);
        };
        let key = configuration_key(condition)?;
        let index = self.project.configuration_index(&key);
        if index.is_none() {
            debug!(project = %self.project.name, configuration = %key, "skipping settings of undeclared configuration");
        }
        Ok(index)
    }

    fn parse_settings(&mut self, group: roxmltree::Node, section: Section) -> Result<()> {
        let Some(index) = self.slot(&group)? else {
            return Ok(());
        };
        for child in elements(group) {
            self.set_configuration_field(index, &child, section)?;
        }
        Ok(())
    }

    fn parse_item_definitions(&mut self, group: roxmltree::Node) -> Result<()> {
        let Some(index) = self.slot(&group)? else {
            return Ok(());
        };
        for wrapper in elements(group) {
            let Some(section) = Section::from_wrapper(wrapper.tag_name().name()) else {
                self.loader.report(Diagnostic::UnknownElement {
                    element: wrapper.tag_name().name().to_string(),
                    context: "ItemDefinitionGroup".to_string(),
                })?;
                continue;
            };
            for child in elements(wrapper) {
                self.set_configuration_field(index, &child, section)?;
            }
        }
        Ok(())
    }

    fn set_configuration_field(&mut self, index: usize, node: &roxmltree::Node, hint: Section) -> Result<()> {
        let element = node.tag_name().name();
        let Some(field) = metadata::configuration_element(element, hint) else {
            return self.loader.report(Diagnostic::UnknownElement {
                element: element.to_string(),
                context: format!("{hint:?} settings of '{}'", self.project.configurations[index]),
            });
        };

        let spec = field.spec();
        let value = spec.list.map_or(text(node), |format| format.strip(text(node)));
        if !field.set(&mut self.project.project_config[index], value, self.project.keyword) {
            return Err(self.invalid_value(spec.name, value, index));
        }
        Ok(())
    }

    // ─── Files ───────────────────────────────────────────────────────────

    fn parse_files(&mut self, group: roxmltree::Node) -> Result<()> {
        for item in elements(group) {
            let tag = item.tag_name().name();
            let path = item.attribute("Include").unwrap_or("");
            let Some(category) = Category::from_wire(tag, self.project.keyword) else {
                self.loader.report(Diagnostic::UnknownCategory {
                    category: tag.to_string(),
                    path: path.to_string(),
                })?;
                continue;
            };

            self.project.add_file(path, category);
            let file = self.project.files.len() - 1;

            for child in elements(item) {
                match (category, child.tag_name().name()) {
                    (Category::ProjectReference, "Project") => {
                        self.project.files[file].project_ref = Some(text(&child).to_string());
                    }
                    (Category::Reference, "HintPath") => {
                        self.project.files[file].hint_path = Some(text(&child).to_string());
                    }
                    _ if child.attribute("Condition").is_some() => self.set_file_field(file, &child)?,
                    (_, other) => self.loader.report(Diagnostic::UnknownElement {
                        element: other.to_string(),
                        context: format!("file '{path}'"),
                    })?,
                }
            }
        }
        Ok(())
    }

    fn set_file_field(&mut self, file: usize, node: &roxmltree::Node) -> Result<()> {
        let Some(index) = self.slot(node)? else {
            return Ok(());
        };
        let element = node.tag_name().name();
        let keyword = self.project.keyword;
        let custom_build = self.project.files[file].category == Category::CustomBuild;

        if let Some(field) = custom_build.then(|| metadata::custom_build_field(element)).flatten() {
            let value = text(node);
            let fci = self.project.file_configuration_mut(file, index);
            if !(field.set)(fci.custom_build_rule.get_or_insert_with(Default::default), value, keyword) {
                return Err(self.invalid_value(field.spec.name, value, index));
            }
            return Ok(());
        }

        let Some(field) = metadata::file_element(element) else {
            return self.loader.report(Diagnostic::UnknownElement {
                element: element.to_string(),
                context: format!("file '{}'", self.project.files[file].path),
            });
        };
        let value = field.spec.list.map_or(text(node), |format| format.strip(text(node)));
        let fci = self.project.file_configuration_mut(file, index);
        if !(field.set)(fci, value, keyword) {
            return Err(self.invalid_value(field.spec.name, value, index));
        }
        Ok(())
    }

    fn invalid_value(&self, field: &str, value: &str, index: usize) -> ProjectError {
        ProjectError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            configuration: self.project.configurations[index].clone(),
            project: self.project.name.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing_test::traced_test;

    use super::*;
    use crate::emitter::emit;
    use crate::model::*;

    fn example() -> Project {
        ProjectLoader::new().load("example.vcxproj", None).unwrap().unwrap()
    }

    /// Wrap `body` in a minimal project with the given configuration keys.
    fn project_xml(keys: &[&str], body: &str) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Project xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n  <ItemGroup Label=\"ProjectConfigurations\">\n",
        );
        for key in keys {
            xml.push_str(&format!("    <ProjectConfiguration Include=\"{key}\" />\n"));
        }
        xml.push_str("  </ItemGroup>\n");
        xml.push_str(body);
        xml.push_str("</Project>\n");
        xml
    }

    // ── Fixture ──────────────────────────────────────────────────────────

    #[test]
    fn example_identity_and_axis() {
        let p = example();
        assert_eq!(p.name, "engine");
        assert_eq!(p.guid, "{1B2A3C4D-5E6F-4A7B-8C9D-0E1F2A3B4C5D}");
        assert_eq!(p.keyword, Keyword::Win32Proj);
        assert_eq!(p.configurations, vec!["Debug|Win32", "Release|x64"]);
        assert_eq!(p.project_config.len(), 2);
        assert!(p.files.iter().all(|f| f.file_config.len() == 2));
    }

    #[test]
    fn example_settings() {
        let p = example();
        let debug = &p.project_config[0];
        let release = &p.project_config[1];

        assert_eq!(debug.configuration_type, Some(ConfigurationType::DynamicLibrary));
        assert_eq!(debug.use_debug_libraries, Some(true));
        assert_eq!(release.whole_program_optimization, Some(WholeProgramOptimization::UseLinkTimeCodeGeneration));
        assert_eq!(release.character_set, Some(CharacterSet::MultiByte));
        assert_eq!(release.link_incremental, Some(false));
        assert_eq!(debug.link_incremental, None);
        assert_eq!(debug.include_path, "..\\include");
        assert_eq!(debug.common.preprocessor_definitions, "WIN32;_DEBUG;ENGINE_EXPORTS");
        assert_eq!(release.common.compiler_options, "/Zc:__cplusplus");
        assert_eq!(debug.generate_debug_information, Some(GenerateDebugInformation::OptimizeForDebugging));
        assert_eq!(debug.post_build_event.command, "copy /Y \"$(TargetPath)\" ..\\bin");
        assert_eq!(release.common.optimization, None);
    }

    #[test]
    fn example_files_and_overrides() {
        let p = example();
        let categories: Vec<Category> = p.files.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::ClInclude,
                Category::ClInclude,
                Category::ClCompile,
                Category::ClCompile,
                Category::ClCompile,
                Category::CustomBuild,
                Category::None,
                Category::ProjectReference,
            ]
        );

        let engine = &p.files[2];
        assert!(!engine.has_overrides());

        let pch = &p.files[3];
        for slot in &pch.file_config {
            assert_eq!(slot.as_ref().unwrap().precompiled_header, Some(PrecompiledHeader::Create));
        }

        let legacy = &p.files[4];
        let debug = legacy.file_config[0].as_ref().unwrap();
        assert_eq!(debug.compile_as, Some(CompileAs::CompileAsC));
        assert_eq!(debug.excluded_from_build, None);
        // seeded from the project value
        assert_eq!(debug.precompiled_header, Some(PrecompiledHeader::Use));
        assert_eq!(legacy.file_config[1].as_ref().unwrap().excluded_from_build, Some(true));

        let shader = &p.files[5];
        let rule = shader.file_config[0].as_ref().unwrap().custom_build_rule.as_ref().unwrap();
        assert_eq!(rule.outputs, "$(OutDir)%(Filename).cso");
        assert_eq!(rule.message, "Compiling %(Filename).hlsl");
        assert!(rule.link_objects);

        let core = &p.files[7];
        assert_eq!(core.path, "..\\core\\core.vcxproj");
        assert_eq!(core.project_ref.as_deref(), Some("{0A1B2C3D-4E5F-4061-8273-9405A6B7C8D9}"));
    }

    #[test]
    fn example_round_trips_byte_for_byte() {
        let original = std::fs::read_to_string("example.vcxproj").unwrap().replace("\r\n", "\n");
        let emitted = emit(&example()).unwrap();
        assert_eq!(emitted, original);

        let reloaded = ProjectLoader::new().parse(&emitted, None).unwrap();
        assert_eq!(emit(&reloaded).unwrap(), emitted);
    }

    // ── Binding and tolerance ────────────────────────────────────────────

    #[test]
    fn override_binds_by_key_not_position() {
        let xml = project_xml(
            &["Debug|Win32", "Release|Win32"],
            "  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='Release|Win32'\">\n    <ClCompile>\n      <WarningLevel>Level4</WarningLevel>\n    </ClCompile>\n  </ItemDefinitionGroup>\n  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\">\n    <ClCompile>\n      <WarningLevel>Level2</WarningLevel>\n    </ClCompile>\n  </ItemDefinitionGroup>\n",
        );
        let p = ProjectLoader::new().parse(&xml, None).unwrap();
        assert_eq!(p.project_config[0].warning_level, Some(WarningLevel::Level2));
        assert_eq!(p.project_config[1].warning_level, Some(WarningLevel::Level4));
    }

    #[test]
    fn file_override_binds_by_key_not_position() {
        let xml = project_xml(
            &["Debug|Win32", "Release|x64"],
            "  <ItemGroup>\n    <ClCompile Include=\"pch.cpp\">\n      <PrecompiledHeader Condition=\"'$(Configuration)|$(Platform)'=='Release|x64'\">Create</PrecompiledHeader>\n      <PrecompiledHeader Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\">Use</PrecompiledHeader>\n    </ClCompile>\n  </ItemGroup>\n",
        );
        let p = ProjectLoader::new().parse(&xml, None).unwrap();
        let headers: Vec<_> = p.files[0]
            .file_config
            .iter()
            .map(|slot| slot.as_ref().unwrap().precompiled_header)
            .collect();
        assert_eq!(headers, vec![Some(PrecompiledHeader::Use), Some(PrecompiledHeader::Create)]);
    }

    #[test]
    fn element_under_wrong_wrapper_is_reported() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let loader = ProjectLoader::new().on_diagnostic(move |d| sink.borrow_mut().push(d.clone()));

        let xml = project_xml(
            &["Debug|Win32"],
            "  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\">\n    <Link>\n      <WarningLevel>Level4</WarningLevel>\n      <SubSystem>Console</SubSystem>\n    </Link>\n  </ItemDefinitionGroup>\n",
        );
        let p = loader.parse(&xml, None).unwrap();

        assert_eq!(p.project_config[0].warning_level, None);
        assert_eq!(p.project_config[0].sub_system, Some(SubSystem::Console));
        assert_eq!(
            *seen.borrow(),
            vec![Diagnostic::UnknownElement {
                element: "WarningLevel".into(),
                context: "Link settings of 'Debug|Win32'".into(),
            }]
        );
        assert!(ProjectLoader::new().strict(true).parse(&xml, None).is_err());
    }

    #[test]
    fn packaging_keyword_comes_from_build_type() {
        let mut p = Project::new("pkg");
        p.keyword = Keyword::GradlePackage;
        p.set_configurations(&["Debug|ARM"]).unwrap();
        p.set_field("ToolName", "gradlew.bat", None).unwrap();
        p.set_field("Gradle_AndroidAppLibName", "$(RootNamespace)", None).unwrap();
        let text = emit(&p).unwrap();

        let loaded = ProjectLoader::new().strict(true).parse(&text, None).unwrap();
        assert_eq!(loaded.keyword, Keyword::GradlePackage);
        assert_eq!(loaded.project_config[0].gradle.tool_name.as_deref(), Some("gradlew.bat"));
        assert_eq!(
            loaded.project_config[0].gradle.android_app_lib_name.as_deref(),
            Some("$(RootNamespace)")
        );
        assert_eq!(loaded.project_config[0].android_app_lib_name, None);
        assert_eq!(emit(&loaded).unwrap(), text);

        let xml = project_xml(
            &["Debug|ARM"],
            "  <PropertyGroup Label=\"Globals\">\n    <AndroidBuildType>Maven</AndroidBuildType>\n  </PropertyGroup>\n",
        );
        assert!(matches!(
            ProjectLoader::new().parse(&xml, None),
            Err(ProjectError::InvalidValue { ref field, .. }) if field == "AndroidBuildType"
        ));
    }

    #[test]
    fn undeclared_configuration_is_skipped() {
        let xml = project_xml(
            &["Debug|Win32"],
            "  <PropertyGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|x64'\">\n    <OutDir>bin\\</OutDir>\n  </PropertyGroup>\n  <ItemGroup>\n    <ClCompile Include=\"a.cpp\">\n      <Optimization Condition=\"'$(Configuration)|$(Platform)'=='Profile|Win32'\">Full</Optimization>\n    </ClCompile>\n  </ItemGroup>\n",
        );
        let p = ProjectLoader::new().parse(&xml, None).unwrap();
        assert_eq!(p.project_config.len(), 1);
        assert_eq!(p.project_config[0].out_dir, None);
        assert!(!p.files[0].has_overrides());
    }

    #[test]
    fn malformed_condition_is_fatal() {
        let xml = project_xml(
            &["Debug|Win32"],
            "  <PropertyGroup Condition=\"'$(Configuration)'=='Debug'\">\n    <OutDir>bin\\</OutDir>\n  </PropertyGroup>\n",
        );
        assert!(matches!(
            ProjectLoader::new().parse(&xml, None),
            Err(ProjectError::MalformedCondition { .. })
        ));
    }

    #[test]
    fn invalid_enum_text_is_fatal() {
        let xml = project_xml(
            &["Debug|Win32"],
            "  <PropertyGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\" Label=\"Configuration\">\n    <CharacterSet>Klingon</CharacterSet>\n  </PropertyGroup>\n",
        );
        let err = ProjectLoader::new().parse(&xml, None).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::InvalidValue { ref field, ref value, .. } if field == "CharacterSet" && value == "Klingon"
        ));
    }

    #[test]
    fn duplicate_configuration_is_fatal() {
        let xml = project_xml(&["Debug|Win32", "Debug|Win32"], "");
        assert!(matches!(
            ProjectLoader::new().parse(&xml, None),
            Err(ProjectError::DuplicateConfiguration { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn unknown_schema_is_reported_and_skipped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let loader = ProjectLoader::new().on_diagnostic(move |d| sink.borrow_mut().push(d.clone()));

        let xml = project_xml(
            &["Debug|Win32"],
            "  <PropertyGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\">\n    <SpectreMitigation>Spectre</SpectreMitigation>\n    <OutDir>bin\\</OutDir>\n  </PropertyGroup>\n  <ItemGroup>\n    <Natvis Include=\"engine.natvis\" />\n  </ItemGroup>\n",
        );
        let p = loader.parse(&xml, None).unwrap();

        assert_eq!(p.project_config[0].out_dir.as_deref(), Some("bin\\"));
        assert!(p.files.is_empty());
        assert_eq!(
            *seen.borrow(),
            vec![
                Diagnostic::UnknownElement {
                    element: "SpectreMitigation".into(),
                    context: "General settings of 'Debug|Win32'".into(),
                },
                Diagnostic::UnknownCategory {
                    category: "Natvis".into(),
                    path: "engine.natvis".into(),
                },
            ]
        );
        assert!(logs_contain("unknown element <SpectreMitigation>"));
    }

    #[test]
    fn strict_mode_fails_on_unknown_schema() {
        let xml = project_xml(
            &["Debug|Win32"],
            "  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='Debug|Win32'\">\n    <Midl>\n      <TargetEnvironment>Win32</TargetEnvironment>\n    </Midl>\n  </ItemDefinitionGroup>\n",
        );
        assert!(ProjectLoader::new().parse(&xml, None).is_ok());
        let err = ProjectLoader::new().strict(true).parse(&xml, None).unwrap_err();
        assert!(matches!(err, ProjectError::UnknownField { ref field, .. } if field == "Midl"));
    }

    // ── Identity ─────────────────────────────────────────────────────────

    #[test]
    fn existing_identity_is_kept() {
        let mut existing = Project::new("renderer");
        existing.set_location("src/renderer", Some(Language::Cpp));
        existing.dependencies = Some(vec!["{0A1B2C3D-4E5F-4061-8273-9405A6B7C8D9}".into()]);
        existing.add_file("stale.cpp", Category::ClCompile);

        let p = ProjectLoader::new().load("example.vcxproj", Some(existing)).unwrap().unwrap();
        assert_eq!(p.name, "renderer");
        assert_eq!(p.relative_path.as_deref(), Some("src/renderer"));
        assert_eq!(p.dependencies.as_ref().map(Vec::len), Some(1));
        assert!(p.files.iter().all(|f| f.path != "stale.cpp"));
        assert_eq!(p.guid, "{1B2A3C4D-5E6F-4A7B-8C9D-0E1F2A3B4C5D}");
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.vcxproj");
        std::fs::write(&path, project_xml(&["Debug|Win32"], "")).unwrap();

        let p = load_project(&path).unwrap().unwrap();
        assert_eq!(p.name, "tool");
        assert!(load_project(dir.path().join("missing.vcxproj")).unwrap().is_none());
    }

    #[test]
    fn bom_and_wrong_root() {
        let xml = format!("\u{feff}{}", project_xml(&["Debug|Win32"], ""));
        assert!(ProjectLoader::new().parse(&xml, None).is_ok());

        assert!(matches!(
            ProjectLoader::new().parse("<Solution />", None),
            Err(ProjectError::NotAProjectFile { ref root }) if root == "Solution"
        ));
        assert!(matches!(
            ProjectLoader::new().parse("<Project>", None),
            Err(ProjectError::Xml(_))
        ));
    }

    #[test]
    fn android_spelling_is_read_with_keyword() {
        let xml = project_xml(
            &["Release|ARM"],
            "  <PropertyGroup Label=\"Globals\">\n    <Keyword>Android</Keyword>\n  </PropertyGroup>\n  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='Release|ARM'\">\n    <ClCompile>\n      <Optimization>MinSize</Optimization>\n      <ExceptionHandling>Enabled</ExceptionHandling>\n    </ClCompile>\n  </ItemDefinitionGroup>\n",
        );
        let p = ProjectLoader::new().parse(&xml, None).unwrap();
        assert_eq!(p.keyword, Keyword::Android);
        assert_eq!(p.project_config[0].common.optimization, Some(Optimization::MinSize));
        assert_eq!(p.project_config[0].common.exception_handling, Some(ExceptionHandling::SyncCThrow));
    }
}
