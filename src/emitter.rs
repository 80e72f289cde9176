//! Object graph → `.vcxproj` text.
//!
//! Output is deterministic: the same project always produces byte-identical
//! text with `\n` line endings.  Values equal to their resolved default are
//! never written, so a project loaded from emitter output re-emits to the
//! same bytes.

use tracing::debug;

use crate::condition::{format_condition, split_configuration_key};
use crate::defaults::{DefaultContext, resolve_spec};
use crate::error::{ProjectError, Result};
use crate::metadata::{self, CUSTOM_BUILD_FIELDS, FILE_FIELDS, FieldSpec, Section, XmlEnum};
use crate::model::{Category, FileInfo, Keyword, Project};

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
const USER_PROPS: &str = "$(UserRootDir)\\Microsoft.Cpp.$(Platform).user.props";

/// Serialize `project` into project-file text.
pub fn emit(project: &Project) -> Result<String> {
    if project.is_folder() {
        return Err(ProjectError::FolderHasNoProjectFile(project.name.clone()));
    }
    check_slots(project)?;
    debug!(
        project = %project.name,
        configurations = project.configurations.len(),
        files = project.files.len(),
        "emitting project"
    );

    let mut w = XmlWriter::default();
    w.line(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    w.open(
        "Project",
        &[("DefaultTargets", "Build"), ("ToolsVersion", "12.0"), ("xmlns", MSBUILD_NAMESPACE)],
    );

    // ─── Configuration axis ─────────────────────────────────────────────
    w.open("ItemGroup", &[("Label", "ProjectConfigurations")]);
    for key in &project.configurations {
        let (name, platform) = split_configuration_key(key)?;
        w.open("ProjectConfiguration", &[("Include", key.as_str())]);
        w.element("Configuration", &[], name);
        w.element("Platform", &[], platform);
        w.close("ProjectConfiguration");
    }
    w.close("ItemGroup");

    write_globals(&mut w, project);
    w.empty("Import", &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.Default.props")]);

    let contexts = project
        .configurations
        .iter()
        .map(|key| DefaultContext::new(project.keyword, key))
        .collect::<Result<Vec<_>>>()?;

    for (i, ctx) in contexts.iter().enumerate() {
        let condition = format_condition(&project.configurations[i]);
        let values = configuration_values(project, i, ctx, Section::Configuration)?;
        w.group("PropertyGroup", &[("Condition", condition.as_str()), ("Label", "Configuration")], &values);
    }

    w.empty("Import", &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.props")]);
    w.open("ImportGroup", &[("Label", "ExtensionSettings")]);
    w.close("ImportGroup");

    for key in &project.configurations {
        let condition = format_condition(key);
        w.open("ImportGroup", &[("Label", "PropertySheets"), ("Condition", condition.as_str())]);
        let exists = format!("exists('{USER_PROPS}')");
        w.empty(
            "Import",
            &[("Project", USER_PROPS), ("Condition", exists.as_str()), ("Label", "LocalAppDataPlatform")],
        );
        w.close("ImportGroup");
    }

    w.empty("PropertyGroup", &[("Label", "UserMacros")]);

    for (i, ctx) in contexts.iter().enumerate() {
        let condition = format_condition(&project.configurations[i]);
        let values = configuration_values(project, i, ctx, Section::General)?;
        w.group("PropertyGroup", &[("Condition", condition.as_str())], &values);
    }

    // ─── Item definitions ───────────────────────────────────────────────
    for (i, ctx) in contexts.iter().enumerate() {
        let condition = format_condition(&project.configurations[i]);
        let mut wrappers = Vec::new();
        for section in Section::ITEM_DEFINITIONS {
            let values = configuration_values(project, i, ctx, section)?;
            if let (Some(wrapper), false) = (section.wrapper(), values.is_empty()) {
                wrappers.push((wrapper, values));
            }
        }

        if wrappers.is_empty() {
            w.empty("ItemDefinitionGroup", &[("Condition", condition.as_str())]);
            continue;
        }
        w.open("ItemDefinitionGroup", &[("Condition", condition.as_str())]);
        for (wrapper, values) in &wrappers {
            w.group(wrapper, &[], values);
        }
        w.close("ItemDefinitionGroup");
    }

    // ─── Files ──────────────────────────────────────────────────────────
    let mut categories: Vec<Category> = Vec::new();
    for file in &project.files {
        if !categories.contains(&file.category) {
            categories.push(file.category);
        }
    }
    for category in categories {
        w.open("ItemGroup", &[]);
        for file in project.files.iter().filter(|f| f.category == category) {
            write_file(&mut w, project, file, &contexts)?;
        }
        w.close("ItemGroup");
    }

    w.empty("Import", &[("Project", "$(VCTargetsPath)\\Microsoft.Cpp.targets")]);
    w.open("ImportGroup", &[("Label", "ExtensionTargets")]);
    w.close("ImportGroup");
    w.close("Project");

    Ok(w.finish())
}

/// Settings and per-file overrides must have one slot per configuration.
fn check_slots(project: &Project) -> Result<()> {
    let expected = project.configurations.len();
    let mismatch = |what: String, found: usize| ProjectError::ConfigurationCountMismatch {
        what,
        found,
        expected,
        project: project.name.clone(),
    };

    if project.project_config.len() != expected {
        return Err(mismatch("Settings".to_string(), project.project_config.len()));
    }
    match project.files.iter().find(|f| f.file_config.len() != expected) {
        Some(file) => Err(mismatch(format!("File '{}'", file.path), file.file_config.len())),
        None => Ok(()),
    }
}

fn write_globals(w: &mut XmlWriter, project: &Project) {
    w.open("PropertyGroup", &[("Label", "Globals")]);
    if !project.guid.is_empty() {
        w.element("ProjectGuid", &[], &project.guid);
    }
    w.element("IgnoreWarnCompileDuplicatedFilename", &[], "true");
    match project.keyword {
        Keyword::None => {}
        Keyword::AntPackage => w.element("AndroidBuildType", &[], "Ant"),
        Keyword::GradlePackage => w.element("AndroidBuildType", &[], "Gradle"),
        keyword => w.element("Keyword", &[], keyword.wire()),
    }
    w.element("RootNamespace", &[], &project.name);
    if project.keyword.is_mobile() {
        w.element("ApplicationType", &[], "Android");
        w.element("ApplicationTypeRevision", &[], "2.0");
    }
    w.close("PropertyGroup");
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Value selection
// ═══════════════════════════════════════════════════════════════════════════════

type Values = Vec<(&'static str, String)>;

/// Element text as written: lists get their inherit token back.
fn wire_text(spec: &FieldSpec, value: String) -> String {
    match spec.list {
        Some(format) => format.join(&value),
        None => value,
    }
}

/// Explicit project-scope values of one section that differ from their
/// default.
fn configuration_values(project: &Project, index: usize, ctx: &DefaultContext<'_>, section: Section) -> Result<Values> {
    let cfg = &project.project_config[index];
    let mut values = Values::new();

    for field in metadata::configuration_fields().filter(|f| f.spec().section == section) {
        let spec = field.spec();
        let default = resolve_spec(spec, ctx);
        match field.get(cfg, project.keyword) {
            Some(value) if default.as_deref() == Some(value.as_str()) => {}
            Some(value) => values.push((spec.element, wire_text(spec, value))),
            // packaging projects carry no compiler settings
            None if spec.default.is_some() && default.is_none() && !project.keyword.is_packaging() => {
                return Err(ProjectError::UnresolvableDefault {
                    field: spec.name.to_string(),
                    configuration: project.configurations[index].clone(),
                    project: project.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(values)
}

/// Per-file values of one configuration that differ from what the file
/// would get from the project.
fn file_values(project: &Project, file: &FileInfo, index: usize, ctx: &DefaultContext<'_>) -> Values {
    let mut values = Values::new();
    let Some(Some(fci)) = file.file_config.get(index) else {
        return values;
    };
    let common = &project.project_config[index].common;
    let keyword = project.keyword;
    let custom_build = file.category == Category::CustomBuild;

    if let (true, Some(rule)) = (custom_build, &fci.custom_build_rule) {
        for field in CUSTOM_BUILD_FIELDS {
            let Some(value) = (field.get)(rule, keyword) else { continue };
            if resolve_spec(&field.spec, ctx).as_deref() != Some(value.as_str()) {
                values.push((field.spec.element, value));
            }
        }
    }

    for field in FILE_FIELDS {
        // the rule owns ExcludedFromBuild of custom-build files
        if custom_build && field.spec.name == "ExcludedFromBuild" {
            continue;
        }
        let Some(value) = (field.get)(fci, keyword) else { continue };
        let effective = (field.get)(common, keyword).or_else(|| resolve_spec(&field.spec, ctx));
        if effective.as_deref() != Some(value.as_str()) {
            values.push((field.spec.element, wire_text(&field.spec, value)));
        }
    }
    values
}

fn write_file(w: &mut XmlWriter, project: &Project, file: &FileInfo, contexts: &[DefaultContext<'_>]) -> Result<()> {
    let tag = file.category.wire();
    let path = file.path.replace('/', "\\");
    let include = [("Include", path.as_str())];

    match file.category {
        Category::ProjectReference => {
            w.open(tag, &include);
            w.element("Project", &[], file.project_ref.as_deref().unwrap_or_default());
            w.close(tag);
            return Ok(());
        }
        Category::Reference if file.hint_path.is_some() => {
            w.open(tag, &include);
            w.element("HintPath", &[], file.hint_path.as_deref().unwrap_or_default());
            w.close(tag);
            return Ok(());
        }
        _ => {}
    }

    let mut blocks = Vec::new();
    for (i, ctx) in contexts.iter().enumerate() {
        let values = file_values(project, file, i, ctx);
        if !values.is_empty() {
            blocks.push((format_condition(&project.configurations[i]), values));
        }
    }

    if blocks.is_empty() {
        w.empty(tag, &include);
        return Ok(());
    }
    w.open(tag, &include);
    for (condition, values) in &blocks {
        for (element, text) in values {
            w.element(element, &[("Condition", condition.as_str())], text);
        }
    }
    w.close(tag);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  XmlWriter
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimal indenting writer; two spaces per level.
#[derive(Default)]
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn start_tag(tag: &str, attrs: &[(&str, &str)]) -> String {
        let mut s = format!("<{tag}");
        for (name, value) in attrs {
            s.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
        }
        s
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        let start = Self::start_tag(tag, attrs);
        self.line(&format!("{start}>"));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        let start = Self::start_tag(tag, attrs);
        self.line(&format!("{start} />"));
    }

    fn element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        let start = Self::start_tag(tag, attrs);
        self.line(&format!("{start}>{}</{tag}>", escape(text, false)));
    }

    /// Element holding `values` as children, self-closing when empty.
    fn group(&mut self, tag: &str, attrs: &[(&str, &str)], values: &[(&'static str, String)]) {
        if values.is_empty() {
            self.empty(tag, attrs);
            return;
        }
        self.open(tag, attrs);
        for (element, text) in values {
            self.element(element, &[], text);
        }
        self.close(tag);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
