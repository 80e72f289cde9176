//! Saving projects without touching files that are already current.

use std::path::Path;

use tracing::info;

use crate::emitter::emit;
use crate::error::{ProjectError, Result};
use crate::model::Project;

const BOM: char = '\u{feff}';

/// What [`save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file on disk already had the emitted content.
    UpToDate,
    Written,
}

/// Emit `project` and write it to its storage path below `work_dir` (or
/// below its solution directory), unless the file already has that content.
///
/// The comparison ignores a byte-order mark and CRLF versus LF.  A rewritten
/// file keeps the BOM and line-ending style it had.
pub fn save(project: &Project, work_dir: impl AsRef<Path>) -> Result<SaveOutcome> {
    if project.is_folder() {
        return Err(ProjectError::FolderHasNoProjectFile(project.name.clone()));
    }
    let path = project.storage_path(work_dir.as_ref())?;
    let text = emit(project)?;

    let io_error = |source| ProjectError::Io {
        path: path.clone(),
        source,
    };

    let current = if path.exists() {
        Some(std::fs::read_to_string(&path).map_err(io_error)?)
    } else {
        None
    };

    let (bom, crlf) = match &current {
        Some(current) => {
            let body = current.strip_prefix(BOM).unwrap_or(current);
            if body.replace("\r\n", "\n") == text {
                info!(project = %project.name, path = %path.display(), "up-to-date");
                return Ok(SaveOutcome::UpToDate);
            }
            (current.starts_with(BOM), body.contains("\r\n"))
        }
        None => (false, false),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 16);
    if bom {
        out.push(BOM);
    }
    if crlf {
        out.push_str(&text.replace('\n', "\r\n"));
    } else {
        out.push_str(&text);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ProjectError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, out).map_err(io_error)?;
    info!(project = %project.name, path = %path.display(), "written");
    Ok(SaveOutcome::Written)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::model::{Keyword, Language};

    fn project() -> Project {
        let mut p = Project::new("engine");
        p.keyword = Keyword::Win32Proj;
        p.set_location("native/engine", Some(Language::Cpp));
        p.set_configurations(&["Debug|Win32", "Release|Win32"]).unwrap();
        p
    }

    #[test]
    fn second_save_is_up_to_date() {
        let dir = tempdir().unwrap();
        let p = project();

        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::Written);
        let path = dir.path().join("native").join("engine.vcxproj");
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, emit(&p).unwrap());

        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::UpToDate);
    }

    #[test]
    fn changed_project_is_rewritten() {
        let dir = tempdir().unwrap();
        let mut p = project();
        save(&p, dir.path()).unwrap();

        p.set_field("WarningLevel", "Level4", None).unwrap();
        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::Written);
        let path = p.storage_path(dir.path()).unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("<WarningLevel>Level4</WarningLevel>"));
    }

    #[test]
    fn crlf_and_bom_are_ignored_and_preserved() {
        let dir = tempdir().unwrap();
        let mut p = project();
        let path = p.storage_path(dir.path()).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let windows = format!("\u{feff}{}", emit(&p).unwrap().replace('\n', "\r\n"));
        fs::write(&path, &windows).unwrap();
        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::UpToDate);
        assert_eq!(fs::read_to_string(&path).unwrap(), windows);

        p.set_field("CharacterSet", "MultiByte", None).unwrap();
        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::Written);
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with('\u{feff}'));
        assert!(rewritten.contains("<CharacterSet>MultiByte</CharacterSet>\r\n"));
        assert!(!rewritten.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn multi_line_command_saves_once() {
        let dir = tempdir().unwrap();
        let mut p = project();
        p.set_field("PostBuildEvent", "copy a b\r\ncopy c d", None).unwrap();

        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::Written);
        assert_eq!(save(&p, dir.path()).unwrap(), SaveOutcome::UpToDate);

        let path = p.storage_path(dir.path()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains('\r'));

        let loaded = crate::loader::ProjectLoader::new()
            .load(&path, Some(p.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.project_config[0].post_build_event.command, "copy a b\r\ncopy c d");
    }

    #[test]
    fn solution_dir_wins_over_work_dir() {
        let work = tempdir().unwrap();
        let solution = tempdir().unwrap();
        let mut p = project();
        p.solution_dir = Some(solution.path().to_path_buf());

        save(&p, work.path()).unwrap();
        assert!(solution.path().join("native").join("engine.vcxproj").exists());
        assert!(!work.path().join("native").exists());
    }

    #[test]
    fn folders_and_unlocated_projects_are_rejected() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            save(&Project::folder("libs"), dir.path()),
            Err(ProjectError::FolderHasNoProjectFile(_))
        ));
        assert!(matches!(
            save(&Project::new("loose"), dir.path()),
            Err(ProjectError::MissingLocation { .. })
        ));
    }
}
