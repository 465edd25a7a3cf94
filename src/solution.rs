//! Solution files that generated projects get registered in.
//!
//! Only the parts of the format needed to append projects are understood:
//! the header, `Project(...)`/`EndProject` blocks, and the global section,
//! which is kept verbatim.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};
use crate::language::SourceLanguage;

pub const DEFAULT_FORMAT_VERSION: &str = "12.00";
pub const DEFAULT_MINIMUM_VS_VERSION: &str = "10.0.40219.1";

const FORMAT_HEADER: &str = "Microsoft Visual Studio Solution File, Format Version ";
const MINIMUM_VERSION_KEY: &str = "MinimumVisualStudioVersion";
static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\("\{([^}]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([^}]+)\}"\s*$"#,
    )
    .expect("project line pattern is valid")
});

/// Aggregate of projects that generated project files are added to.
pub trait Solution {
    /// Adds a project by absolute path. Returns `false` if it was already present.
    fn add_project(&mut self, project: &Path) -> Result<bool>;

    /// Persists the solution.
    fn save(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlnProject {
    pub type_guid: String,
    pub name: String,
    /// Path relative to the solution directory, with `\` separators.
    pub path: String,
    pub guid: String,
    lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SlnFile {
    path: PathBuf,
    pub format_version: String,
    pub minimum_vs_version: Option<String>,
    header: Vec<String>,
    projects: Vec<SlnProject>,
    global: Vec<String>,
}

impl SlnFile {
    /// Creates an empty solution that will be written to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
            minimum_vs_version: Some(DEFAULT_MINIMUM_VS_VERSION.to_string()),
            header: Vec::new(),
            projects: Vec::new(),
            global: Vec::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Loads `path` if it exists, otherwise creates a new solution.
    /// The flag is `true` when the solution was created.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.is_file() {
            Ok((Self::load(path)?, false))
        } else {
            Ok((Self::create(path), true))
        }
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::SolutionError(format!("Invalid solution `{}`. {}", path.display(), reason))
        };

        let mut sln = Self::create(path);
        sln.minimum_vs_version = None;
        let mut format_version = None;
        let mut current: Option<SlnProject> = None;
        let mut in_global = false;

        for line in content.trim_start_matches('\u{feff}').lines() {
            let line = line.trim_end_matches('\r');
            if in_global {
                sln.global.push(line.to_string());
                continue;
            }
            if let Some(project) = current.as_mut() {
                project.lines.push(line.to_string());
                if line.trim() == "EndProject" {
                    sln.projects.extend(current.take());
                }
                continue;
            }

            let trimmed = line.trim();
            if let Some(version) = trimmed.strip_prefix(FORMAT_HEADER) {
                format_version = Some(version.trim().to_string());
            } else if let Some(caps) = PROJECT_LINE.captures(trimmed) {
                current = Some(SlnProject {
                    type_guid: caps[1].to_string(),
                    name: caps[2].to_string(),
                    path: caps[3].to_string(),
                    guid: caps[4].to_string(),
                    lines: vec![line.to_string()],
                });
            } else if trimmed.starts_with("Project(") {
                return Err(invalid(&format!("Malformed project line '{}'", trimmed)));
            } else if trimmed == "Global" {
                in_global = true;
                sln.global.push(line.to_string());
            } else if let Some((key, value)) = trimmed.split_once('=') {
                if key.trim() == MINIMUM_VERSION_KEY {
                    sln.minimum_vs_version = Some(value.trim().to_string());
                } else {
                    sln.header.push(trimmed.to_string());
                }
            } else if !trimmed.is_empty() {
                sln.header.push(trimmed.to_string());
            }
        }

        if current.is_some() {
            return Err(invalid("Project block is missing 'EndProject'"));
        }
        sln.format_version = format_version.ok_or_else(|| invalid("File header is missing"))?;
        Ok(sln)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[SlnProject] {
        &self.projects
    }

    fn directory(&self) -> PathBuf {
        let absolute = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        absolute.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Serialized contents, with CRLF line endings.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = vec![
            String::new(),
            format!("{}{}", FORMAT_HEADER, self.format_version),
        ];
        lines.extend(self.header.iter().cloned());
        if let Some(minimum) = &self.minimum_vs_version {
            lines.push(format!("{} = {}", MINIMUM_VERSION_KEY, minimum));
        }
        for project in &self.projects {
            lines.extend(project.lines.iter().cloned());
        }
        if self.global.is_empty() {
            lines.extend(
                [
                    "Global",
                    "\tGlobalSection(SolutionProperties) = preSolution",
                    "\t\tHideSolutionNode = FALSE",
                    "\tEndGlobalSection",
                    "EndGlobal",
                ]
                .map(String::from),
            );
        } else {
            lines.extend(self.global.iter().cloned());
        }
        let mut text = lines.join("\r\n");
        text.push_str("\r\n");
        text
    }
}

impl Solution for SlnFile {
    fn add_project(&mut self, project: &Path) -> Result<bool> {
        let extension = project
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let language = SourceLanguage::from_project_extension(extension).ok_or_else(|| {
            Error::SolutionError(format!(
                "Unsupported project type '{}'",
                project.display()
            ))
        })?;

        let relative = relative_path(&self.directory(), project)
            .to_string_lossy()
            .replace('/', "\\");
        if self
            .projects
            .iter()
            .any(|p| p.path.eq_ignore_ascii_case(&relative))
        {
            debug!("Project '{}' already in solution", relative);
            return Ok(false);
        }

        let name = project
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let guid = uuid::Uuid::new_v4().to_string().to_uppercase();
        let type_guid = language.project_type_guid().to_string();
        let lines = vec![
            format!(
                "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{{{}}}\"",
                type_guid, name, relative, guid
            ),
            "EndProject".to_string(),
        ];
        self.projects.push(SlnProject {
            type_guid,
            name,
            path: relative,
            guid,
            lines,
        });
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.to_text()).map_err(Error::IoError)
    }
}

/// Path of `target` relative to the directory `base`. Falls back to `target`
/// when the two share no root.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();
    let common = base
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return target.to_path_buf();
    }
    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
