use std::fmt;

use clap::ValueEnum;

/// Source language of the generated projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceLanguage {
    #[default]
    #[value(name = "cs")]
    CSharp,
    #[value(name = "fs")]
    FSharp,
    #[value(name = "vb")]
    VisualBasic,
}

impl SourceLanguage {
    pub fn file_extension(&self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "cs",
            SourceLanguage::FSharp => "fs",
            SourceLanguage::VisualBasic => "vb",
        }
    }

    pub fn project_extension(&self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "csproj",
            SourceLanguage::FSharp => "fsproj",
            SourceLanguage::VisualBasic => "vbproj",
        }
    }

    /// Solution project-type GUID for this language's project files.
    pub fn project_type_guid(&self) -> &'static str {
        match self {
            SourceLanguage::CSharp => "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC",
            SourceLanguage::FSharp => "F2A71F9B-5D33-465A-A702-920D77279786",
            SourceLanguage::VisualBasic => "F184B08F-C81C-45F6-A57F-5ABD9991F28F",
        }
    }

    /// Looks up the language owning a project file extension, ignoring case.
    pub fn from_project_extension(ext: &str) -> Option<Self> {
        [
            SourceLanguage::CSharp,
            SourceLanguage::FSharp,
            SourceLanguage::VisualBasic,
        ]
        .into_iter()
        .find(|l| l.project_extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceLanguage::CSharp => "CSharp",
            SourceLanguage::FSharp => "FSharp",
            SourceLanguage::VisualBasic => "VisualBasic",
        };
        f.write_str(s)
    }
}
