//! Common constants used throughout projgen.

/// Hidden variable holding the source file extension of the requested language.
pub const SOURCE_EXTENSION_VARIABLE: &str = "_sourceExt";

/// Element names of the template description.
pub mod element {
    pub const TEMPLATE: &str = "Template";
    pub const NAME: &str = "Name";
    pub const DESCRIPTION: &str = "Description";
    pub const ICON: &str = "Icon";
    pub const PREVIEW_IMAGE: &str = "PreviewImage";
    pub const SOURCE_FOLDER: &str = "SrcFolder";
    pub const VARIABLE: &str = "Var";
    pub const PROJECT: &str = "Project";
    pub const FILE: &str = "File";
}

/// Attribute names of the template description.
pub mod attribute {
    pub const VAR_NAME: &str = "name";
    pub const VAR_DESCRIPTION: &str = "description";
    pub const VAR_SEMANTIC: &str = "semantic";
    pub const VAR_TYPE: &str = "type";
    pub const VAR_HIDDEN: &str = "hidden";
    pub const SOURCE: &str = "src";
    pub const DESTINATION: &str = "dst";
    pub const RAW: &str = "raw";
}

/// Token delimiters.
pub const TOKEN_OPEN: &str = "{{";
pub const TOKEN_CLOSE: &str = "}}";

/// Generated files whose extension ends with this suffix are solution projects.
pub const PROJECT_EXTENSION_SUFFIX: &str = "proj";

/// File name of the exported Visual Studio template descriptor.
pub const VSTEMPLATE_FILE: &str = "template.vstemplate";
pub const VSTEMPLATE_NAMESPACE: &str = "http://schemas.microsoft.com/developer/vstemplate/2005";
