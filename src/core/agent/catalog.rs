//! Static tool catalog presented to the model.
//!
//! Adding a tool means adding a [`ToolSpec`] here and one arm in the
//! dispatcher. The conversation loop never changes.

use super::types::Tool;

/// Type of a declared tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    StringArray,
}

impl ParamType {
    fn schema(self, description: &str) -> serde_json::Value {
        match self {
            Self::String => serde_json::json!({
                "type": "string",
                "description": description,
            }),
            Self::StringArray => serde_json::json!({
                "type": "array",
                "items": { "type": "string" },
                "description": description,
            }),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub description: &'static str,
}

/// Name, purpose and parameter schema of one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    /// Look up a declared parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Render as a model-facing tool definition.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.kind.schema(p.description)))
            .collect();

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        Tool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

pub const LIST_DIRECTORY: ToolSpec = ToolSpec {
    name: "list_directory",
    description: "Lists files in the specified directory along with their sizes, \
                  constrained to the working directory.",
    params: &[ParamSpec {
        name: "directory",
        kind: ParamType::String,
        required: false,
        description: "The directory to list files from, relative to the working directory. \
                      If not provided, lists files in the working directory itself.",
    }],
};

pub const READ_FILE: ToolSpec = ToolSpec {
    name: "read_file",
    description: "Reads the content of a file, constrained to the working directory. \
                  Long files are truncated.",
    params: &[ParamSpec {
        name: "file_path",
        kind: ParamType::String,
        required: true,
        description: "The path of the file to read, relative to the working directory.",
    }],
};

pub const WRITE_FILE: ToolSpec = ToolSpec {
    name: "write_file",
    description: "Writes content to a file, creating it or overwriting it entirely, \
                  constrained to the working directory.",
    params: &[
        ParamSpec {
            name: "file_path",
            kind: ParamType::String,
            required: true,
            description: "The path of the file to write, relative to the working directory.",
        },
        ParamSpec {
            name: "content",
            kind: ParamType::String,
            required: true,
            description: "The full content to write to the file.",
        },
    ],
};

pub const EXECUTE_SCRIPT: ToolSpec = ToolSpec {
    name: "execute_script",
    description: "Executes a script file with optional arguments and returns its output \
                  and exit code, constrained to the working directory.",
    params: &[
        ParamSpec {
            name: "file_path",
            kind: ParamType::String,
            required: true,
            description: "The path of the script to execute, relative to the working directory.",
        },
        ParamSpec {
            name: "args",
            kind: ParamType::StringArray,
            required: false,
            description: "Optional positional arguments passed to the script.",
        },
    ],
};

static CATALOG: [ToolSpec; 4] = [LIST_DIRECTORY, READ_FILE, WRITE_FILE, EXECUTE_SCRIPT];

/// Every tool available to the model.
#[must_use]
pub fn catalog() -> &'static [ToolSpec] {
    &CATALOG
}

/// Find a tool by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Model-facing definitions for the whole catalog.
#[must_use]
pub fn definitions() -> Vec<Tool> {
    CATALOG.iter().map(ToolSpec::to_tool).collect()
}
