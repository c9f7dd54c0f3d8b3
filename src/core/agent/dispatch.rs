//! Routes model-issued tool calls to their implementations.

use std::collections::HashMap;

use super::catalog::{self, ParamType, ToolSpec};
use super::tools::{self, ScriptRunner, ToolError, ToolResult};
use crate::core::sandbox::WorkingRoot;

/// A validated argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    String(String),
    StringArray(Vec<String>),
}

/// Arguments filtered and typed against a tool's declared parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolArgs {
    values: HashMap<&'static str, ArgValue>,
}

impl ToolArgs {
    /// Validate raw model input against `spec`.
    ///
    /// Undeclared keys are dropped. A `null` value counts as absent.
    pub fn from_input(spec: &ToolSpec, input: &serde_json::Value) -> Result<Self, ToolError> {
        let invalid = |reason: String| ToolError::InvalidArguments {
            tool: spec.name.to_string(),
            reason,
        };

        let empty = serde_json::Map::new();
        let object = match input {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => &empty,
            other => return Err(invalid(format!("expected an object, got {other}"))),
        };

        for key in object.keys() {
            if spec.param(key).is_none() {
                tracing::debug!(tool = spec.name, key, "dropping undeclared argument");
            }
        }

        let mut values = HashMap::new();

        for param in spec.params {
            let value = match object.get(param.name) {
                None | Some(serde_json::Value::Null) => {
                    if param.required {
                        return Err(invalid(format!("missing required parameter `{}`", param.name)));
                    }
                    continue;
                }
                Some(value) => value,
            };

            let typed = match (param.kind, value) {
                (ParamType::String, serde_json::Value::String(s)) => ArgValue::String(s.clone()),
                // Models sometimes pass a lone string where a list is declared
                (ParamType::StringArray, serde_json::Value::String(s)) => {
                    ArgValue::StringArray(vec![s.clone()])
                }
                (ParamType::StringArray, serde_json::Value::Array(items)) => {
                    let strings = items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => Ok(s.clone()),
                            other => Err(invalid(format!(
                                "`{}` must contain only strings, got {other}",
                                param.name
                            ))),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    ArgValue::StringArray(strings)
                }
                (ParamType::String, other) => {
                    return Err(invalid(format!("`{}` must be a string, got {other}", param.name)));
                }
                (ParamType::StringArray, other) => {
                    return Err(invalid(format!(
                        "`{}` must be a list of strings, got {other}",
                        param.name
                    )));
                }
            };

            values.insert(param.name, typed);
        }

        Ok(Self { values })
    }

    /// A string argument, if supplied.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// A string-list argument, empty if not supplied.
    #[must_use]
    pub fn strings(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(ArgValue::StringArray(items)) => items,
            _ => &[],
        }
    }
}

/// A tool call proposed by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Untrusted arguments exactly as the model sent them.
    pub arguments: serde_json::Value,
}

/// Executes tool calls against a fixed working root.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    root: WorkingRoot,
    scripts: ScriptRunner,
}

impl Dispatcher {
    /// Create a dispatcher bound to `root` for the whole session.
    #[must_use]
    pub const fn new(root: WorkingRoot, scripts: ScriptRunner) -> Self {
        Self { root, scripts }
    }

    /// The root every call is confined to.
    #[must_use]
    pub const fn root(&self) -> &WorkingRoot {
        &self.root
    }

    /// Execute one call. Never fails; errors become the result text.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(spec) = catalog::find(&call.name) else {
            tracing::warn!(tool = %call.name, "model requested unknown tool");
            return ToolResult::failure(&ToolError::UnknownTool(call.name.clone()));
        };

        let args = match ToolArgs::from_input(spec, &call.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(tool = spec.name, error = %e, "rejected tool arguments");
                return ToolResult::failure(&e);
            }
        };

        // Required parameters are guaranteed present by validation
        let required = |name: &str| args.str(name).unwrap_or_default();

        let result = match spec.name {
            "list_directory" => tools::list_directory(&self.root, args.str("directory")).await,
            "read_file" => tools::read_file(&self.root, required("file_path")).await,
            "write_file" => {
                tools::write_file(&self.root, required("file_path"), required("content")).await
            }
            "execute_script" => {
                tools::execute_script(
                    &self.root,
                    &self.scripts,
                    required("file_path"),
                    args.strings("args"),
                )
                .await
            }
            other => ToolResult::failure(&ToolError::UnknownTool(other.to_string())),
        };

        tracing::debug!(
            tool = spec.name,
            is_error = result.is_error,
            bytes = result.content.len(),
            "tool finished"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::catalog::{EXECUTE_SCRIPT, LIST_DIRECTORY, WRITE_FILE};
    use tempfile::TempDir;

    fn dispatcher() -> (TempDir, Dispatcher) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("calculator")).unwrap();
        let root = WorkingRoot::new(temp.path().join("calculator")).unwrap();
        (temp, Dispatcher::new(root, ScriptRunner::default()))
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[tokio::test]
    async fn unknown_tool_yields_error_result() {
        let (_temp, dispatcher) = dispatcher();

        let result = dispatcher
            .execute(&call("delete_everything", serde_json::json!({})))
            .await;

        assert!(result.is_error);
        assert_eq!(result.content, "Error: Unknown function: delete_everything");
    }

    #[tokio::test]
    async fn model_cannot_override_working_directory() {
        let (temp, dispatcher) = dispatcher();
        std::fs::write(temp.path().join("secret.txt"), "outside").unwrap();
        std::fs::write(temp.path().join("calculator/inside.txt"), "inside").unwrap();

        let result = dispatcher
            .execute(&call(
                "list_directory",
                serde_json::json!({ "working_directory": temp.path().to_str().unwrap() }),
            ))
            .await;

        assert!(!result.is_error);
        assert!(result.content.contains("inside.txt"));
        assert!(!result.content.contains("secret.txt"));
    }

    #[tokio::test]
    async fn missing_required_argument_is_reported() {
        let (_temp, dispatcher) = dispatcher();

        let result = dispatcher
            .execute(&call("read_file", serde_json::json!({ "path": "main.py" })))
            .await;

        assert!(result.is_error);
        assert_eq!(
            result.content,
            "Error: Invalid arguments for read_file: missing required parameter `file_path`"
        );
    }

    #[tokio::test]
    async fn writes_land_inside_the_root() {
        let (temp, dispatcher) = dispatcher();

        let result = dispatcher
            .execute(&call(
                "write_file",
                serde_json::json!({ "file_path": "lorem.txt", "content": "wait, this isn't lorem ipsum" }),
            ))
            .await;

        assert!(!result.is_error, "{}", result.content);
        let written = std::fs::read_to_string(temp.path().join("calculator/lorem.txt")).unwrap();
        assert_eq!(written, "wait, this isn't lorem ipsum");
    }

    #[test]
    fn undeclared_keys_are_dropped() {
        let args = ToolArgs::from_input(
            &LIST_DIRECTORY,
            &serde_json::json!({ "directory": "pkg", "recursive": true }),
        )
        .unwrap();

        assert_eq!(args.str("directory"), Some("pkg"));
        assert_eq!(args.str("recursive"), None);
    }

    #[test]
    fn null_input_means_no_arguments() {
        let args = ToolArgs::from_input(&LIST_DIRECTORY, &serde_json::Value::Null).unwrap();
        assert_eq!(args, ToolArgs::default());
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let err = ToolArgs::from_input(
            &WRITE_FILE,
            &serde_json::json!({ "file_path": "a.txt", "content": 42 }),
        )
        .unwrap_err();

        assert!(err.to_string().contains("`content` must be a string"));
    }

    #[test]
    fn lone_string_is_accepted_as_argument_list() {
        let args = ToolArgs::from_input(
            &EXECUTE_SCRIPT,
            &serde_json::json!({ "file_path": "main.py", "args": "3 + 5" }),
        )
        .unwrap();

        assert_eq!(args.strings("args"), ["3 + 5".to_string()]);
    }

    #[test]
    fn non_string_list_items_are_rejected() {
        let result = ToolArgs::from_input(
            &EXECUTE_SCRIPT,
            &serde_json::json!({ "file_path": "main.py", "args": ["1", 2] }),
        );

        assert!(matches!(result, Err(ToolError::InvalidArguments { .. })));
    }
}
