//! Sandboxed tool implementations.
//!
//! Every tool takes the session's [`WorkingRoot`] and returns a
//! [`ToolResult`]. Failures are encoded in the result instead of being
//! propagated: the model reads its own errors and decides what to do next.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::core::sandbox::{ContainmentError, WorkingRoot};

/// Maximum number of characters returned by `read_file`.
pub const MAX_READ_CHARS: usize = 10_000;

/// Default time budget for a script run.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Recoverable tool failure, rendered into the tool result text.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Cannot {action} \"{path}\" as it is outside the permitted working directory")]
    Outside { action: &'static str, path: String },

    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("File not found or is not a regular file: \"{0}\"")]
    NotAFile(String),

    #[error("Cannot write to \"{0}\" as it is a directory")]
    IsADirectory(String),

    #[error("File \"{0}\" not found")]
    ScriptNotFound(String),

    #[error("\"{path}\" is not a runnable script (supported extensions: {supported})")]
    NotAScript { path: String, supported: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown function: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl ToolError {
    fn outside(action: &'static str, err: ContainmentError) -> Self {
        Self::Outside {
            action,
            path: err.path,
        }
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Outcome of a tool call as seen by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Text handed back to the model.
    pub content: String,
    /// Whether `content` describes a failure.
    pub is_error: bool,
}

impl ToolResult {
    /// A successful result.
    #[must_use]
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// A failed result, prefixed with `Error:`.
    #[must_use]
    pub fn failure(err: &ToolError) -> Self {
        Self {
            content: format!("Error: {err}"),
            is_error: true,
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(content) => Self::success(content),
            Err(err) => Self::failure(&err),
        }
    }
}

/// List the immediate entries of a directory inside the root.
///
/// Defaults to the root itself. Entries appear in filesystem enumeration
/// order; an entry whose metadata cannot be read is reported inline.
pub async fn list_directory(root: &WorkingRoot, directory: Option<&str>) -> ToolResult {
    try_list_directory(root, directory).await.into()
}

async fn try_list_directory(
    root: &WorkingRoot,
    directory: Option<&str>,
) -> Result<String, ToolError> {
    let shown = directory.unwrap_or(".");
    let target = root
        .resolve(shown)
        .map_err(|e| ToolError::outside("list", e))?;

    let is_dir = tokio::fs::metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_dir());
    if !is_dir {
        return Err(ToolError::NotADirectory(shown.to_string()));
    }

    tracing::info!(path = %target.display(), "listing directory");

    let mut entries = tokio::fs::read_dir(&target)
        .await
        .map_err(|e| ToolError::io(format!("failed to list \"{shown}\""), e))?;

    let mut lines = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ToolError::io(format!("failed to list \"{shown}\""), e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();

        // Follows symlinks, so a link reports the size of its target
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) => lines.push(format!(
                "- {name}: file_size={} bytes, is_dir={}",
                meta.len(),
                meta.is_dir()
            )),
            Err(e) => lines.push(format!("- {name}: Error reading file size: {e}")),
        }
    }

    Ok(lines.join("\n"))
}

/// Read a text file inside the root, truncated to [`MAX_READ_CHARS`].
pub async fn read_file(root: &WorkingRoot, file_path: &str) -> ToolResult {
    try_read_file(root, file_path).await.into()
}

async fn try_read_file(root: &WorkingRoot, file_path: &str) -> Result<String, ToolError> {
    let target = root
        .resolve(file_path)
        .map_err(|e| ToolError::outside("read", e))?;

    let is_file = tokio::fs::metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_file());
    if !is_file {
        return Err(ToolError::NotAFile(file_path.to_string()));
    }

    tracing::info!(path = %target.display(), "reading file");

    let content = tokio::fs::read_to_string(&target)
        .await
        .map_err(|e| ToolError::io(format!("failed to read \"{file_path}\""), e))?;

    Ok(truncate_content(file_path, content))
}

fn truncate_content(file_path: &str, mut content: String) -> String {
    if let Some((cut, _)) = content.char_indices().nth(MAX_READ_CHARS) {
        content.truncate(cut);
        content.push_str(&format!(
            "\n[...File \"{file_path}\" truncated at {MAX_READ_CHARS} characters]"
        ));
    }
    content
}

/// Create or overwrite a file inside the root.
///
/// Missing parent directories are created.
pub async fn write_file(root: &WorkingRoot, file_path: &str, content: &str) -> ToolResult {
    try_write_file(root, file_path, content).await.into()
}

async fn try_write_file(
    root: &WorkingRoot,
    file_path: &str,
    content: &str,
) -> Result<String, ToolError> {
    let target = root
        .resolve(file_path)
        .map_err(|e| ToolError::outside("write to", e))?;

    if tokio::fs::metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        return Err(ToolError::IsADirectory(file_path.to_string()));
    }

    tracing::info!(path = %target.display(), "writing file");

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::io(format!("failed to create parent of \"{file_path}\""), e))?;
    }

    tokio::fs::write(&target, content)
        .await
        .map_err(|e| ToolError::io(format!("failed to write \"{file_path}\""), e))?;

    Ok(format!(
        "Successfully wrote to \"{file_path}\" ({} characters written)",
        content.chars().count()
    ))
}

/// Runs scripts found inside the root with a bounded time budget.
///
/// The interpreter is chosen by file extension. Scripts run with the
/// permissions of this process; nothing here isolates them.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    timeout: Duration,
    interpreters: BTreeMap<String, String>,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SCRIPT_TIMEOUT,
            interpreters: Self::default_interpreters(),
        }
    }
}

impl ScriptRunner {
    /// Create a runner with an explicit timeout and extension table.
    #[must_use]
    pub const fn new(timeout: Duration, interpreters: BTreeMap<String, String>) -> Self {
        Self {
            timeout,
            interpreters,
        }
    }

    /// Extension to interpreter table used when none is configured.
    #[must_use]
    pub fn default_interpreters() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("py".to_string(), "python3".to_string()),
            ("sh".to_string(), "sh".to_string()),
        ])
    }

    fn interpreter_for(&self, path: &Path) -> Option<&str> {
        let extension = path.extension()?.to_str()?;
        self.interpreters.get(extension).map(String::as_str)
    }

    fn supported(&self) -> String {
        self.interpreters
            .keys()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Run a script inside the root with optional positional arguments.
///
/// A nonzero exit code is reported as part of a successful result.
pub async fn execute_script(
    root: &WorkingRoot,
    runner: &ScriptRunner,
    file_path: &str,
    args: &[String],
) -> ToolResult {
    try_execute_script(root, runner, file_path, args)
        .await
        .into()
}

async fn try_execute_script(
    root: &WorkingRoot,
    runner: &ScriptRunner,
    file_path: &str,
    args: &[String],
) -> Result<String, ToolError> {
    let target = root
        .resolve(file_path)
        .map_err(|e| ToolError::outside("execute", e))?;

    let is_file = tokio::fs::metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_file());
    if !is_file {
        return Err(ToolError::ScriptNotFound(file_path.to_string()));
    }

    let interpreter = runner
        .interpreter_for(&target)
        .ok_or_else(|| ToolError::NotAScript {
            path: file_path.to_string(),
            supported: runner.supported(),
        })?;

    tracing::info!(
        interpreter,
        path = %target.display(),
        args = ?args,
        "executing script"
    );

    let mut command = Command::new(interpreter);
    command
        .arg(&target)
        .args(args)
        .current_dir(root.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own group, so anything the script starts can be killed with it
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|e| ToolError::io(format!("failed to start {interpreter}"), e))?;

    let group = ProcessGroup(child.id());
    let stdout = tokio::spawn(drain(child.stdout.take()));
    let stderr = tokio::spawn(drain(child.stderr.take()));

    // Wait for the script itself, not for its pipes: a background job may
    // hold them open long after the script has exited
    let status = match tokio::time::timeout(runner.timeout, child.wait()).await {
        Ok(status) => {
            status.map_err(|e| ToolError::io(format!("failed to run \"{file_path}\""), e))?
        }
        Err(_) => {
            tracing::warn!(path = %target.display(), "script timed out");
            group.kill();
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "script already gone after group kill");
            }
            return Err(ToolError::Timeout(runner.timeout));
        }
    };

    // Leftover background jobs must not outlive the call
    group.kill();

    let (stdout, stderr) = tokio::time::timeout(OUTPUT_DRAIN_GRACE, async {
        (
            stdout.await.unwrap_or_default(),
            stderr.await.unwrap_or_default(),
        )
    })
    .await
    .unwrap_or_default();

    Ok(format_output(status, &stdout, &stderr))
}

/// How long to wait for pipes to close once the script has exited.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(1);

async fn drain<R>(pipe: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "failed to read script output");
        }
    }
    buf
}

/// The process group a script leads.
struct ProcessGroup(Option<u32>);

impl ProcessGroup {
    #[cfg(unix)]
    fn kill(&self) {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pid) = self.0.and_then(|id| i32::try_from(id).ok()) else {
            return;
        };

        match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            // ESRCH: every member has already exited
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => tracing::debug!(pid, error = %e, "failed to kill script process group"),
        }
    }

    #[cfg(not(unix))]
    fn kill(&self) {}
}

fn format_output(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut sections = Vec::new();

    if stdout.is_empty() && stderr.is_empty() {
        sections.push("No output produced.".to_string());
    }
    if !stdout.is_empty() {
        sections.push(format!("STDOUT:\n{}", stdout.trim_end()));
    }
    if !stderr.is_empty() {
        sections.push(format!("STDERR:\n{}", stderr.trim_end()));
    }

    match status.code() {
        Some(code) => sections.push(format!("Process exited with code {code}")),
        None => sections.push("Process terminated by a signal".to_string()),
    }

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, WorkingRoot) {
        let temp = TempDir::new().unwrap();
        let root = WorkingRoot::new(temp.path()).unwrap();
        (temp, root)
    }

    fn write(temp: &TempDir, name: &str, content: &str) {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn list_directory_reports_entries() {
        let (temp, root) = sandbox();
        write(&temp, "main.py", "print(1)\n");
        std::fs::create_dir(temp.path().join("pkg")).unwrap();

        let result = list_directory(&root, None).await;
        assert!(!result.is_error);

        // Enumeration order is not guaranteed
        let mut lines: Vec<&str> = result.content.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "- main.py: file_size=9 bytes, is_dir=false");
        assert!(lines[1].starts_with("- pkg: file_size="));
        assert!(lines[1].ends_with("is_dir=true"));
    }

    #[tokio::test]
    async fn list_directory_of_empty_directory_is_empty() {
        let (temp, root) = sandbox();
        std::fs::create_dir(temp.path().join("empty")).unwrap();

        let result = list_directory(&root, Some("empty")).await;
        assert_eq!(result, ToolResult::success(""));
    }

    #[tokio::test]
    async fn list_directory_rejects_escape() {
        let (_temp, root) = sandbox();

        let result = list_directory(&root, Some("../")).await;
        assert!(result.is_error);
        assert_eq!(
            result.content,
            "Error: Cannot list \"../\" as it is outside the permitted working directory"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_directory_reports_unreadable_entries_inline() {
        let (temp, root) = sandbox();
        write(&temp, "main.py", "print(1)\n");
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("broken")).unwrap();

        let result = list_directory(&root, None).await;
        assert!(!result.is_error);

        let mut lines: Vec<&str> = result.content.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines.len(), 2);
        assert!(
            lines[0].starts_with("- broken: Error reading file size: "),
            "{}",
            lines[0]
        );
        assert_eq!(lines[1], "- main.py: file_size=9 bytes, is_dir=false");
    }

    #[tokio::test]
    async fn list_directory_rejects_files() {
        let (temp, root) = sandbox();
        write(&temp, "main.py", "");

        let result = list_directory(&root, Some("main.py")).await;
        assert_eq!(result.content, "Error: \"main.py\" is not a directory");
    }

    #[tokio::test]
    async fn read_file_returns_content() {
        let (temp, root) = sandbox();
        write(&temp, "pkg/calc.py", "def add(a, b):\n    return a + b\n");

        let result = read_file(&root, "pkg/calc.py").await;
        assert_eq!(
            result,
            ToolResult::success("def add(a, b):\n    return a + b\n")
        );
    }

    #[tokio::test]
    async fn read_file_at_limit_is_not_truncated() {
        let (temp, root) = sandbox();
        let content = "a".repeat(MAX_READ_CHARS);
        write(&temp, "exact.txt", &content);

        let result = read_file(&root, "exact.txt").await;
        assert_eq!(result.content, content);
    }

    #[tokio::test]
    async fn read_file_over_limit_is_truncated_with_marker() {
        let (temp, root) = sandbox();
        let content = "b".repeat(MAX_READ_CHARS + 1);
        write(&temp, "long.txt", &content);

        let result = read_file(&root, "long.txt").await;
        assert!(!result.is_error);
        let expected = format!(
            "{}\n[...File \"long.txt\" truncated at 10000 characters]",
            "b".repeat(MAX_READ_CHARS)
        );
        assert_eq!(result.content, expected);
    }

    #[tokio::test]
    async fn read_file_counts_characters_not_bytes() {
        let (temp, root) = sandbox();
        let content = "é".repeat(MAX_READ_CHARS);
        write(&temp, "accents.txt", &content);

        let result = read_file(&root, "accents.txt").await;
        assert_eq!(result.content, content);
    }

    #[tokio::test]
    async fn read_file_rejects_missing_and_directories_alike() {
        let (temp, root) = sandbox();
        std::fs::create_dir(temp.path().join("pkg")).unwrap();

        let missing = read_file(&root, "nope.py").await;
        assert_eq!(
            missing.content,
            "Error: File not found or is not a regular file: \"nope.py\""
        );

        let dir = read_file(&root, "pkg").await;
        assert_eq!(
            dir.content,
            "Error: File not found or is not a regular file: \"pkg\""
        );
    }

    #[tokio::test]
    async fn read_file_rejects_escape() {
        let (_temp, root) = sandbox();

        let result = read_file(&root, "/etc/passwd").await;
        assert!(result.is_error);
        assert!(result.content.contains("outside the permitted working directory"));
    }

    // Containment is lexical: a link inside the root is followed wherever
    // it points. Update this test if links ever get resolved first.
    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_inside_root_is_followed() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("calculator")).unwrap();
        std::fs::create_dir_all(temp.path().join("private")).unwrap();
        std::fs::write(temp.path().join("private/secret.txt"), "outside").unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("private"),
            temp.path().join("calculator/link"),
        )
        .unwrap();
        let root = WorkingRoot::new(temp.path().join("calculator")).unwrap();

        let result = read_file(&root, "link/secret.txt").await;
        assert_eq!(result, ToolResult::success("outside"));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_temp, root) = sandbox();

        for (name, content) in [
            ("empty.txt", ""),
            ("lines.txt", "first\nsecond\n\nfourth"),
            ("unicode.txt", "héllo wörld — 你好 🦀"),
        ] {
            let written = write_file(&root, name, content).await;
            assert!(!written.is_error, "{}", written.content);

            let read = read_file(&root, name).await;
            assert_eq!(read.content, content);
        }
    }

    #[tokio::test]
    async fn write_file_reports_character_count_and_creates_parents() {
        let (temp, root) = sandbox();

        let result = write_file(&root, "nested/dir/out.txt", "añb").await;
        assert_eq!(
            result.content,
            "Successfully wrote to \"nested/dir/out.txt\" (3 characters written)"
        );
        assert!(temp.path().join("nested/dir/out.txt").is_file());
    }

    #[tokio::test]
    async fn write_file_overwrites_existing_content() {
        let (temp, root) = sandbox();
        write(&temp, "lorem.txt", "a much longer first body");

        write_file(&root, "lorem.txt", "short").await;
        let on_disk = std::fs::read_to_string(temp.path().join("lorem.txt")).unwrap();
        assert_eq!(on_disk, "short");
    }

    #[tokio::test]
    async fn write_file_rejects_escape_and_directories() {
        let (temp, root) = sandbox();
        std::fs::create_dir(temp.path().join("pkg")).unwrap();

        let outside = write_file(&root, "../evil.txt", "x").await;
        assert_eq!(
            outside.content,
            "Error: Cannot write to \"../evil.txt\" as it is outside the permitted working directory"
        );

        let dir = write_file(&root, "pkg", "x").await;
        assert!(dir.is_error);
        assert!(dir.content.contains("is a directory"));
    }

    #[tokio::test]
    async fn execute_script_captures_streams_and_exit_code() {
        let (temp, root) = sandbox();
        write(
            &temp,
            "both.sh",
            "echo out-line\necho err-line 1>&2\nexit 0\n",
        );

        let result = execute_script(&root, &ScriptRunner::default(), "both.sh", &[]).await;
        assert!(!result.is_error);
        assert_eq!(
            result.content,
            "STDOUT:\nout-line\nSTDERR:\nerr-line\nProcess exited with code 0"
        );
    }

    #[tokio::test]
    async fn execute_script_nonzero_exit_is_data() {
        let (temp, root) = sandbox();
        write(&temp, "fail.sh", "exit 2\n");

        let result = execute_script(&root, &ScriptRunner::default(), "fail.sh", &[]).await;
        assert!(!result.is_error);
        assert!(result.content.contains("No output produced."));
        assert!(result.content.contains("Process exited with code 2"));
    }

    #[tokio::test]
    async fn execute_script_passes_args_and_runs_in_root() {
        let (temp, root) = sandbox();
        write(&temp, "scripts/args.sh", "echo \"$1-$2\"\npwd\n");

        let result = execute_script(
            &root,
            &ScriptRunner::default(),
            "scripts/args.sh",
            &["3".to_string(), "5".to_string()],
        )
        .await;

        let expected_pwd = root.path().display().to_string();
        assert!(result.content.contains("3-5"), "{}", result.content);
        assert!(result.content.contains(&expected_pwd), "{}", result.content);
    }

    #[tokio::test]
    async fn execute_script_times_out() {
        let (temp, root) = sandbox();
        write(&temp, "slow.sh", "sleep 5\n");
        let runner = ScriptRunner::new(
            Duration::from_millis(200),
            ScriptRunner::default_interpreters(),
        );

        let result = execute_script(&root, &runner, "slow.sh", &[]).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Error: process timed out after 200ms");
    }

    /// Whether `pid` names a live, non-zombie process.
    #[cfg(unix)]
    fn is_running(pid: i32) -> bool {
        if nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_err() {
            return false;
        }
        // Zombies still accept signal 0 until something reaps them
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map_or(true, |stat| !stat.contains(") Z "))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_processes_started_by_the_script() {
        let (temp, root) = sandbox();
        write(
            &temp,
            "spawner.sh",
            "sleep 30 &\necho $! > background.pid\nsleep 30\n",
        );
        let runner = ScriptRunner::new(
            Duration::from_millis(500),
            ScriptRunner::default_interpreters(),
        );

        let result = execute_script(&root, &runner, "spawner.sh", &[]).await;
        assert!(result.is_error);
        assert!(result.content.contains("process timed out"));

        let pid: i32 = std::fs::read_to_string(temp.path().join("background.pid"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        let mut alive = true;
        for _ in 0..40 {
            alive = is_running(pid);
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "background process {pid} survived the timeout");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn background_job_does_not_hold_the_result() {
        let (temp, root) = sandbox();
        write(&temp, "detach.sh", "sleep 3 &\necho started\nexit 0\n");
        let runner = ScriptRunner::new(
            Duration::from_millis(2000),
            ScriptRunner::default_interpreters(),
        );

        let result = execute_script(&root, &runner, "detach.sh", &[]).await;
        assert_eq!(
            result,
            ToolResult::success("STDOUT:\nstarted\nProcess exited with code 0")
        );
    }

    #[tokio::test]
    async fn execute_script_validates_target() {
        let (temp, root) = sandbox();
        write(&temp, "notes.txt", "hello");
        let runner = ScriptRunner::default();

        let escape = execute_script(&root, &runner, "../main.py", &[]).await;
        assert_eq!(
            escape.content,
            "Error: Cannot execute \"../main.py\" as it is outside the permitted working directory"
        );

        let missing = execute_script(&root, &runner, "nonexistent.py", &[]).await;
        assert_eq!(missing.content, "Error: File \"nonexistent.py\" not found");

        let unsupported = execute_script(&root, &runner, "notes.txt", &[]).await;
        assert_eq!(
            unsupported.content,
            "Error: \"notes.txt\" is not a runnable script (supported extensions: .py, .sh)"
        );
    }
}
