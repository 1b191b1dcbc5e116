//! Python code runner
//!
//! Executes model- or user-supplied code via `python3 -c` with a hard
//! wall-clock timeout. No sandboxing beyond that timeout.

use std::time::Duration;

use super::ToolError;

#[derive(Clone)]
pub struct PythonInput {
    pub code: String,
    pub binary: String,
    pub timeout: Duration,
    pub output_cap: usize,
}

#[derive(Debug)]
pub struct PythonOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
    pub truncated: bool,
}

/// Run a snippet of python code
pub async fn run(input: PythonInput) -> Result<PythonOutput, ToolError> {
    let result = tokio::time::timeout(
        input.timeout,
        tokio::process::Command::new(&input.binary)
            .args(["-c", &input.code])
            .kill_on_drop(true)
            .output(),
    )
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(ToolError::CodeExec(e.to_string())),
        Err(_) => return Err(ToolError::CodeTimeout(input.timeout.as_secs())),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    let total_len = stdout.len() + stderr.len();
    let truncated = total_len > input.output_cap;

    let (stdout, stderr) = if truncated {
        truncate_output(&stdout, &stderr, input.output_cap)
    } else {
        (stdout, stderr)
    };

    Ok(PythonOutput {
        stdout,
        stderr,
        exit_code,
        success: output.status.success(),
        truncated,
    })
}

/// Fold a run into the single string the model (and the /run_code console)
/// sees: stderr wins, otherwise stdout.
pub fn format_output(output: &PythonOutput) -> String {
    if !output.stderr.is_empty() {
        format!("Error: {}", output.stderr)
    } else {
        output.stdout.clone()
    }
}

/// Truncate output keeping beginning and end for context
fn truncate_output(stdout: &str, stderr: &str, max_size: usize) -> (String, String) {
    let total = stdout.len() + stderr.len();
    if total <= max_size {
        return (stdout.to_string(), stderr.to_string());
    }

    // Allocate proportionally
    let stdout_ratio = stdout.len() as f64 / total as f64;
    let stdout_budget = (max_size as f64 * stdout_ratio) as usize;
    let stderr_budget = max_size - stdout_budget;

    (truncate_single(stdout, stdout_budget), truncate_single(stderr, stderr_budget))
}

/// Truncate a single string keeping head and tail
fn truncate_single(s: &str, max_size: usize) -> String {
    if s.len() <= max_size {
        return s.to_string();
    }

    // Keep first ~75% and last ~20%
    let head_size = (max_size * 3) / 4;
    let tail_size = max_size / 5;

    let head: String = s.chars().take(head_size).collect();
    let tail: String = s
        .chars()
        .rev()
        .take(tail_size)
        .collect::<String>()
        .chars()
        .rev()
        .collect();

    let omitted = s.len() - head_size - tail_size;
    format!("{}\n\n... [{} bytes omitted] ...\n\n{}", head, omitted, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(binary: &str, code: &str) -> PythonInput {
        PythonInput {
            code: code.to_string(),
            binary: binary.to_string(),
            timeout: Duration::from_secs(10),
            output_cap: 64 * 1024,
        }
    }

    // The unit tests drive the runner through `sh -c` so they don't depend
    // on a python install; only the binary name differs.

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let output = run(input("sh", "echo hello")).await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "hello");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_run_stderr_wins_in_format() {
        let output = run(input("sh", "echo oops >&2")).await.unwrap();
        assert!(output.stdout.is_empty());
        let formatted = format_output(&output);
        assert!(formatted.starts_with("Error: "));
        assert!(formatted.contains("oops"));
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let mut i = input("sh", "sleep 5");
        i.timeout = Duration::from_millis(100);
        let err = run(i).await.unwrap_err();
        assert!(matches!(err, ToolError::CodeTimeout(_)));
    }

    #[tokio::test]
    async fn test_run_missing_binary() {
        let err = run(input("definitely-not-a-real-binary", "print(1)"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::CodeExec(_)));
    }

    #[test]
    fn test_truncate() {
        let long_string = "x".repeat(100);
        let truncated = truncate_single(&long_string, 50);
        assert!(truncated.len() < 100);
        assert!(truncated.contains("bytes omitted"));
    }
}
