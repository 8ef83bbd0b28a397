//! Secret reference resolver.
//!
//! Credential values in `config.toml` can use special prefixes to reference
//! secrets stored outside the file:
//!
//! - `env::VAR_NAME` — reads `$VAR_NAME` from the environment
//! - `file::/path/to/secret` — reads the first line of a file (the shape
//!   mounted secrets take in containerized deployments)
//! - `pass::path/in/store` — runs `pass show path/in/store`, returns first line
//! - anything else — returned as-is (plain text)

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else if let Some(path) = value.strip_prefix("file::") {
        resolve_file(path)
    } else if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else {
        Ok(value.to_string())
    }
}

/// Reads an environment variable.
fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

/// Reads the first line of a file, trimmed.
fn resolve_file(path: &str) -> Result<String, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read secret file `{}`: {}", path, e))?;

    let line = content.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(format!("secret file `{}` is empty", path));
    }
    Ok(line.to_string())
}

/// Runs `pass show <path>` and returns the first line of stdout.
fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .map(|s| s.to_string())
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}
