use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::token::error::TokenError;

/// Durable home of the page credential: one `KEY=value` line of an env file.
///
/// Writes go through a temp file in the same directory followed by a rename, so
/// readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
    key: String,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Rewrite the credential line, leaving every other line untouched.
    pub async fn persist(&self, value: &str) -> Result<(), TokenError> {
        let fail = |source: std::io::Error| TokenError::PersistFailure {
            path: self.path.display().to_string(),
            source,
        };

        let (content, permissions) = match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let permissions = fs::metadata(&self.path).await.map_err(fail)?.permissions();
                (content, Some(permissions))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => (String::new(), None),
            Err(e) => return Err(fail(e)),
        };

        let updated = rewrite_env_line(&content, &self.key, value);
        let tmp = self.tmp_path();

        let written = async {
            fs::write(&tmp, updated.as_bytes()).await?;
            if let Some(permissions) = permissions {
                fs::set_permissions(&tmp, permissions).await?;
            }
            fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(fail(e));
        }

        info!("{} updated with fresh {}", self.path.display(), self.key);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "env".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

/// Replace the first `key=...` line (leading whitespace and `export ` allowed),
/// appending one when the key is absent. Line endings are preserved.
pub fn rewrite_env_line(content: &str, key: &str, value: &str) -> String {
    let mut out = String::with_capacity(content.len() + value.len() + key.len() + 2);
    let mut replaced = false;

    for line in content.split_inclusive('\n') {
        if !replaced && line_sets_key(line, key) {
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            let indent_len = line.len() - line.trim_start().len();
            out.push_str(&line[..indent_len]);
            if line.trim_start().starts_with("export ") {
                out.push_str("export ");
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push_str(ending);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

fn line_sets_key(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    trimmed
        .strip_prefix(key)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_only_the_credential_line() {
        let content = "# facebook\nFACEBOOK_APP_ID=1\nPAGE_ACCESS_TOKEN=old\n\nVERIFY_TOKEN=abc\n";

        let out = rewrite_env_line(content, "PAGE_ACCESS_TOKEN", "new");

        assert_eq!(out, "# facebook\nFACEBOOK_APP_ID=1\nPAGE_ACCESS_TOKEN=new\n\nVERIFY_TOKEN=abc\n");
    }

    #[test]
    fn similar_prefixes_are_not_matched() {
        let content = "PAGE_ACCESS_TOKEN_BACKUP=keep\nPAGE_ACCESS_TOKEN=old";

        let out = rewrite_env_line(content, "PAGE_ACCESS_TOKEN", "new");

        assert_eq!(out, "PAGE_ACCESS_TOKEN_BACKUP=keep\nPAGE_ACCESS_TOKEN=new");
    }

    #[test]
    fn keeps_crlf_and_export_prefix() {
        let content = "A=1\r\nexport PAGE_ACCESS_TOKEN=old\r\nB=2\r\n";

        let out = rewrite_env_line(content, "PAGE_ACCESS_TOKEN", "new");

        assert_eq!(out, "A=1\r\nexport PAGE_ACCESS_TOKEN=new\r\nB=2\r\n");
    }

    #[test]
    fn appends_missing_key() {
        assert_eq!(rewrite_env_line("A=1", "PAGE_ACCESS_TOKEN", "t"), "A=1\nPAGE_ACCESS_TOKEN=t\n");
        assert_eq!(rewrite_env_line("", "PAGE_ACCESS_TOKEN", "t"), "PAGE_ACCESS_TOKEN=t\n");
    }
}
