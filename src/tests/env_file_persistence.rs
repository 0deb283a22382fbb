#[cfg(test)]
mod tests {
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    use tempfile::tempdir;

    use crate::token::{EnvFileStore, TokenError};

    #[tokio::test]
    async fn rewrite_keeps_other_lines_and_permissions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "FACEBOOK_APP_ID=123\n# refreshed automatically\nexport PAGE_ACCESS_TOKEN=old\nVERIFY_TOKEN=abc",
        )
        .unwrap();
        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let store = EnvFileStore::new(&path, "PAGE_ACCESS_TOKEN");
        store.persist("EAAB-new").await.expect("persist");

        let got = fs::read_to_string(&path).unwrap();
        assert_eq!(
            got,
            "FACEBOOK_APP_ID=123\n# refreshed automatically\nexport PAGE_ACCESS_TOKEN=EAAB-new\nVERIFY_TOKEN=abc"
        );

        #[cfg(unix)]
        {
            let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600, "permissions mismatch (expected 0600)");
        }

        // no temp file left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_created_with_the_credential() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");

        EnvFileStore::new(&path, "PAGE_ACCESS_TOKEN")
            .persist("EAAB-first")
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "PAGE_ACCESS_TOKEN=EAAB-first\n");
    }

    #[tokio::test]
    async fn unwritable_location_is_a_persist_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join(".env");

        let err = EnvFileStore::new(&path, "PAGE_ACCESS_TOKEN")
            .persist("EAAB")
            .await
            .unwrap_err();

        assert!(matches!(err, TokenError::PersistFailure { .. }));
        assert_eq!(err.kind(), "persist_failure");
    }
}
