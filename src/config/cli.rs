use crate::core::Storage;
use crate::utils::error::Result;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// 暫存檔後綴，寫入完成後才 rename 成正式檔名
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Relative paths resolve against `base_path`; absolute paths are used as-is.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsString::from(TEMP_SUFFIX));
    PathBuf::from(name)
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let requested = self.resolve(path);

        // 已存在的檔案 (包含 symlink) 寫到真正的目標，並保留原本的權限
        let (full_path, permissions) = if requested.exists() {
            let target = fs::canonicalize(&requested)?;
            let permissions = fs::metadata(&target)?.permissions();
            (target, Some(permissions))
        } else {
            if let Some(parent) = requested.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            (requested, None)
        };

        let temp_path = temp_path_for(&full_path);
        fs::write(&temp_path, data)?;
        if let Some(permissions) = permissions {
            if let Err(e) = fs::set_permissions(&temp_path, permissions) {
                let _ = fs::remove_file(&temp_path);
                return Err(e.into());
            }
        }
        if let Err(e) = fs::rename(&temp_path, &full_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}
