use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding one state file path (not created yet).
pub(crate) struct Scratch {
    pub(crate) dir: TempDir,
    pub(crate) file: PathBuf,
}

impl Scratch {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("test.sync");
        Self { dir, file }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

/// Whether file modes are actually enforced for this process.
///
/// Privileged users (root in CI containers) bypass them, in which case
/// permission tests have nothing to observe.
#[cfg(unix)]
pub(crate) fn permissions_enforced(dir: &Path) -> bool {
    let probe = dir.join(".probe");
    fs::write(&probe, b"x").unwrap();
    set_mode(&probe, 0o000);
    let enforced = fs::read(&probe).is_err();
    set_mode(&probe, 0o600);
    fs::remove_file(&probe).unwrap();
    enforced
}
