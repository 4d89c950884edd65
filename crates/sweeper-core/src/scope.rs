//! Scope resolution: mount root + tenant + exclusion rules → the concrete
//! subtree and eligibility predicate for one run.
//!
//! This is the only stage allowed to fail the whole process. Everything it
//! checks is checked *before* any deletion happens (fail-fast): the resolved
//! root must stay inside the mount root, must exist, and every exclusion
//! pattern must compile.

use std::io;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;

use crate::domain::{InvalidScopeError, RunConfig};

/// Exclusion patterns, compiled once and matched against base names in
/// configuration order.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<Pattern>,
}

impl ExclusionSet {
    pub fn compile(patterns: &[String]) -> Result<Self, InvalidScopeError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let pattern =
                Pattern::new(raw).map_err(|source| InvalidScopeError::BadPattern {
                    pattern: raw.clone(),
                    source,
                })?;
            compiled.push(pattern);
        }
        Ok(Self { patterns: compiled })
    }

    /// True when the path may be deleted (no exclusion pattern matches its
    /// base name).
    pub fn eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return true;
        };
        !self.patterns.iter().any(|p| p.matches(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A resolved deletion scope: canonical root plus the eligibility predicate.
#[derive(Debug, Clone)]
pub struct Scope {
    root: PathBuf,
    exclusions: ExclusionSet,
}

impl Scope {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }
}

/// Resolve a run configuration into a concrete scope.
///
/// No side effects beyond filesystem existence checks.
pub fn resolve(config: &RunConfig) -> Result<Scope, InvalidScopeError> {
    let mount_root = canonicalize(&config.mount_root)?;

    let root = match config.tenant.as_deref() {
        None => mount_root.clone(),
        Some(tenant) => {
            // Reject traversal in the tenant segment up front, before ever
            // touching the filesystem with it.
            reject_escaping_tenant(tenant, &mount_root)?;

            let joined = mount_root.join(tenant);
            let resolved = canonicalize(&joined)?;

            // Canonicalization also catches a tenant directory that is a
            // symlink pointing outside the mount.
            if !resolved.starts_with(&mount_root) {
                return Err(InvalidScopeError::EscapesRoot {
                    tenant: tenant.to_string(),
                    mount_root,
                });
            }
            resolved
        }
    };

    if !root.is_dir() {
        return Err(InvalidScopeError::NotADirectory(root));
    }

    let exclusions = ExclusionSet::compile(&config.exclude)?;
    Ok(Scope { root, exclusions })
}

fn canonicalize(path: &Path) -> Result<PathBuf, InvalidScopeError> {
    path.canonicalize().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            InvalidScopeError::Missing(path.to_path_buf())
        } else {
            InvalidScopeError::Canonicalize {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn reject_escaping_tenant(tenant: &str, mount_root: &Path) -> Result<(), InvalidScopeError> {
    let escapes = Path::new(tenant).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(InvalidScopeError::EscapesRoot {
            tenant: tenant.to_string(),
            mount_root: mount_root.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn mount_with_tenant(tenant: &str) -> TempDir {
        let mount = TempDir::new().unwrap();
        fs::create_dir(mount.path().join(tenant)).unwrap();
        mount
    }

    #[test]
    fn resolves_mount_root_without_tenant() {
        let mount = TempDir::new().unwrap();
        let config = RunConfig::new(mount.path());

        let scope = resolve(&config).unwrap();
        assert_eq!(scope.root(), mount.path().canonicalize().unwrap());
    }

    #[test]
    fn resolves_tenant_subdirectory() {
        let mount = mount_with_tenant("acme");
        let config = RunConfig::new(mount.path()).with_tenant("acme");

        let scope = resolve(&config).unwrap();
        assert!(scope.root().ends_with("acme"));
        assert!(scope.root().starts_with(mount.path().canonicalize().unwrap()));
    }

    #[rstest]
    #[case::parent("../other")]
    #[case::nested_parent("acme/../../other")]
    #[case::absolute("/etc")]
    fn tenant_escaping_the_mount_is_rejected(#[case] tenant: &str) {
        let mount = TempDir::new().unwrap();
        let config = RunConfig::new(mount.path()).with_tenant(tenant);

        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::EscapesRoot { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn tenant_symlink_pointing_outside_is_rejected() {
        let outside = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), mount.path().join("acme")).unwrap();

        let config = RunConfig::new(mount.path()).with_tenant("acme");
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::EscapesRoot { .. }));
    }

    #[test]
    fn missing_tenant_directory_is_rejected() {
        let mount = TempDir::new().unwrap();
        let config = RunConfig::new(mount.path()).with_tenant("nope");

        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::Missing(_)));
    }

    #[test]
    fn missing_mount_root_is_rejected() {
        let config = RunConfig::new("/definitely/not/a/mount");
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::Missing(_)));
    }

    #[test]
    fn tenant_path_that_is_a_file_is_rejected() {
        let mount = TempDir::new().unwrap();
        fs::write(mount.path().join("acme"), b"not a dir").unwrap();

        let config = RunConfig::new(mount.path()).with_tenant("acme");
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::NotADirectory(_)));
    }

    #[test]
    fn bad_exclusion_pattern_is_rejected() {
        let mount = TempDir::new().unwrap();
        let config = RunConfig::new(mount.path()).with_exclude("[");

        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, InvalidScopeError::BadPattern { .. }));
    }

    #[rstest]
    #[case::log_excluded("b.log", false)]
    #[case::txt_eligible("a.txt", true)]
    #[case::nested_log("sub/dir/c.log", false)]
    fn exclusion_matches_base_names(#[case] path: &str, #[case] expected: bool) {
        let set = ExclusionSet::compile(&["*.log".to_string()]).unwrap();
        assert_eq!(set.eligible(Path::new(path)), expected);
    }

    #[test]
    fn first_matching_pattern_wins_but_any_match_excludes() {
        let set =
            ExclusionSet::compile(&["*.log".to_string(), "keep*".to_string()]).unwrap();
        assert!(!set.eligible(Path::new("x.log")));
        assert!(!set.eligible(Path::new("keep-me.txt")));
        assert!(set.eligible(Path::new("normal.txt")));
    }
}
