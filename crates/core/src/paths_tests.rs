// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn paths() -> OpsPaths {
    OpsPaths::new("/srv/ops", "/srv/backups")
}

#[test]
fn layout_matches_production_tree() {
    let p = paths();
    assert_eq!(p.apps_file(), PathBuf::from("/srv/ops/config/apps.yml"));
    assert_eq!(p.token_file(), PathBuf::from("/srv/ops/config/ops_token.txt"));
    assert_eq!(
        p.restic_password_file(),
        PathBuf::from("/srv/ops/config/restic_password.txt")
    );
    assert_eq!(p.age_key_file(), PathBuf::from("/srv/ops/config/age.key"));
    assert_eq!(p.rclone_conf(), PathBuf::from("/srv/ops/config/rclone.conf"));
    assert_eq!(p.audit_log(), PathBuf::from("/srv/ops/logs/audit.log"));
    assert_eq!(
        p.run_log("20260115120000-0a1b2c3d"),
        PathBuf::from("/srv/ops/logs/runs/20260115120000-0a1b2c3d.log")
    );
    assert_eq!(
        p.job_work_dir("20260115120000-0a1b2c3d"),
        PathBuf::from("/srv/backups/work/20260115120000-0a1b2c3d")
    );
    assert_eq!(
        p.manifest_path("x"),
        PathBuf::from("/srv/backups/meta/runs/x/manifest.json")
    );
    assert_eq!(
        p.checksums_path("x"),
        PathBuf::from("/srv/backups/meta/runs/x/checksums.sha256")
    );
    assert_eq!(p.registry_db(), PathBuf::from("/srv/backups/meta/backups.sqlite"));
    assert_eq!(
        p.restore_bundle("x"),
        PathBuf::from("/srv/backups/meta/restore_bundle_x.tar.zst")
    );
    assert_eq!(p.repo_dir(), PathBuf::from("/srv/backups/restic_repo"));
}

#[test]
#[serial]
fn from_env_honors_overrides() {
    std::env::set_var("OPS_DIR", "/tmp/ops-test");
    std::env::set_var("OPS_BACKUP_ROOT", "/tmp/backups-test");
    let p = OpsPaths::from_env();
    assert_eq!(p.ops_dir, PathBuf::from("/tmp/ops-test"));
    assert_eq!(p.backup_root, PathBuf::from("/tmp/backups-test"));
    std::env::remove_var("OPS_DIR");
    std::env::remove_var("OPS_BACKUP_ROOT");
}

#[test]
#[serial]
fn from_env_defaults() {
    std::env::remove_var("OPS_DIR");
    std::env::remove_var("OPS_BACKUP_ROOT");
    let p = OpsPaths::from_env();
    assert_eq!(p.ops_dir, PathBuf::from(DEFAULT_OPS_DIR));
    assert_eq!(p.backup_root, PathBuf::from(DEFAULT_BACKUP_ROOT));
}

#[test]
fn ensure_tree_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let p = OpsPaths::new(dir.path().join("ops"), dir.path().join("backups"));
    p.ensure_tree().unwrap();
    assert!(p.config_dir().is_dir());
    assert!(p.run_logs_dir().is_dir());
    assert!(p.work_dir().is_dir());
    assert!(p.runs_dir().is_dir());
}

#[test]
fn embedded_work_dir_joins_absolute_layout() {
    let p = paths();
    let target = Path::new("/tmp/restore-abc");
    assert_eq!(
        p.embedded_work_dir(target, "20260115120000-0a1b2c3d"),
        PathBuf::from("/tmp/restore-abc/srv/backups/work/20260115120000-0a1b2c3d")
    );
}
