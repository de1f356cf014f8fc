// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run metadata specs: manifest shape, checksum sidecars, and
//! latest-run selection for replication.

use chrono::{TimeZone, Utc};
use ob_core::{Artifact, ArtifactKind, Manifest, OpsPaths, Scope};

fn paths(dir: &tempfile::TempDir) -> OpsPaths {
    let paths = OpsPaths::new(dir.path().join("ops"), dir.path().join("backups"));
    paths.ensure_tree().unwrap();
    paths
}

fn write_run(paths: &OpsPaths, run_id: &str) -> Manifest {
    let mut manifest = Manifest::new(
        run_id,
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        vec!["blog".into()],
        vec![Scope::Db, Scope::Files, Scope::Env, Scope::Caddy],
        "backup-host",
    );
    manifest.artifacts.push(Artifact {
        kind: ArtifactKind::Db,
        app: Some("blog".into()),
        path: paths.job_work_dir(run_id).join("db/blog.sql.gz"),
        size: 64,
        sha256: "cd".repeat(32),
    });
    std::fs::create_dir_all(paths.run_meta_dir(run_id)).unwrap();
    manifest.write_pretty(&paths.manifest_path(run_id)).unwrap();
    std::fs::write(paths.checksums_path(run_id), manifest.checksum_lines()).unwrap();
    manifest
}

#[test]
fn meta_tree_matches_the_layout() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(&dir);
    write_run(&p, "20260115120000-0a1b2c3d");

    assert!(p
        .runs_dir()
        .join("20260115120000-0a1b2c3d/manifest.json")
        .is_file());
    assert!(p
        .runs_dir()
        .join("20260115120000-0a1b2c3d/checksums.sha256")
        .is_file());
}

#[test]
fn checksum_sidecar_pairs_hash_and_absolute_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(&dir);
    let manifest = write_run(&p, "20260115120000-0a1b2c3d");

    let sidecar =
        std::fs::read_to_string(p.checksums_path("20260115120000-0a1b2c3d")).unwrap();
    let artifact = &manifest.artifacts[0];
    assert_eq!(
        sidecar.trim_end(),
        format!("{}  {}", artifact.sha256, artifact.path.display())
    );
}

#[test]
fn loaded_manifest_round_trips_the_canonical_shape() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(&dir);
    let written = write_run(&p, "20260115120000-0a1b2c3d");

    let loaded = Manifest::load(&p.manifest_path("20260115120000-0a1b2c3d")).unwrap();
    assert_eq!(loaded, written);
    assert_eq!(loaded.kind, "backup");
    assert!(loaded.restic.snapshot_id.is_none());
}

#[test]
fn upload_latest_picks_the_greatest_run_with_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(&dir);
    write_run(&p, "20260114080000-aaaaaaaa");
    write_run(&p, "20260115120000-bbbbbbbb");
    // A bare run dir without a manifest must never be chosen.
    std::fs::create_dir_all(p.run_meta_dir("20260116000000-cccccccc")).unwrap();

    assert_eq!(
        ob_engine::runs::latest_run_id(&p).unwrap().as_deref(),
        Some("20260115120000-bbbbbbbb")
    );
}

#[test]
fn manifest_listing_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(&dir);
    write_run(&p, "20260114080000-aaaaaaaa");
    write_run(&p, "20260115120000-bbbbbbbb");

    let listed = ob_engine::runs::list_manifests(&p).unwrap();
    let ids: Vec<&str> = listed.iter().map(|m| m.job_id.as_str()).collect();
    assert_eq!(ids, vec!["20260115120000-bbbbbbbb", "20260114080000-aaaaaaaa"]);
}
