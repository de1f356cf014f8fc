// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backup pipeline: per-app artifacts, a run manifest, and one
//! repo snapshot tying them together.

use crate::deps::EngineDeps;
use crate::error::PipelineError;
use crate::orchestrator::JobCtx;
use chrono::Utc;
use ob_core::{AppConfig, Artifact, ArtifactKind, BackupReq, Manifest, Scope, ScopeSet};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// Compose files probed inside each app's `compose_dir`.
pub(crate) const COMPOSE_FILES: [&str; 3] = ["docker-compose.yml", "compose.yml", "Caddyfile"];

/// Host-wide reverse-proxy config locations for the `caddy` scope.
pub(crate) const CADDY_CONFIG_PATHS: [&str; 2] = ["/etc/caddy", "/srv/caddy"];

pub fn run(
    deps: &EngineDeps,
    ctx: &JobCtx,
    req: &BackupReq,
) -> Result<serde_json::Value, PipelineError> {
    let log = ctx.log_path.as_path();
    let started = std::time::Instant::now();

    deps.restic.ensure_init(Some(log))?;

    // Unknown app keys fail here, before any artifact is produced.
    let apps = deps.load_apps()?;
    let resolved = apps.resolve(req.apps.as_deref())?;
    let scopes = req.scope_set();
    let app_keys: Vec<String> = resolved.iter().map(|(k, _)| k.clone()).collect();

    let work = deps.paths.job_work_dir(ctx.job_id.as_str());
    for scope in Scope::ALL {
        std::fs::create_dir_all(work.join(scope.as_str()))
            .map_err(PipelineError::io(&work))?;
    }

    let recipient = if scopes.contains(Scope::Env) {
        Some(deps.age.recipient()?)
    } else {
        None
    };

    let mut manifest = Manifest::new(
        ctx.job_id.as_str(),
        Utc::now(),
        app_keys.clone(),
        scopes.to_vec(),
        deps.host.clone(),
    );

    for (key, cfg) in &resolved {
        if scopes.contains(Scope::Db) {
            if let Some(artifact) = backup_db(deps, key, cfg, &work, log)? {
                manifest.artifacts.push(artifact);
            }
        }
        if scopes.contains(Scope::Files) {
            if let Some(artifact) = backup_files(deps, key, cfg, &work, log)? {
                manifest.artifacts.push(artifact);
            }
        }
        if scopes.contains(Scope::Env) {
            if let Some(recipient) = &recipient {
                if let Some(artifact) = backup_env(deps, key, cfg, recipient, &work, log)? {
                    manifest.artifacts.push(artifact);
                }
            }
        }
    }

    if scopes.contains(Scope::Caddy) {
        if let Some(artifact) = backup_caddy(deps, &work, log)? {
            manifest.artifacts.push(artifact);
        }
    }

    let tags = snapshot_tags(ctx.job_id.as_str(), &scopes, &deps.host, &app_keys);
    deps.restic.backup(&work, &tags, log)?;
    manifest.restic.snapshot_id = deps
        .restic
        .snapshot_for_run(ctx.job_id.as_str())?
        .map(|s| s.id);

    let meta_dir = deps.paths.run_meta_dir(ctx.job_id.as_str());
    std::fs::create_dir_all(&meta_dir).map_err(PipelineError::io(&meta_dir))?;
    manifest.write_pretty(&deps.paths.manifest_path(ctx.job_id.as_str()))?;
    let checksums = deps.paths.checksums_path(ctx.job_id.as_str());
    std::fs::write(&checksums, manifest.checksum_lines())
        .map_err(PipelineError::io(&checksums))?;

    let duration = started.elapsed().as_secs_f64();
    let epoch = Utc::now().timestamp();
    for app in &app_keys {
        deps.metrics.record_backup_success(app, epoch, duration);
    }

    info!(
        run_id = %ctx.job_id,
        artifacts = manifest.artifacts.len(),
        snapshot = manifest.restic.snapshot_id.as_deref().unwrap_or("none"),
        "backup complete"
    );

    Ok(serde_json::json!({
        "run_id": ctx.job_id.as_str(),
        "apps": app_keys,
        "artifact_count": manifest.artifacts.len(),
        "snapshot_id": manifest.restic.snapshot_id,
        "manifest": deps.paths.manifest_path(ctx.job_id.as_str()),
    }))
}

/// Dump the app's database through gzip and self-test the result.
fn backup_db(
    deps: &EngineDeps,
    key: &str,
    cfg: &AppConfig,
    work: &Path,
    log: &Path,
) -> Result<Option<Artifact>, PipelineError> {
    let Some(container) = &cfg.db_container else {
        return Ok(None);
    };
    let out = work.join("db").join(format!("{key}.sql.gz"));
    deps.docker
        .dump_db(container, cfg.db_user(), cfg.db_name(key), &out, log)?;
    deps.archiver.gzip_test(&out, log)?;
    Ok(Some(hash_artifact(ArtifactKind::Db, Some(key), &out)?))
}

/// Archive the app's compose files and data paths, absolute paths
/// preserved, then self-test and list for truncation.
fn backup_files(
    deps: &EngineDeps,
    key: &str,
    cfg: &AppConfig,
    work: &Path,
    log: &Path,
) -> Result<Option<Artifact>, PipelineError> {
    let paths = collect_app_paths(cfg);
    if paths.is_empty() {
        return Ok(None);
    }
    let out = work.join("files").join(format!("{key}_files.tar.zst"));
    deps.archiver.create_absolute(&out, &paths, log)?;
    deps.archiver.selftest(&out, log)?;
    deps.archiver.list(&out, log)?;
    Ok(Some(hash_artifact(ArtifactKind::Files, Some(key), &out)?))
}

/// Stage declared env files by name, archive, encrypt to the recipient,
/// and drop the plaintext tar.
fn backup_env(
    deps: &EngineDeps,
    key: &str,
    cfg: &AppConfig,
    recipient: &str,
    work: &Path,
    log: &Path,
) -> Result<Option<Artifact>, PipelineError> {
    let existing: Vec<&PathBuf> = cfg.env_files.iter().filter(|p| p.exists()).collect();
    if existing.is_empty() {
        return Ok(None);
    }

    // Staging dir is dropped on every exit path.
    let stage = tempfile::tempdir().map_err(PipelineError::io("env staging"))?;
    let mut names: Vec<String> = Vec::new();
    for src in existing {
        let Some(name) = src.file_name() else {
            continue;
        };
        std::fs::copy(src, stage.path().join(name)).map_err(PipelineError::io(src))?;
        names.push(name.to_string_lossy().into_owned());
    }
    names.sort();
    names.dedup();

    let plain = stage.path().join(format!("{key}_env.tar.zst"));
    deps.archiver
        .create_relative(&plain, stage.path(), &names, log)?;

    let out = work.join("env").join(format!("{key}_env.tar.zst.age"));
    let encrypted = deps.age.encrypt(recipient, &plain, &out, log);
    // The plaintext tar goes away whether or not encryption worked.
    let _ = std::fs::remove_file(&plain);
    encrypted?;

    Ok(Some(hash_artifact(
        ArtifactKind::EnvEncrypted,
        Some(key),
        &out,
    )?))
}

/// Archive the host's reverse-proxy config. Not per-app.
fn backup_caddy(
    deps: &EngineDeps,
    work: &Path,
    log: &Path,
) -> Result<Option<Artifact>, PipelineError> {
    let paths: Vec<PathBuf> = CADDY_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .collect();
    if paths.is_empty() {
        return Ok(None);
    }
    let out = work.join("caddy").join("caddy_config.tar.zst");
    deps.archiver.create_absolute(&out, &paths, log)?;
    deps.archiver.selftest(&out, log)?;
    Ok(Some(hash_artifact(ArtifactKind::Caddy, None, &out)?))
}

/// Existing compose files ∪ existing data paths, sorted and deduplicated
/// by absolute path.
pub(crate) fn collect_app_paths(cfg: &AppConfig) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    if let Some(dir) = &cfg.compose_dir {
        for name in COMPOSE_FILES {
            let candidate = dir.join(name);
            if candidate.exists() {
                paths.push(candidate);
            }
        }
    }
    for group in [&cfg.media_paths, &cfg.static_paths, &cfg.extra_paths] {
        paths.extend(group.iter().filter(|p| p.exists()).cloned());
    }
    paths.sort();
    paths.dedup();
    paths
}

/// Snapshot tags, in stable order: run, scope, server, then one per app.
pub(crate) fn snapshot_tags(
    run_id: &str,
    scopes: &ScopeSet,
    host: &str,
    apps: &[String],
) -> Vec<String> {
    let mut tags = vec![
        format!("run:{run_id}"),
        format!("scope:{}", scopes.label()),
        format!("server:{host}"),
    ];
    tags.extend(apps.iter().map(|app| format!("app:{app}")));
    tags
}

/// Size and sha256 of a produced file, at manifest-write time.
pub(crate) fn hash_artifact(
    kind: ArtifactKind,
    app: Option<&str>,
    path: &Path,
) -> Result<Artifact, PipelineError> {
    let meta = std::fs::metadata(path).map_err(PipelineError::io(path))?;
    Ok(Artifact {
        kind,
        app: app.map(str::to_string),
        path: path.to_path_buf(),
        size: meta.len(),
        sha256: sha256_file(path)?,
    })
}

pub(crate) fn sha256_file(path: &Path) -> Result<String, PipelineError> {
    let mut file = std::fs::File::open(path).map_err(PipelineError::io(path))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(PipelineError::io(path))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
