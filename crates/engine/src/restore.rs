// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The restore pipeline: gated materialization of a past run back onto
//! the host, and exportable restore bundles.

use crate::deps::EngineDeps;
use crate::error::PipelineError;
use crate::orchestrator::JobCtx;
use ob_core::{RestoreMode, RestoreReq};
use std::path::{Path, PathBuf};
use tracing::info;

/// A materialized run directory. When the source came from the repo it
/// lives in a scratch dir that is removed on drop — on every exit path.
struct RestoreSource {
    dir: PathBuf,
    _scratch: Option<tempfile::TempDir>,
}

pub fn run(
    deps: &EngineDeps,
    ctx: &JobCtx,
    req: &RestoreReq,
) -> Result<serde_json::Value, PipelineError> {
    let log = ctx.log_path.as_path();

    // The handler already gated this; a non-HTTP caller gets the same
    // refusal here.
    if !req.confirmation_ok() {
        return Err(PipelineError::ConfirmationMismatch);
    }

    if req.mode == RestoreMode::ExportBundle {
        return export_bundle(deps, &req.run_id, log);
    }

    let source = ensure_restore_source(deps, &req.run_id, log)?;
    let mut actions: Vec<serde_json::Value> = Vec::new();

    if matches!(req.mode, RestoreMode::RestoreDb | RestoreMode::Full) {
        restore_dbs(deps, req, &source.dir, log, &mut actions)?;
    }
    if matches!(req.mode, RestoreMode::RestoreFiles | RestoreMode::Full) {
        restore_files(deps, req, &source.dir, log, &mut actions)?;
    }
    if matches!(req.mode, RestoreMode::RestoreCaddy | RestoreMode::Full) {
        restore_caddy(deps, &source.dir, log, &mut actions)?;
    }

    info!(run_id = %req.run_id, mode = %req.mode, actions = actions.len(), "restore complete");

    Ok(serde_json::json!({
        "run_id": req.run_id,
        "mode": req.mode.as_str(),
        "source": source.dir,
        "actions": actions,
    }))
}

/// Local work dir if this host still has it, else a repo restore into
/// scratch space. The snapshot embeds the original absolute path, so
/// the run dir sits below `<scratch>/srv/backups/work/<run_id>`.
fn ensure_restore_source(
    deps: &EngineDeps,
    run_id: &str,
    log: &Path,
) -> Result<RestoreSource, PipelineError> {
    let local = deps.paths.job_work_dir(run_id);
    if local.is_dir() {
        return Ok(RestoreSource {
            dir: local,
            _scratch: None,
        });
    }

    let scratch = tempfile::tempdir().map_err(PipelineError::io("restore scratch"))?;
    deps.restic.restore_run(run_id, scratch.path(), log)?;
    let embedded = deps.paths.embedded_work_dir(scratch.path(), run_id);
    if !embedded.is_dir() {
        return Err(PipelineError::SourceMissing(embedded));
    }
    Ok(RestoreSource {
        dir: embedded,
        _scratch: Some(scratch),
    })
}

/// Stream dumps back into each selected app's database container.
fn restore_dbs(
    deps: &EngineDeps,
    req: &RestoreReq,
    source: &Path,
    log: &Path,
    actions: &mut Vec<serde_json::Value>,
) -> Result<(), PipelineError> {
    // Overwriting a live database on the host that took the backup is
    // almost always a mistake; the default stance refuses it.
    if !req.allow_same_server {
        return Err(PipelineError::SameServerRefused);
    }

    let apps = deps.load_apps()?;
    for (key, cfg) in apps.resolve(req.apps.as_deref())? {
        let dump = source.join("db").join(format!("{key}.sql.gz"));
        if !dump.exists() {
            continue;
        }
        let Some(container) = &cfg.db_container else {
            continue;
        };
        let db = cfg.db_name(&key);

        let tables = deps
            .docker
            .table_count(container, cfg.db_user(), db, log)?;
        if tables > 0 {
            return Err(PipelineError::TargetNotEmpty {
                db: db.to_string(),
                tables,
            });
        }

        deps.docker
            .restore_db(container, cfg.db_user(), db, &dump, log)?;
        actions.push(serde_json::json!({"app": key, "db": db, "restored": "db"}));
    }
    Ok(())
}

/// Extract each selected file archive with absolute paths preserved.
fn restore_files(
    deps: &EngineDeps,
    req: &RestoreReq,
    source: &Path,
    log: &Path,
    actions: &mut Vec<serde_json::Value>,
) -> Result<(), PipelineError> {
    let files_dir = source.join("files");
    for archive in sorted_archives(&files_dir)? {
        if let Some(apps) = &req.apps {
            let name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !apps.iter().any(|app| name == format!("{app}_files.tar.zst")) {
                continue;
            }
        }
        deps.archiver.extract_absolute(&archive, log)?;
        actions.push(serde_json::json!({"archive": archive, "restored": "files"}));
    }
    Ok(())
}

/// Extract the proxy config archive with absolute paths preserved.
fn restore_caddy(
    deps: &EngineDeps,
    source: &Path,
    log: &Path,
    actions: &mut Vec<serde_json::Value>,
) -> Result<(), PipelineError> {
    let archive = source.join("caddy").join("caddy_config.tar.zst");
    if archive.exists() {
        deps.archiver.extract_absolute(&archive, log)?;
        actions.push(serde_json::json!({"archive": archive, "restored": "caddy"}));
    }
    Ok(())
}

/// Materialize the run, copy it under `restore_bundle_<run_id>/` with an
/// operator guide, and archive the bundle into the meta dir.
fn export_bundle(
    deps: &EngineDeps,
    run_id: &str,
    log: &Path,
) -> Result<serde_json::Value, PipelineError> {
    let source = ensure_restore_source(deps, run_id, log)?;

    let parent = tempfile::tempdir().map_err(PipelineError::io("bundle staging"))?;
    let bundle_name = format!("restore_bundle_{run_id}");
    let bundle_dir = parent.path().join(&bundle_name);
    copy_tree(&source.dir, &bundle_dir)?;
    let guide = bundle_dir.join("RESTORE_GUIDE.md");
    std::fs::write(&guide, restore_guide(run_id)).map_err(PipelineError::io(&guide))?;

    let out = deps.paths.restore_bundle(run_id);
    deps.archiver
        .create_relative(&out, parent.path(), &[bundle_name], log)?;

    info!(run_id, bundle = %out.display(), "bundle exported");
    Ok(serde_json::json!({"run_id": run_id, "bundle": out}))
}

/// Operator instructions shipped inside every bundle.
pub(crate) fn restore_guide(run_id: &str) -> String {
    format!(
        "# Restore guide for run {run_id}\n\
         \n\
         This bundle is a self-contained copy of the run's work directory.\n\
         \n\
         Contents:\n\
         - `db/<app>.sql.gz` — gzipped SQL dumps, one per app\n\
         - `files/<app>_files.tar.zst` — app files with absolute paths\n\
         - `env/<app>_env.tar.zst.age` — env files, encrypted to the ops key\n\
         - `caddy/caddy_config.tar.zst` — reverse-proxy config\n\
         \n\
         ## Database\n\
         \n\
         ```\n\
         gzip -dc db/<app>.sql.gz | docker exec -i <db-container> psql -U <db-user> -d <db-name>\n\
         ```\n\
         \n\
         The target database must be empty; drop and recreate it first if\n\
         needed.\n\
         \n\
         ## Files and proxy config\n\
         \n\
         Archives store absolute paths. Extract with `-P` on the target\n\
         host:\n\
         \n\
         ```\n\
         tar --zstd -xf files/<app>_files.tar.zst -P\n\
         tar --zstd -xf caddy/caddy_config.tar.zst -P\n\
         ```\n\
         \n\
         ## Env files\n\
         \n\
         Decrypt with the ops private key, then unpack:\n\
         \n\
         ```\n\
         age -d -i age.key env/<app>_env.tar.zst.age | tar --zstd -x\n\
         ```\n"
    )
}

/// `*.tar.zst` entries of a directory, sorted by path.
fn sorted_archives(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut archives = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(archives),
        Err(source) => return Err(PipelineError::io(dir)(source)),
    };
    for entry in entries {
        let entry = entry.map_err(PipelineError::io(dir))?;
        let path = entry.path();
        if path.to_string_lossy().ends_with(".tar.zst") {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dst).map_err(PipelineError::io(dst))?;
    for entry in std::fs::read_dir(src).map_err(PipelineError::io(src))? {
        let entry = entry.map_err(PipelineError::io(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(PipelineError::io(&from))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
