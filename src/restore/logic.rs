// dbrestore/src/restore/logic.rs
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::db_restore::{ConnectionResolver, Database};
use super::decompress::{gunzip_command, is_compressed, uncompressed_file_name};
use crate::config::RestoreConfig;
use crate::errors::{AppError, Result};
use crate::utils::console::{Console, Style};
use crate::utils::process::CommandRunner;

/// How a restore invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Listed,
    SourceMissing,
    DecompressFailed,
    RestoreFailed,
}

impl RestoreOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, RestoreOutcome::Restored | RestoreOutcome::Listed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UncompressError {
    #[error("file does not exist")]
    SourceMissing,
    #[error("decompression failed")]
    DecompressFailed,
    #[error("uncompressed target already exists")]
    TargetExists,
}

/// Restores a dump from the dumps directory, or lists the saved dumps when
/// no file name is given.
pub struct RestoreCommand<'a> {
    config: &'a RestoreConfig,
    connections: &'a dyn ConnectionResolver,
    runner: &'a dyn CommandRunner,
    console: &'a mut dyn Console,
}

impl<'a> RestoreCommand<'a> {
    pub fn new(
        config: &'a RestoreConfig,
        connections: &'a dyn ConnectionResolver,
        runner: &'a dyn CommandRunner,
        console: &'a mut dyn Console,
    ) -> Self {
        RestoreCommand {
            config,
            connections,
            runner,
            console,
        }
    }

    pub fn run(&mut self, connection: Option<&str>, dump: Option<&str>) -> Result<RestoreOutcome> {
        let connections = self.connections;
        let database = connections.resolve(connection)?;

        match dump {
            Some(file_name) => self.restore_dump(database.as_ref(), file_name),
            None => {
                self.list_dumps()?;
                Ok(RestoreOutcome::Listed)
            }
        }
    }

    fn restore_dump(&mut self, database: &dyn Database, file_name: &str) -> Result<RestoreOutcome> {
        validate_dump_file_name(file_name)?;
        let source_file = self.config.dumps_path.join(file_name);
        log::info!("Restoring {}", source_file.display());

        let outcome = if is_compressed(&source_file) {
            match self.uncompress(&source_file) {
                Ok(uncompressed_file) => {
                    let restored = database.restore(&uncompressed_file);
                    self.cleanup(&uncompressed_file);
                    if restored {
                        RestoreOutcome::Restored
                    } else {
                        RestoreOutcome::RestoreFailed
                    }
                }
                Err(UncompressError::SourceMissing) => RestoreOutcome::SourceMissing,
                Err(UncompressError::DecompressFailed | UncompressError::TargetExists) => {
                    RestoreOutcome::DecompressFailed
                }
            }
        } else if database.restore(&source_file) {
            RestoreOutcome::Restored
        } else {
            RestoreOutcome::RestoreFailed
        };

        if outcome == RestoreOutcome::Restored {
            self.console.line(
                &format!("\n{} was successfully restored.\n", file_name),
                Style::Success,
            );
        } else {
            self.console.line("\nDatabase restore failed.\n", Style::Failure);
        }
        Ok(outcome)
    }

    /// Prints the dumps directory contents and returns the listed names.
    pub fn list_dumps(&mut self) -> Result<Vec<String>> {
        let dumps = find_dumps(&self.config.dumps_path)?;

        match dumps.split_last() {
            None => {
                self.console.line("\nYou haven't saved any dumps.\n", Style::Data);
            }
            Some((last, rest)) => {
                self.console
                    .line("\nPlease select one of the following dumps:\n", Style::Info);
                for dump in rest {
                    self.console.line(dump, Style::Data);
                }
                self.console.line(&format!("{}\n", last), Style::Data);
            }
        }
        Ok(dumps)
    }

    /// Decompresses `source_file` next to itself, without the `.gz` suffix.
    pub fn uncompress(&mut self, source_file: &Path) -> std::result::Result<PathBuf, UncompressError> {
        if !source_file.exists() {
            self.console
                .line("\nUncompress failed. File does not exist.\n", Style::Failure);
            return Err(UncompressError::SourceMissing);
        }

        let target_file = uncompressed_file_name(source_file);
        // The target is removed after the restore, so it must not be a user file.
        if fs::symlink_metadata(&target_file).is_ok() {
            log::error!(
                "{} already exists; refusing to overwrite it with the uncompressed dump",
                target_file.display()
            );
            self.console.line(
                &format!(
                    "\nUncompress failed. {} already exists.\n",
                    target_file.display()
                ),
                Style::Failure,
            );
            return Err(UncompressError::TargetExists);
        }

        let command = gunzip_command(&self.config.gzip_program, source_file, &target_file);
        let succeeded = match self.runner.run(&command) {
            Ok(status) => status && target_file.is_file(),
            Err(e) => {
                log::error!("Could not run `{}`: {}", command, e);
                false
            }
        };

        if !succeeded {
            // Anything at the target now was written by this run.
            if fs::symlink_metadata(&target_file).is_ok() && !self.cleanup(&target_file) {
                log::warn!("Partial output {} was left behind", target_file.display());
            }
            self.console.line("\nFile uncompress failed.\n", Style::Failure);
            return Err(UncompressError::DecompressFailed);
        }

        log::debug!("Uncompressed {} to {}", source_file.display(), target_file.display());
        Ok(target_file)
    }

    /// Removes a temporary uncompressed dump.
    pub fn cleanup(&self, file: &Path) -> bool {
        match fs::remove_file(file) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to remove temporary file {}: {}", file.display(), e);
                false
            }
        }
    }
}

/// Accepts bare file names only; the dumps directory is always the base.
pub fn validate_dump_file_name(file_name: &str) -> Result<()> {
    let invalid = file_name.trim().is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\']);
    if invalid {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a dump file name; pass the name of a file inside the dumps directory",
            file_name
        )));
    }
    Ok(())
}

/// Regular, non-hidden files directly inside `dumps_dir`, sorted by name.
pub fn find_dumps(dumps_dir: &Path) -> Result<Vec<String>> {
    if !dumps_dir.is_dir() {
        log::warn!("Dumps directory {} does not exist", dumps_dir.display());
        return Ok(Vec::new());
    }

    let mut dumps = Vec::new();
    for entry in WalkDir::new(dumps_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Only the directory itself failing to open is fatal.
            Err(e) if e.depth() == 0 => return Err(AppError::Io(e.into())),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dumps_dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        dumps.push(name);
    }
    Ok(dumps)
}
