// dbrestore/src/restore/db_restore.rs
use anyhow::{Context, Result};
use postgres::{Client, NoTls};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::{ConnectionConfig, Driver, RestoreConfig};
use crate::errors::AppError;
use crate::utils::process::{CommandRunner, ShellCommand};

/// A restore target. Only success or failure is reported back; the reason
/// is logged by the implementation.
pub trait Database {
    fn restore(&self, dump: &Path) -> bool;
}

/// Looks up a configured connection by name, `None` meaning the default one.
pub trait ConnectionResolver {
    fn resolve(&self, name: Option<&str>) -> crate::errors::Result<Box<dyn Database + '_>>;
}

/// Resolves connections from `config.json`.
pub struct Connections<'a> {
    config: &'a RestoreConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Connections<'a> {
    pub fn new(config: &'a RestoreConfig, runner: &'a dyn CommandRunner) -> Self {
        Connections { config, runner }
    }

    fn lookup(&self, name: Option<&str>) -> crate::errors::Result<&'a ConnectionConfig> {
        let connections = &self.config.connections;
        let name = match name.or(self.config.default_connection.as_deref()) {
            Some(name) => name,
            None if connections.len() == 1 => connections.keys().next().map(String::as_str).unwrap_or_default(),
            None => {
                return Err(AppError::Config(
                    "no --database given and no default_connection configured".to_string(),
                ));
            }
        };

        connections
            .get(name)
            .ok_or_else(|| AppError::UnknownConnection(name.to_string()))
    }
}

impl ConnectionResolver for Connections<'_> {
    fn resolve(&self, name: Option<&str>) -> crate::errors::Result<Box<dyn Database + '_>> {
        let connection = self.lookup(name)?;
        log::debug!("Using connection '{}' ({:?})", connection.name, connection.driver);

        Ok(match connection.driver {
            Driver::Postgres => Box::new(PostgresDatabase {
                url: connection.url.clone(),
                check_connection: self.config.check_connection,
                runner: self.runner,
            }),
            Driver::Mysql => Box::new(MysqlDatabase {
                url: connection.url.clone(),
                runner: self.runner,
            }),
            Driver::Sqlite => Box::new(SqliteDatabase {
                database_file: sqlite_path_from_url(&connection.url)?,
            }),
        })
    }
}

fn report(kind: &str, dump: &Path, result: Result<()>) -> bool {
    match result {
        Ok(()) => {
            log::info!("✓ {} restore of {} finished", kind, dump.display());
            true
        }
        Err(e) => {
            log::error!("{} restore of {} failed: {:#}", kind, dump.display(), e);
            false
        }
    }
}

fn ensure_dump_exists(dump: &Path) -> Result<()> {
    if !dump.is_file() {
        return Err(anyhow::anyhow!("SQL file for restoration not found: {}", dump.display()));
    }
    Ok(())
}

/// Restores plain SQL dumps with `psql`.
pub struct PostgresDatabase<'a> {
    url: Url,
    check_connection: bool,
    runner: &'a dyn CommandRunner,
}

impl PostgresDatabase<'_> {
    fn psql_command(&self, dump: &Path) -> Result<ShellCommand> {
        let mut command = ShellCommand::new("psql")
            .arg("-X") // Do not read psqlrc
            .arg("-q")
            .arg("-v")
            .arg("ON_ERROR_STOP=1")
            .arg("-h")
            .arg(self.url.host_str().unwrap_or("localhost"))
            .arg("-p")
            .arg(self.url.port().unwrap_or(5432).to_string());
        if !self.url.username().is_empty() {
            command = command.arg("-U").arg(decode_component(self.url.username()));
        }
        command = command
            .arg("-d")
            .arg(get_db_name_from_url(&self.url)?)
            .arg("-f")
            .arg(dump);
        if let Some(password) = self.url.password() {
            command = command.env("PGPASSWORD", decode_component(password));
        }
        Ok(command)
    }

    fn try_restore(&self, dump: &Path) -> Result<()> {
        ensure_dump_exists(dump)?;
        if self.check_connection && !check_db_connection(&self.url) {
            anyhow::bail!("Cannot proceed with restore - database connection failed");
        }

        let command = self.psql_command(dump)?;
        if !self.runner.run(&command).context("Failed to execute psql")? {
            anyhow::bail!("psql exited unsuccessfully");
        }
        Ok(())
    }
}

impl Database for PostgresDatabase<'_> {
    fn restore(&self, dump: &Path) -> bool {
        report("Postgres", dump, self.try_restore(dump))
    }
}

/// Restores plain SQL dumps by feeding them to the `mysql` client.
pub struct MysqlDatabase<'a> {
    url: Url,
    runner: &'a dyn CommandRunner,
}

impl MysqlDatabase<'_> {
    fn mysql_command(&self, dump: &Path) -> Result<ShellCommand> {
        let mut command = ShellCommand::new("mysql")
            .arg(format!("--host={}", self.url.host_str().unwrap_or("localhost")))
            .arg(format!("--port={}", self.url.port().unwrap_or(3306)));
        if !self.url.username().is_empty() {
            command = command.arg(format!("--user={}", decode_component(self.url.username())));
        }
        command = command
            .arg(get_db_name_from_url(&self.url)?)
            .stdin_from(dump);
        if let Some(password) = self.url.password() {
            command = command.env("MYSQL_PWD", decode_component(password));
        }
        Ok(command)
    }

    fn try_restore(&self, dump: &Path) -> Result<()> {
        ensure_dump_exists(dump)?;
        let command = self.mysql_command(dump)?;
        if !self.runner.run(&command).context("Failed to execute mysql")? {
            anyhow::bail!("mysql exited unsuccessfully");
        }
        Ok(())
    }
}

impl Database for MysqlDatabase<'_> {
    fn restore(&self, dump: &Path) -> bool {
        report("MySQL", dump, self.try_restore(dump))
    }
}

/// A SQLite dump is a copy of the database file itself.
pub struct SqliteDatabase {
    database_file: PathBuf,
}

impl SqliteDatabase {
    fn try_restore(&self, dump: &Path) -> Result<()> {
        ensure_dump_exists(dump)?;
        fs::copy(dump, &self.database_file).with_context(|| {
            format!(
                "Failed to copy {} over {}",
                dump.display(),
                self.database_file.display()
            )
        })?;
        Ok(())
    }
}

impl Database for SqliteDatabase {
    fn restore(&self, dump: &Path) -> bool {
        report("SQLite", dump, self.try_restore(dump))
    }
}

pub fn check_db_connection(db_url: &Url) -> bool {
    let mut safe_url = db_url.clone();
    let _ = safe_url.set_password(None);

    match Client::connect(db_url.as_str(), NoTls) {
        Ok(_) => {
            log::info!("✅ Successfully connected to {}", safe_url);
            true
        }
        Err(e) => {
            log::error!("❌ Failed to connect to {}: {}", safe_url, e);
            false
        }
    }
}

/// Extracts the database name from a connection URL.
pub fn get_db_name_from_url(db_url: &Url) -> Result<String> {
    let path = db_url.path().trim_start_matches('/');
    if path.is_empty() {
        Err(anyhow::anyhow!("Database name not found in URL path: {}", db_url.scheme()))
    } else {
        Ok(decode_component(path))
    }
}

/// `sqlite:///abs/app.db` or `sqlite://relative/app.db`.
fn sqlite_path_from_url(url: &Url) -> crate::errors::Result<PathBuf> {
    let path = format!("{}{}", url.host_str().unwrap_or(""), url.path());
    if path.is_empty() {
        return Err(AppError::Config(
            "sqlite connection URL does not name a database file".to_string(),
        ));
    }
    Ok(PathBuf::from(decode_component(&path)))
}

/// Percent-decodes a URL component; malformed escapes are kept verbatim.
fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(value);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
