// dbrestore/src/restore/decompress.rs
use std::path::{Path, PathBuf};

use crate::utils::process::ShellCommand;

/// Suffix marking a gzip-compressed dump. Only the name is inspected, never
/// the file contents.
pub const COMPRESSED_EXTENSION: &str = ".gz";

fn compressed_stem(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(COMPRESSED_EXTENSION))
        .filter(|stem| !stem.is_empty())
}

pub fn is_compressed(path: &Path) -> bool {
    compressed_stem(path).is_some()
}

/// Returns `path` with one trailing `.gz` removed, or `path` unchanged.
pub fn uncompressed_file_name(path: &Path) -> PathBuf {
    match compressed_stem(path) {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

/// `gzip -dc <source> > <target>`
pub fn gunzip_command(gzip_program: &str, source: &Path, target: &Path) -> ShellCommand {
    ShellCommand::new(gzip_program)
        .arg("-dc")
        .arg(source)
        .stdout_to(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_file_name_leaves_plain_names() {
        for name in ["dump.sql", "dumps/2024-01-01.sql", "archive.tgz", "gz", "data.gzip", "a.gz.sql"] {
            assert_eq!(uncompressed_file_name(Path::new(name)), PathBuf::from(name));
            assert!(!is_compressed(Path::new(name)));
        }
    }

    #[test]
    fn test_uncompressed_file_name_strips_single_suffix() {
        for (name, expected) in [
            ("dump.sql.gz", "dump.sql"),
            ("/srv/dumps/2024-01-01.sql.gz", "/srv/dumps/2024-01-01.sql"),
            ("backup.gz", "backup"),
        ] {
            let once = uncompressed_file_name(Path::new(name));
            assert_eq!(once, PathBuf::from(expected));
            assert!(is_compressed(Path::new(name)));
            assert_eq!(uncompressed_file_name(&once), once);
        }
    }

    #[test]
    fn test_uncompressed_file_name_strips_exactly_one_suffix() {
        assert_eq!(
            uncompressed_file_name(Path::new("dump.sql.gz.gz")),
            PathBuf::from("dump.sql.gz")
        );
    }

    #[test]
    fn test_bare_extension_is_not_compressed() {
        assert!(!is_compressed(Path::new(".gz")));
        assert_eq!(uncompressed_file_name(Path::new("dir/.gz")), PathBuf::from("dir/.gz"));
    }

    #[test]
    fn test_gunzip_command_shape() {
        let command = gunzip_command("gzip", Path::new("/d/a.sql.gz"), Path::new("/d/a.sql"));
        assert_eq!(command.to_string(), "gzip -dc /d/a.sql.gz > /d/a.sql");
        assert_eq!(command.stdin, None);
    }
}
