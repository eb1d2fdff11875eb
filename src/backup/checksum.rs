use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, warn};

const READ_BUF_SIZE: usize = 8192;

/// Compares two files by streaming both through SHA-256.
///
/// Directories are never content-compared: any pair involving a directory is
/// reported as matching. I/O errors while digesting are reported as a
/// mismatch rather than propagated, so a worker's retry loop sees them the
/// same way it sees a corrupted copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    pub fn verify<P1: AsRef<Path>, P2: AsRef<Path>>(&self, original: P1, copy: P2) -> bool {
        let original = original.as_ref();
        let copy = copy.as_ref();

        if original.is_dir() || copy.is_dir() {
            debug!("Skipping directory checksum verification");
            return true;
        }

        let original_checksum = match sha256_hex(original) {
            Ok(checksum) => checksum,
            Err(e) => {
                error!("Error computing checksum for {:?}: {}", original, e);
                return false;
            }
        };
        let copied_checksum = match sha256_hex(copy) {
            Ok(checksum) => checksum,
            Err(e) => {
                error!("Error computing checksum for {:?}: {}", copy, e);
                return false;
            }
        };

        if original_checksum == copied_checksum {
            debug!("File checksum verified: {:?}", copy);
            true
        } else {
            warn!(
                "Checksum mismatch: {} (original) != {} (copied)",
                original_checksum, copied_checksum
            );
            false
        }
    }
}

fn sha256_hex(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; READ_BUF_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_identical_files_verify() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        std::fs::write(&a, b"same content").unwrap();
        std::fs::write(&b, b"same content").unwrap();

        assert!(ChecksumVerifier.verify(&a, &b));
    }

    #[test]
    fn test_different_files_fail() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        std::fs::write(&a, b"content one").unwrap();
        std::fs::write(&b, b"content two").unwrap();

        assert!(!ChecksumVerifier.verify(&a, &b));
    }

    #[test]
    fn test_directories_always_verify() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();
        std::fs::write(a.join("x.txt"), b"left").unwrap();
        std::fs::write(b.join("y.txt"), b"right").unwrap();

        assert!(ChecksumVerifier.verify(&a, &b));
    }

    #[test]
    fn test_directory_and_file_verify() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("dir");
        let file = temp_dir.path().join("file.txt");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(&file, b"content").unwrap();

        assert!(ChecksumVerifier.verify(&dir, &file));
    }

    #[test]
    fn test_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        std::fs::write(&a, b"content").unwrap();

        assert!(!ChecksumVerifier.verify(&a, temp_dir.path().join("missing.txt")));
    }

    #[test]
    fn test_sha256_hex_known_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(
            sha256_hex(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
