use super::{ProbeOutcome, Prober};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// In-process ZIP oracle. Attempts a full extraction into the
/// destination with the candidate as password.
///
/// ZipCrypto's key check lets roughly 1 in 256 wrong passwords through,
/// so a candidate only counts as correct once every entry also passes
/// its CRC check during extraction.
pub struct ZipProber {
    archive: PathBuf,
    dest: PathBuf,
}

impl ZipProber {
    pub fn new(archive: &Path, dest: &Path) -> Self {
        Self {
            archive: archive.to_path_buf(),
            dest: dest.to_path_buf(),
        }
    }

    fn extract_all(&self, candidate: &str) -> ProbeOutcome {
        let file = match File::open(&self.archive) {
            Ok(file) => file,
            Err(e) => return ProbeOutcome::Ambiguous(format!("cannot open archive: {}", e)),
        };

        let mut archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(e) => return ProbeOutcome::Ambiguous(format!("cannot read archive: {}", e)),
        };

        for index in 0..archive.len() {
            let mut entry = match archive.by_index_decrypt(index, candidate.as_bytes()) {
                Ok(entry) => entry,
                Err(ZipError::InvalidPassword) => return ProbeOutcome::WrongPassword,
                Err(e) => return ProbeOutcome::Ambiguous(e.to_string()),
            };

            // Entries with hostile paths are skipped rather than written
            // outside the destination.
            let Some(relative) = entry.enclosed_name() else {
                continue;
            };
            let target = self.dest.join(relative);

            if entry.is_dir() {
                if let Err(e) = fs::create_dir_all(&target) {
                    return ProbeOutcome::Ambiguous(e.to_string());
                }
                continue;
            }

            if let Some(parent) = target.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    return ProbeOutcome::Ambiguous(e.to_string());
                }
            }

            let mut output = match File::create(&target) {
                Ok(output) => output,
                Err(e) => return ProbeOutcome::Ambiguous(e.to_string()),
            };

            match io::copy(&mut entry, &mut output) {
                Ok(_) => {}
                // The zip reader surfaces a CRC mismatch as InvalidData,
                // which here means the key check passed by accident.
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    return ProbeOutcome::WrongPassword;
                }
                Err(e) => return ProbeOutcome::Ambiguous(e.to_string()),
            }
        }

        ProbeOutcome::Success
    }
}

impl Prober for ZipProber {
    fn probe(&self, candidate: &str) -> ProbeOutcome {
        self.extract_all(candidate)
    }

    fn describe(&self) -> String {
        format!("in-process zip extraction into {}", self.dest.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::unstable::write::FileOptionsExt;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    fn encrypted_archive(dir: &TempDir, password: &str) -> PathBuf {
        let path = dir.path().join("secret.zip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .with_deprecated_encryption(password.as_bytes());
        writer.start_file("notes.txt", options).unwrap();
        writer.write_all(b"the cake is a lie").unwrap();
        writer.finish().unwrap();

        path
    }

    #[test]
    fn test_correct_password_succeeds_and_extracts() {
        let dir = TempDir::new().unwrap();
        let archive = encrypted_archive(&dir, "hunter2");
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let prober = ZipProber::new(&archive, &dest);
        assert_eq!(prober.probe("hunter2"), ProbeOutcome::Success);

        let extracted = fs::read_to_string(dest.join("notes.txt")).unwrap();
        assert_eq!(extracted, "the cake is a lie");
    }

    #[test]
    fn test_wrong_password_rejected() {
        let dir = TempDir::new().unwrap();
        let archive = encrypted_archive(&dir, "hunter2");
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let prober = ZipProber::new(&archive, &dest);
        assert_eq!(prober.probe("letmein"), ProbeOutcome::WrongPassword);
    }

    #[test]
    fn test_probe_is_repeatable_after_failure() {
        let dir = TempDir::new().unwrap();
        let archive = encrypted_archive(&dir, "hunter2");
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let prober = ZipProber::new(&archive, &dest);
        assert_eq!(prober.probe("nope"), ProbeOutcome::WrongPassword);
        assert_eq!(prober.probe("still-nope"), ProbeOutcome::WrongPassword);
        assert_eq!(prober.probe("hunter2"), ProbeOutcome::Success);
    }

    #[test]
    fn test_missing_archive_is_ambiguous() {
        let dir = TempDir::new().unwrap();
        let prober = ZipProber::new(&dir.path().join("gone.zip"), dir.path());
        assert!(matches!(prober.probe("x"), ProbeOutcome::Ambiguous(_)));
    }
}
