use crate::domain::models::{DownloadReport, ModelProfile};
use crate::error::DownloadError;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

const CHUNK_SIZE: usize = 32 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stream a model download into `<filename>.part` and rename over the
/// destination only once the transfer is complete and verified. An
/// interrupted run leaves nothing at the canonical path; the stale
/// staging file is removed on the next attempt.
pub fn fetch<F>(
    profile: &ModelProfile,
    models_dir: &Path,
    force: bool,
    mut progress: F,
) -> Result<DownloadReport, DownloadError>
where
    F: FnMut(u64, Option<u64>),
{
    fs::create_dir_all(models_dir)?;
    let destination = models_dir.join(&profile.filename);
    let staging = models_dir.join(format!("{}.part", profile.filename));
    if staging.exists() {
        fs::remove_file(&staging)?;
    }

    if destination.exists() && !force {
        let size = fs::metadata(&destination)?.len();
        return Ok(DownloadReport {
            model: profile.name.clone(),
            filename: profile.filename.clone(),
            path: destination.display().to_string(),
            bytes_written: size,
            sha256: String::new(),
            verified: false,
            already_present: true,
        });
    }

    // Weight files take minutes to hours; only the connect phase gets a
    // deadline.
    let client = reqwest::blocking::Client::builder()
        .timeout(None)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;
    let mut response = client.get(&profile.url).send()?.error_for_status()?;
    let total = response.content_length();

    let mut file = File::create(&staging)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let read = match response.read(&mut buffer) {
            Ok(n) => n,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(&staging);
                return Err(err.into());
            }
        };
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])?;
        hasher.update(&buffer[..read]);
        written += read as u64;
        progress(written, total);
    }
    file.flush()?;
    drop(file);

    if written == 0 {
        let _ = fs::remove_file(&staging);
        return Err(DownloadError::Empty);
    }

    let digest = format!("{:x}", hasher.finalize());
    let mut verified = false;
    if let Some(expected) = &profile.sha256 {
        if !expected.eq_ignore_ascii_case(&digest) {
            let _ = fs::remove_file(&staging);
            return Err(DownloadError::ChecksumMismatch {
                expected: expected.clone(),
                found: digest,
            });
        }
        verified = true;
    }

    fs::rename(&staging, &destination)?;

    Ok(DownloadReport {
        model: profile.name.clone(),
        filename: profile.filename.clone(),
        path: destination.display().to_string(),
        bytes_written: written,
        sha256: digest,
        verified,
        already_present: false,
    })
}
