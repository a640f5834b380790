use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub struct TestEnv {
    tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("install");
        fs::create_dir_all(&root).expect("create isolated install root");
        Self { tmp, root }
    }

    pub fn base(&self) -> &Path {
        self.tmp.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("steward");
        cmd.arg("--root").arg(&self.root);
        cmd.env_remove("STEWARD_MODEL");
        cmd.env_remove("STEWARD_PYTHON");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// A stub interpreter answering `--version` with the given version
    /// and succeeding on everything else, logging argv lines to
    /// `python.log` under the temp base.
    pub fn fake_python(&self, version: &str, exit_code: i32) -> PathBuf {
        let path = self.tmp.path().join("bin").join("python3");
        fs::create_dir_all(path.parent().unwrap()).expect("create bin dir");
        let log = self.tmp.path().join("python.log");
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "Python {version}"
  exit 0
fi
echo "$@" >> {log}
exit {exit_code}
"#,
            version = version,
            log = log.display(),
            exit_code = exit_code,
        );
        fs::write(&path, script).expect("write stub interpreter");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("make stub executable");
        }
        path
    }

    pub fn python_log(&self) -> String {
        fs::read_to_string(self.tmp.path().join("python.log")).unwrap_or_default()
    }

    pub fn write_catalog(&self, models: Value) -> PathBuf {
        let path = self.tmp.path().join("catalog.json");
        fs::write(
            &path,
            serde_json::to_string_pretty(&serde_json::json!({ "models": models })).unwrap(),
        )
        .expect("write catalog fixture");
        path
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("data").join("models")
    }
}

/// Minimal single-threaded HTTP server for download and health-check
/// fixtures. Serves `body` with a 200 to up to `max_requests` requests,
/// then returns how many it actually answered. Gives up after a 15s
/// deadline so a test that makes fewer requests than expected fails
/// instead of hanging.
pub fn spawn_http(body: Vec<u8>, max_requests: usize) -> (String, std::thread::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
    let addr = listener.local_addr().expect("local addr");
    listener
        .set_nonblocking(true)
        .expect("nonblocking fixture server");

    let handle = std::thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(15);
        let mut served = 0;
        while served < max_requests && Instant::now() < deadline {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    stream
                        .set_read_timeout(Some(Duration::from_secs(5)))
                        .ok();
                    let mut buf = [0u8; 4096];
                    let mut request = Vec::new();
                    loop {
                        match stream.read(&mut buf) {
                            Ok(0) => break,
                            Ok(n) => {
                                request.extend_from_slice(&buf[..n]);
                                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                            Err(_) => break,
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.write_all(&body);
                    let _ = stream.flush();
                    served += 1;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(20));
                }
                Err(_) => break,
            }
        }
        served
    });

    (format!("http://{}", addr), handle)
}

pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
