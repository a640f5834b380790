use crate::domain::models::HealthReport;
use crate::error::DeployError;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const RETRY_DELAY: Duration = Duration::from_secs(3);
const ATTEMPTS: u32 = 2;

/// One request against the status endpoint, with a single retry after a
/// fixed delay. A registrar that leaves the service unreachable must not
/// report success, so the caller treats an error here as fatal.
pub fn check(host: &str, port: u16) -> Result<HealthReport, DeployError> {
    let url = format!("http://{host}:{port}/api/status");
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| DeployError::HealthCheckFailed {
            url: url.clone(),
            attempts: 0,
            detail: e.to_string(),
        })?;

    let mut detail = String::new();
    for attempt in 1..=ATTEMPTS {
        match client.get(&url).send() {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(HealthReport {
                        url,
                        status: Some(status.as_u16()),
                        ok: true,
                        attempts: attempt,
                    });
                }
                detail = format!("status {}", status.as_u16());
            }
            Err(err) => {
                detail = err.to_string();
            }
        }
        if attempt < ATTEMPTS {
            std::thread::sleep(RETRY_DELAY);
        }
    }

    Err(DeployError::HealthCheckFailed {
        url,
        attempts: ATTEMPTS,
        detail,
    })
}
