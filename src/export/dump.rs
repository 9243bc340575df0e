// export/dump.rs
// Raw SQL dump side channel, delegated to the native dump utility.

use crate::error::{ExportError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Abstract raw-dump collaborator. The engine only invokes it and waits for
/// completion; process management stays out of the export pipeline.
#[async_trait]
pub trait RawDumper: Send + Sync {
    async fn run(&self, schema: &str, destination: &Path) -> Result<()>;
}

/// Spawns `mysqldump` for one schema and writes straight to the destination
/// file via `--result-file`.
pub struct MysqldumpRunner {
    host: String,
    user: String,
    password: String,
}

impl MysqldumpRunner {
    pub fn new(host: &str, user: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait]
impl RawDumper for MysqldumpRunner {
    async fn run(&self, schema: &str, destination: &Path) -> Result<()> {
        let (host, port) = split_host_port(&self.host);
        let mut command = Command::new("mysqldump");
        command
            .arg(format!("-h{}", host))
            .arg(format!("-u{}", self.user))
            .arg(format!("-p{}", self.password))
            .arg("--databases")
            .arg(schema)
            .arg("--result-file")
            .arg(destination);
        if let Some(port) = port {
            command.arg(format!("-P{}", port));
        }

        let status = command.status().await.map_err(|e| ExportError::Dump {
            schema: schema.to_string(),
            message: format!("failed to spawn mysqldump: {}", e),
        })?;
        if !status.success() {
            return Err(ExportError::Dump {
                schema: schema.to_string(),
                message: format!("mysqldump exited with {}", status),
            });
        }
        Ok(())
    }
}

fn split_host_port(host: &str) -> (&str, Option<&str>) {
    match host.split_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (host, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_with_port_is_split() {
        assert_eq!(split_host_port("db.example.com:3307"), ("db.example.com", Some("3307")));
        assert_eq!(split_host_port("localhost"), ("localhost", None));
    }
}
