//! Mock transport for testing
//!
//! Simulates protocol calls without touching the network, so the executor,
//! worker pool, and orchestrator can be exercised end-to-end (§8 scenarios
//! 1, 2, 5, 6). Configurable to always succeed, always fail with a given
//! diagnostic, or sleep past the timeout.

use super::{Transport, TransportError};
use crate::config::CampaignConfig;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockBehavior {
    AlwaysSucceed,
    AlwaysFail(String),
    Sleep(Duration),
}

pub struct MockTransport {
    behavior: MockBehavior,
}

impl MockTransport {
    pub fn new(behavior: MockBehavior) -> Self {
        Self { behavior }
    }

    fn run(&self, local_or_remote: &Path) -> Result<(), TransportError> {
        match &self.behavior {
            MockBehavior::AlwaysSucceed => Ok(()),
            MockBehavior::AlwaysFail(msg) => Err(TransportError::diagnostic(msg.clone())),
            MockBehavior::Sleep(d) => {
                std::thread::sleep(*d);
                let _ = local_or_remote;
                Ok(())
            }
        }
    }
}

impl Transport for MockTransport {
    fn upload(
        &self,
        local_path: &Path,
        _remote_name: &str,
        _config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        if !local_path.exists() {
            return Err(TransportError::diagnostic(format!(
                "file_not_found: {}",
                local_path.display()
            )));
        }
        self.run(local_path)
    }

    fn download(
        &self,
        _remote_name: &str,
        local_dest: &Path,
        _config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let result = self.run(local_dest);
        if result.is_ok() {
            let _ = std::fs::write(local_dest, b"mock");
        }
        result
    }
}
