use std::sync::Arc;

use drive_service::DriveService;
use drive_service_mock::{MockDrive, MOCK_BACKEND_ID};

use crate::config::CliConfig;

pub fn drive_from_config(config: &CliConfig) -> Result<Arc<dyn DriveService>, String> {
    match config.backend.as_str() {
        MOCK_BACKEND_ID => Ok(Arc::new(MockDrive::seeded().with_latency(config.mock_latency))),
        unknown => Err(format!(
            "Unsupported backend '{unknown}'. Available backends: {MOCK_BACKEND_ID}"
        )),
    }
}
