//! Clock query tool.

use super::Tool;
use async_trait::async_trait;
use chrono::Local;

/// Format used for the current time.
const TIME_FORMAT: &str = "%H:%M:%S";

/// Returns the current local time as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &'static str {
        "get_current_time"
    }

    fn description(&self) -> &'static str {
        "Returns the current time."
    }

    async fn invoke(&self, _input: &str) -> String {
        Local::now().format(TIME_FORMAT).to_string()
    }
}
