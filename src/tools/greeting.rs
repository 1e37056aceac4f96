//! Greeting tool.

use super::Tool;
use async_trait::async_trait;

/// Says hello to a person given their name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SayHelloTool;

#[async_trait]
impl Tool for SayHelloTool {
    fn name(&self) -> &'static str {
        "say_hello"
    }

    fn description(&self) -> &'static str {
        "Greets a person."
    }

    async fn invoke(&self, input: &str) -> String {
        format!("Hello, {}!", input.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_greeting() {
        assert_eq!(SayHelloTool.invoke("John").await, "Hello, John!");
        assert_eq!(SayHelloTool.invoke("  Ada ").await, "Hello, Ada!");
    }
}
