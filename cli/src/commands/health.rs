use crate::util::{OutputFormat, api_request};

pub async fn run(api_url: &str, format: OutputFormat) -> i32 {
    api_request(api_url, "/health", &[], format).await
}
