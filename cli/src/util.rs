use serde_json::json;

/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub const EXIT_CONNECTION: i32 = 3;
pub const EXIT_USAGE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Raw,
}

impl OutputFormat {
    fn render(self, value: &serde_json::Value) -> String {
        let rendered = match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Raw => serde_json::to_string(value),
        };
        rendered.unwrap_or_else(|_| value.to_string())
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", OutputFormat::Pretty.render(&err));
    std::process::exit(EXIT_USAGE);
}

pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

pub fn build_url(
    api_url: &str,
    path: &str,
    query: &[(String, String)],
) -> Result<reqwest::Url, String> {
    let base = api_url.trim_end_matches('/');
    let mut url = reqwest::Url::parse(&format!("{base}{path}"))
        .map_err(|e| format!("Invalid URL: {base}{path}: {e}"))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Execute a GET request against the API, print the JSON response and
/// return the structured exit code.
pub async fn api_request(
    api_url: &str,
    path: &str,
    query: &[(String, String)],
    format: OutputFormat,
) -> i32 {
    let url = match build_url(api_url, path, query) {
        Ok(u) => u,
        Err(message) => {
            let err = json!({ "error": "cli_error", "message": message });
            eprintln!("{}", format.render(&err));
            return EXIT_USAGE;
        }
    };

    tracing::debug!(%url, "sending request");

    let resp = match client().get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the API server running? Check OVERLOAD_API_URL."
            });
            eprintln!("{}", format.render(&err));
            return EXIT_CONNECTION;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for_status(status);

    let body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    if exit_code == 0 {
        println!("{}", format.render(&body));
    } else {
        eprintln!("{}", format.render(&body));
    }

    exit_code
}
