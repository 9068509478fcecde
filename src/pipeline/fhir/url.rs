use super::types::{CompiledQuery, SummaryMode};

pub const DEFAULT_FHIR_BASE_URL: &str = "https://fhir-server.example.com";

/// Render a compiled query as a FHIR search URL.
///
/// Multi-valued parameters repeat the key. Values are emitted verbatim.
pub fn render_url(base_url: &str, compiled: &CompiledQuery) -> String {
    let mut params: Vec<String> = Vec::new();

    for (key, value) in compiled.search_params.iter() {
        for v in value.values() {
            params.push(format!("{key}={v}"));
        }
    }

    for include in &compiled.include {
        params.push(format!("_include={include}"));
    }

    if !compiled.sort.is_empty() {
        params.push(format!("_sort={}", compiled.sort.join(",")));
    }

    params.push(format!("_count={}", compiled.count));

    if let Some(SummaryMode::Count) = compiled.summary {
        params.push("_summary=count".to_string());
    }

    format!(
        "{}/{}?{}",
        base_url.trim_end_matches('/'),
        compiled.resource_type.as_str(),
        params.join("&")
    )
}
