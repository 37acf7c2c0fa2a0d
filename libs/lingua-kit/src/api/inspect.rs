//! Statistics and consistency findings for a built `OpenAPI` document,
//! served at `/debug/openapi` in development.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use utoipa::openapi::OpenApi;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub title: String,
    pub version: String,
    pub paths: usize,
    pub operations: usize,
    pub schemas: usize,
    pub security_schemes: Vec<String>,
    /// Empty when the document is consistent.
    pub findings: Vec<String>,
}

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

#[must_use]
pub fn inspect_document(doc: &OpenApi) -> DocumentReport {
    let mut findings = Vec::new();
    let mut operations = 0;
    let mut seen_ids: HashMap<String, String> = HashMap::new();

    for (path, item) in &doc.paths.paths {
        let ops = [
            ("GET", &item.get),
            ("POST", &item.post),
            ("PUT", &item.put),
            ("DELETE", &item.delete),
            ("PATCH", &item.patch),
        ];
        for (method, op) in ops {
            let Some(op) = op else { continue };
            operations += 1;
            let label = format!("{method} {path}");
            match &op.operation_id {
                None => findings.push(format!("{label} has no operationId")),
                Some(id) => {
                    if let Some(first) = seen_ids.insert(id.clone(), label.clone()) {
                        findings.push(format!("operationId '{id}' is used by {first} and {label}"));
                    }
                }
            }
            if op.responses.responses.is_empty() {
                findings.push(format!("{label} declares no responses"));
            }
        }
    }

    let (schema_names, security_schemes) = doc.components.as_ref().map_or_else(
        || (BTreeSet::new(), Vec::new()),
        |c| {
            (
                c.schemas.keys().cloned().collect::<BTreeSet<_>>(),
                c.security_schemes.keys().cloned().collect(),
            )
        },
    );

    let mut refs = BTreeSet::new();
    if let Ok(value) = serde_json::to_value(doc) {
        collect_refs(&value, &mut refs);
    }
    for r in refs {
        match r.strip_prefix(SCHEMA_REF_PREFIX) {
            Some(name) if schema_names.contains(name) => {}
            Some(name) => findings.push(format!("reference to missing schema '{name}'")),
            None => findings.push(format!("unsupported reference '{r}'")),
        }
    }

    DocumentReport {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        paths: doc.paths.paths.len(),
        operations,
        schemas: schema_names.len(),
        security_schemes,
        findings,
    }
}

fn collect_refs(value: &serde_json::Value, out: &mut BTreeSet<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                match v {
                    serde_json::Value::String(s) if k == "$ref" => {
                        out.insert(s.clone());
                    }
                    _ => collect_refs(v, out),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_refs(v, out);
            }
        }
        _ => {}
    }
}
