use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wellscope::api::HttpWellApi;
use wellscope::config::ApiConfig;
use wellscope::storage::SledStore;

#[allow(dead_code)]
pub fn create_temp_store(quota_bytes: usize) -> (SledStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("session.db"), quota_bytes)
        .expect("failed to open sled store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_las_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write las file");
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn http_api(base_url: &str) -> HttpWellApi {
    HttpWellApi::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    })
    .expect("failed to build client")
}

#[allow(dead_code)]
pub fn well_summary_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "well_name": name,
        "original_filename": format!("{}.las", name.to_lowercase()),
        "start_depth": 8000.0,
        "stop_depth": 9500.0,
        "depth_unit": "F",
        "location": null,
        "country": "Norway",
        "uploaded_at": "2025-03-01T10:00:00",
        "curve_count": 3
    })
}

#[allow(dead_code)]
pub fn well_detail_json(id: i64, name: &str, curves: &[&str]) -> Value {
    let mut detail = well_summary_json(id, name);
    detail["curves"] = curves
        .iter()
        .map(|m| json!({"mnemonic": m, "unit": "ppm", "description": null, "category": "Hydrocarbons"}))
        .collect();
    detail["step"] = json!(0.5);
    detail["null_value"] = json!(-999.25);
    detail["las_version"] = json!("2.0");
    detail
}

#[allow(dead_code)]
pub fn chart_json(id: i64, name: &str, curves: &[&str], min: f64, max: f64) -> Value {
    let rows: Vec<Value> = [min, max]
        .iter()
        .map(|depth| {
            let mut row = json!({ "depth": depth });
            for curve in curves {
                row[*curve] = json!(12.5);
            }
            row
        })
        .collect();
    json!({
        "well_id": id,
        "well_name": name,
        "depth_range": {"min": min, "max": max, "unit": "F"},
        "curves": curves,
        "data": rows
    })
}
