mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn assignment_lifecycle() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, token_a) = common::register(&client, &server.base_url, "A", "a@m-life.test").await?;
    let (_, token_b) = common::register(&client, &server.base_url, "B", "b@m-life.test").await?;

    let patient = common::create_patient(&client, &server.base_url, &token_a, "Jane Mapped").await?;
    // Doctors are shared: one created by B is assignable by A
    let doctor = common::create_doctor(&client, &server.base_url, &token_b, "Dr. House", "LIC-MAP-1").await?;

    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_a)
        .json(&json!({ "patient_id": patient, "doctor_id": doctor, "notes": "weekly checkup" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Doctor assigned to patient successfully");
    assert_eq!(body["mapping"]["patient_name"], "Jane Mapped");
    assert_eq!(body["mapping"]["doctor_name"], "Dr. House");
    assert_eq!(body["mapping"]["specialization"], "Cardiology");
    assert_eq!(body["mapping"]["notes"], "weekly checkup");
    let mapping_id = body["mapping"]["id"].as_i64().unwrap();

    // Same pair again is a conflict
    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_a)
        .json(&json!({ "patient_id": patient, "doctor_id": doctor }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Mapping already exists");

    // The mapping shows up in the owner's list
    let res = client
        .get(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let ids: Vec<i64> = body["mappings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_i64())
        .collect();
    assert!(ids.contains(&mapping_id));

    // ...but never in anybody else's
    let res = client
        .get(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_b)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let foreign: Vec<i64> = body["mappings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_i64())
        .collect();
    assert!(!foreign.contains(&mapping_id));

    // Per-patient view returns the assigned doctor
    let res = client
        .get(format!("{}/api/mappings/{}", server.base_url, patient))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["patient"]["id"].as_i64(), Some(patient));
    assert_eq!(body["patient"]["name"], "Jane Mapped");
    assert_eq!(body["count"], 1);
    assert_eq!(body["doctors"][0]["name"], "Dr. House");
    assert_eq!(body["doctors"][0]["mapping_id"].as_i64(), Some(mapping_id));

    // Unassign, then the per-patient view is empty
    let res = client
        .delete(format!("{}/api/mappings/{}", server.base_url, mapping_id))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Doctor unassigned from patient successfully");

    let res = client
        .get(format!("{}/api/mappings/{}", server.base_url, patient))
        .bearer_auth(&token_a)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn foreign_patients_cannot_be_assigned_or_inspected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, token_a) = common::register(&client, &server.base_url, "A", "a@m-own.test").await?;
    let (_, token_b) = common::register(&client, &server.base_url, "B", "b@m-own.test").await?;

    let patient = common::create_patient(&client, &server.base_url, &token_a, "Private Patient").await?;
    let doctor = common::create_doctor(&client, &server.base_url, &token_b, "Dr. Keen", "LIC-OWN-1").await?;

    // B cannot assign doctors to A's patient; the patient looks missing
    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_b)
        .json(&json!({ "patient_id": patient, "doctor_id": doctor }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Patient not found");

    // And cannot inspect the patient's doctors either
    let res = client
        .get(format!("{}/api/mappings/{}", server.base_url, patient))
        .bearer_auth(&token_b)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Patient not found");
    Ok(())
}

#[tokio::test]
async fn unassigning_is_owner_scoped() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, token_a) = common::register(&client, &server.base_url, "A", "a@m-del.test").await?;
    let (_, token_b) = common::register(&client, &server.base_url, "B", "b@m-del.test").await?;

    let patient = common::create_patient(&client, &server.base_url, &token_a, "Del Patient").await?;
    let doctor = common::create_doctor(&client, &server.base_url, &token_a, "Dr. Del", "LIC-DEL-1").await?;

    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token_a)
        .json(&json!({ "patient_id": patient, "doctor_id": doctor }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    let mapping_id = body["mapping"]["id"].as_i64().unwrap();

    let res = client
        .delete(format!("{}/api/mappings/{}", server.base_url, mapping_id))
        .bearer_auth(&token_b)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Mapping not found");

    // The owner can still see (and remove) it
    let res = client
        .delete(format!("{}/api/mappings/{}", server.base_url, mapping_id))
        .bearer_auth(&token_a)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_a_patient_removes_its_mappings() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, token) = common::register(&client, &server.base_url, "C", "c@m-casc.test").await?;

    let patient = common::create_patient(&client, &server.base_url, &token, "Cascade Patient").await?;
    let doctor = common::create_doctor(&client, &server.base_url, &token, "Dr. Cascade", "LIC-CAS-1").await?;

    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "patient_id": patient, "doctor_id": doctor }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let mapping_id = body["mapping"]["id"].as_i64().unwrap();

    let res = client
        .delete(format!("{}/api/patients/{}", server.base_url, patient))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let ids: Vec<i64> = body["mappings"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_i64())
        .collect();
    assert!(!ids.contains(&mapping_id));
    Ok(())
}

#[tokio::test]
async fn create_validation_reports_bad_ids_and_long_notes() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let (_, token) = common::register(&client, &server.base_url, "V", "v@m-valid.test").await?;

    let res = client
        .post(format!("{}/api/mappings", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "patient_id": 0, "notes": "x".repeat(1001) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"patient_id"));
    assert!(fields.contains(&"doctor_id"));
    assert!(fields.contains(&"notes"));
    Ok(())
}
