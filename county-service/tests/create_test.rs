use axum::http::StatusCode;
use mongodb::bson::doc;
use reqwest::multipart;

mod common;
use common::TestApp;

#[tokio::test]
async fn create_county_with_icon_and_stringified_fields_works() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let form = multipart::Form::new()
        .text("name", " Galway ")
        .text("slug", "galway")
        .text("excerpt", "City of the Tribes")
        .text("companies", r#"[{"companyId":"c1","position":1}]"#)
        .text("robots", r#"{"index":"follow"}"#)
        .text("region", "Connacht")
        .part(
            "icon",
            multipart::Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .file_name("galway.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let response = client
        .post(format!("{}/counties", app.address))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(StatusCode::CREATED, response.status());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "County created successfully.");
    assert_eq!(body["data"]["name"], "Galway"); // trimmed
    assert_eq!(body["data"]["slug"], "galway");
    assert_eq!(body["data"]["companies"][0]["companyId"], "c1");
    assert_eq!(body["data"]["robots"]["index"], "follow");
    assert_eq!(body["data"]["region"], "Connacht"); // pass-through field

    let icon = body["data"]["icon"].as_str().expect("icon should be set");
    assert!(icon.starts_with("/uploads/"));
    assert!(icon.ends_with(".png"));

    // Verify DB
    let id = body["data"]["_id"].as_str().unwrap();
    let stored = app
        .db
        .counties()
        .find_one(doc! { "_id": id }, None)
        .await
        .unwrap()
        .expect("County not found in DB");
    assert_eq!(stored.name, "Galway");
    assert_eq!(stored.companies.len(), 1);
    assert_eq!(stored.extra.get_str("region").unwrap(), "Connacht");

    // Verify the icon file landed in the upload dir and is served back
    let uploaded = client
        .get(format!("{}{}", app.address, icon))
        .send()
        .await
        .expect("Failed to fetch icon");
    assert_eq!(StatusCode::OK, uploaded.status());

    app.cleanup().await;
}

#[tokio::test]
async fn create_without_name_or_slug_returns_400_and_persists_nothing() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    for body in [
        serde_json::json!({ "slug": "kerry", "excerpt": "x" }),
        serde_json::json!({ "name": "Kerry", "excerpt": "x" }),
        serde_json::json!({ "name": "   ", "slug": "kerry" }),
    ] {
        let response = client
            .post(format!("{}/counties", app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "All fields are required.");
        // 400s use the bare { message } shape
        assert!(body.get("success").is_none());
    }

    assert_eq!(app.county_count().await, 0);

    app.cleanup().await;
}

#[tokio::test]
async fn create_with_duplicate_name_or_slug_returns_400() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    app.seed_county("Clare", "clare", "The banner county").await;

    // Same name, different slug
    let response = client
        .post(format!("{}/counties", app.address))
        .json(&serde_json::json!({ "name": "Clare", "slug": "other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "County with that name or slug already exists."
    );

    // Different name, same slug
    let response = client
        .post(format!("{}/counties", app.address))
        .json(&serde_json::json!({ "name": "Other", "slug": "clare" }))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    assert_eq!(app.county_count().await, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn create_with_unparseable_companies_stores_empty_sequence() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let form = multipart::Form::new()
        .text("name", "Sligo")
        .text("slug", "sligo")
        .text("excerpt", "Yeats country")
        .text("companies", "not json")
        .text("robots", "{broken");

    let response = client
        .post(format!("{}/counties", app.address))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(StatusCode::CREATED, response.status());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["companies"], serde_json::json!([]));
    assert_eq!(body["data"]["robots"], serde_json::json!({}));
    assert_eq!(body["data"]["icon"], serde_json::Value::Null);

    let id = body["data"]["_id"].as_str().unwrap();
    let stored = app
        .db
        .counties()
        .find_one(doc! { "_id": id }, None)
        .await
        .unwrap()
        .expect("County not found in DB");
    assert!(stored.companies.is_empty());
    assert!(stored.robots.is_empty());

    app.cleanup().await;
}
