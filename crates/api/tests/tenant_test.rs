//! Tenant guard, CRUD envelope, paging, error logging and exports over HTTP.

mod common;

use axum::http::{StatusCode, header};
use common::{TestApp, body_bytes, body_json, request};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use tally_db::entities::error_logs;

#[tokio::test]
async fn test_missing_token_is_rejected_and_logged() {
    let app = TestApp::new().await;
    let company = app.company("Acme").await;

    let response = app
        .send(request("GET", "/api/v1/customers", None, Some(company), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 401);

    let logs = error_logs::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status_code, 401);
    assert_eq!(logs[0].path, "/api/v1/customers");
    assert_eq!(logs[0].method, "GET");
    assert_eq!(logs[0].company_id, Some(company));
}

#[tokio::test]
async fn test_tenant_header_is_required() {
    let app = TestApp::new().await;
    let token = app.token("user");

    let missing = app
        .send(request("GET", "/api/v1/customers", Some(&token), None, None))
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .send(request(
            "GET",
            "/api/v1/customers",
            Some(&token),
            Some(uuid::Uuid::new_v4()),
            None,
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_and_isolate_customer() {
    let app = TestApp::new().await;
    let token = app.token("user");
    let owner = app.company("Owner").await;
    let other = app.company("Other").await;

    let created = app
        .send(request(
            "POST",
            "/api/v1/customers",
            Some(&token),
            Some(owner),
            Some(json!({"name": "Globex", "phone": "555-0100"})),
        ))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["name"], "Globex");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let own = app
        .send(request("GET", &format!("/api/v1/customers/{id}"), Some(&token), Some(owner), None))
        .await;
    assert_eq!(own.status(), StatusCode::OK);

    let foreign = app
        .send(request("GET", &format!("/api/v1/customers/{id}"), Some(&token), Some(other), None))
        .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_customer_name_is_a_field_error() {
    let app = TestApp::new().await;
    let company = app.company("Acme").await;

    let response = app
        .send(request(
            "POST",
            "/api/v1/customers",
            Some(&app.token("user")),
            Some(company),
            Some(json!({"name": ""})),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["field"], "name");
}

#[tokio::test]
async fn test_customer_list_is_paged() {
    let app = TestApp::new().await;
    let token = app.token("user");
    let company = app.company("Acme").await;
    for name in ["Alpha", "Beta", "Gamma"] {
        app.send(request(
            "POST",
            "/api/v1/customers",
            Some(&token),
            Some(company),
            Some(json!({"name": name})),
        ))
        .await;
    }

    let response = app
        .send(request(
            "GET",
            "/api/v1/customers?pageNumber=1&pageSize=2",
            Some(&token),
            Some(company),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["totalCount"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["hasNextPage"], true);
    assert_eq!(page["hasPreviousPage"], false);
}

#[tokio::test]
async fn test_out_of_range_paging_is_clamped() {
    let app = TestApp::new().await;
    let token = app.token("user");
    let company = app.company("Acme").await;
    app.send(request(
        "POST",
        "/api/v1/customers",
        Some(&token),
        Some(company),
        Some(json!({"name": "Alpha"})),
    ))
    .await;

    let response = app
        .send(request(
            "GET",
            "/api/v1/customers?pageNumber=-1&pageSize=-5",
            Some(&token),
            Some(company),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let far = app
        .send(request(
            "GET",
            &format!("/api/v1/customers?pageNumber={}&pageSize=100", i64::MAX),
            Some(&token),
            Some(company),
            None,
        ))
        .await;
    assert_eq!(far.status(), StatusCode::OK);
    let page = body_json(far).await["data"].clone();
    assert!(page["items"].as_array().unwrap().is_empty());
    assert_eq!(page["totalCount"], 1);
}

#[tokio::test]
async fn test_income_total_out_of_range_is_a_bad_request() {
    let app = TestApp::new().await;
    let token = app.token("user");
    let company = app.company("Acme").await;

    let customer = app
        .send(request(
            "POST",
            "/api/v1/customers",
            Some(&token),
            Some(company),
            Some(json!({"name": "Globex"})),
        ))
        .await;
    let customer_id = body_json(customer).await["data"]["id"].clone();
    let category = app
        .send(request(
            "POST",
            "/api/v1/categories",
            Some(&token),
            Some(company),
            Some(json!({"name": "Freight", "type": "income"})),
        ))
        .await;
    assert_eq!(category.status(), StatusCode::CREATED);
    let category_id = body_json(category).await["data"]["id"].clone();

    let response = app
        .send(request(
            "POST",
            "/api/v1/incomes",
            Some(&token),
            Some(company),
            Some(json!({
                "customerId": customer_id,
                "categoryId": category_id,
                "unitCount": "79228162514264337593543950335",
                "unitPrice": "79228162514264337593543950335",
                "operationDate": "2025-03-10",
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_payment_export_is_an_attachment() {
    let app = TestApp::new().await;
    let token = app.token("user");
    let company = app.company("Acme").await;

    let customer = app
        .send(request(
            "POST",
            "/api/v1/customers",
            Some(&token),
            Some(company),
            Some(json!({"name": "Globex"})),
        ))
        .await;
    let customer_id = body_json(customer).await["data"]["id"].clone();

    let payment = app
        .send(request(
            "POST",
            "/api/v1/payments",
            Some(&token),
            Some(company),
            Some(json!({
                "customerId": customer_id,
                "amount": "250.00",
                "operationDate": "2025-03-10",
            })),
        ))
        .await;
    assert_eq!(payment.status(), StatusCode::CREATED);

    let export = app
        .send(request(
            "GET",
            "/api/v1/payments/export?beginDate=2025-03-01&endDate=2025-03-31",
            Some(&token),
            Some(company),
            None,
        ))
        .await;
    assert_eq!(export.status(), StatusCode::OK);
    assert_eq!(
        export.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"payments-2025-03-01-2025-03-31.xlsx\""
    );
    let bytes = body_bytes(export).await;
    // XLSX is a zip container
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_successful_requests_are_not_logged() {
    let app = TestApp::new().await;

    let response = app.send(request("GET", "/api/v1/health", None, None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["database"], true);

    let count = error_logs::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 0);
}
