use std::net::SocketAddr;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use server::startup::{build_app, migrate};

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the full router over a private in-memory SQLite database.
async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    migrate(&db).await?;

    let app = build_app(db, &configs::AppConfig::default());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn create_project(c: &reqwest::Client, app: &TestApp, name: &str, budget: i64) -> anyhow::Result<Value> {
    let res = c.post(app.url("/api/projects"))
        .json(&json!({"name": name, "customer": "Acme", "budget": budget}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json().await?)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(app.url("/health")).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_project_crud() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let created = create_project(&c, &app, "Harbor office", 1200).await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let res = c.get(app.url(&format!("/api/projects/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Harbor office");

    let res = c.put(app.url(&format!("/api/projects/{id}")))
        .json(&json!({"status": "active", "budget": 1500}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["status"], "active");
    assert_eq!(updated["budget"], 1500);

    let res = c.delete(app.url(&format!("/api/projects/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(app.url(&format!("/api/projects/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["title"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn e2e_out_of_range_paging_is_normalized() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    for i in 0..12 {
        create_project(&c, &app, &format!("P{i:02}"), i).await?;
    }

    let res = c.get(app.url("/api/projects?pageNumber=0&pageSize=1000&sortColumn=name&sortDir=asc")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["totalCount"], 12);
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["pageSize"], 10);
    let items = page["items"].as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["name"], "P00");

    let res = c.get(app.url("/api/projects?minBudget=10")).send().await?;
    assert_eq!(res.json::<Value>().await?["totalCount"], 2);

    let res = c.get(app.url("/api/projects?pageNumber=9223372036854775807&pageSize=50")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let page = res.json::<Value>().await?;
    assert_eq!(page["totalCount"], 12);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_sort_column_is_bad_request() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(app.url("/api/projects?sortColumn=password")).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["title"], "Invalid Sort Column");
    Ok(())
}

#[tokio::test]
async fn e2e_quotation_to_contract_to_maintenance() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let project = create_project(&c, &app, "Depot", 9000).await?;

    let res = c.post(app.url("/api/quotations"))
        .json(&json!({"projectId": project["id"], "number": "Q-1", "amount": 8800}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let quotation = res.json::<Value>().await?;
    let qid = quotation["id"].as_str().unwrap_or_default().to_string();

    let res = c.post(app.url(&format!("/api/quotations/{qid}/contract"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let contract = res.json::<Value>().await?;
    assert_eq!(contract["number"], "C-Q-1");
    assert_eq!(contract["amount"], 8800);

    // signing twice is rejected
    let res = c.post(app.url(&format!("/api/quotations/{qid}/contract"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.get(app.url(&format!("/api/quotations/{qid}"))).send().await?;
    assert_eq!(res.json::<Value>().await?["status"], "accepted");

    let res = c.get(app.url("/api/contracts")).send().await?;
    assert_eq!(res.json::<Value>().await?["totalCount"], 1);

    let res = c.post(app.url("/api/maintenance"))
        .json(&json!({"contractId": contract["id"], "title": "Door sensor", "category": "security", "priority": 2}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let request = res.json::<Value>().await?;
    let rid = request["id"].as_str().unwrap_or_default().to_string();

    let res = c.post(app.url(&format!("/api/maintenance/{rid}/close"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["status"], "closed");

    let res = c.get(app.url("/api/maintenance?category=security&status=closed")).send().await?;
    assert_eq!(res.json::<Value>().await?["totalCount"], 1);

    // project with a contract cannot be deleted
    let pid = project["id"].as_str().unwrap_or_default();
    let res = c.delete(app.url(&format!("/api/projects/{pid}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}
