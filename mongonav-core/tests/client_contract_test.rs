use mockito::{Matcher, Server};
use mongonav_core::client::DocumentListOptions;
use mongonav_core::{
    ApiSettings, ClientError, CompileOptions, ConditionRow, NavigatorClient, QuerySession,
    QuerySource, SlowQueryLogger, Target,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn client_for(url: &str) -> NavigatorClient {
    NavigatorClient::new(&ApiSettings::new(url)).unwrap()
}

#[tokio::test]
async fn test_execute_query_posts_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/query")
        .match_body(Matcher::Json(json!({
            "database": "shop",
            "collection": "orders",
            "query": { "status": "paid", "total": { "$gt": 100 } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results":[{"_id":"1","status":"paid","total":120}]}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let filter = json!({ "status": "paid", "total": { "$gt": 100 } });
    let result = client.execute_query("shop", "orders", &filter).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.len(), 1);
    assert_eq!(result.results[0]["total"], 120);
}

#[tokio::test]
async fn test_missing_results_treated_as_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/query")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.execute_query("shop", "orders", &json!({})).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_error_body_surfaces_verbatim() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/query")
        .with_status(500)
        .with_body("Query failed: unknown operator $foo")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client
        .execute_query("shop", "orders", &json!({ "a": { "$foo": 1 } }))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Query failed: unknown operator $foo");
}

#[tokio::test]
async fn test_empty_error_body_uses_status_reason() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/dashboard")
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.dashboard().await.unwrap_err();
    assert_eq!(err.to_string(), "Service Unavailable");
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/settings")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.settings().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn test_list_databases_accepts_names_and_summaries() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/databases")
        .with_status(200)
        .with_body(
            r#"["admin", {"name":"shop","collections":3,"documents":1200,"storageSize":40960}]"#,
        )
        .create_async()
        .await;

    let client = client_for(&server.url());
    let databases = client.list_databases().await.unwrap();

    assert_eq!(databases.len(), 2);
    assert_eq!(databases[0].name, "admin");
    assert_eq!(databases[0].collections, 0);
    assert_eq!(databases[1].name, "shop");
    assert_eq!(databases[1].storage_size, 40960);
}

#[tokio::test]
async fn test_collections_and_documents() {
    let mut server = Server::new_async().await;
    let _collections = server
        .mock("GET", "/collections/shop")
        .with_status(200)
        .with_body(r#"{"collections":["orders","users"]}"#)
        .create_async()
        .await;
    let _documents = server
        .mock("GET", "/collections/shop/orders")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("skip".into(), "10".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"documents":[{"_id":{"$oid":"65a1"}}]}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert_eq!(
        client.list_collections("shop").await.unwrap(),
        vec!["orders".to_string(), "users".to_string()]
    );

    let options = DocumentListOptions::default().skip(10).limit(5);
    let documents = client.list_documents("shop", "orders", &options).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(
        mongonav_core::client::document_id(&documents[0]).as_deref(),
        Some("65a1")
    );
}

#[tokio::test]
async fn test_missing_document_is_none() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/documents/shop/orders/nope")
        .with_status(404)
        .with_body("Document not found")
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert!(client.get_document("shop", "orders", "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_document_writes() {
    let mut server = Server::new_async().await;
    let _insert = server
        .mock("POST", "/documents/shop/orders")
        .match_body(Matcher::Json(json!({ "status": "new" })))
        .with_status(200)
        .with_body(r#"{"inserted_id":"abc"}"#)
        .create_async()
        .await;
    let _update = server
        .mock("PUT", "/documents/shop/orders/abc")
        .with_status(200)
        .with_body(r#"{"matched":1,"modified":1}"#)
        .create_async()
        .await;
    let _delete = server
        .mock("DELETE", "/documents/shop/orders/abc")
        .with_status(200)
        .with_body(r#"{"deleted":1}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let inserted = client
        .create_document("shop", "orders", &json!({ "status": "new" }))
        .await
        .unwrap();
    assert_eq!(inserted.inserted_id, json!("abc"));

    let updated = client
        .update_document("shop", "orders", "abc", &json!({ "status": "paid" }))
        .await
        .unwrap();
    assert_eq!(updated.modified, 1);

    let deleted = client.delete_document("shop", "orders", "abc").await.unwrap();
    assert_eq!(deleted.deleted, 1);
}

#[tokio::test]
async fn test_ai_query_round_trip() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/ai/query")
        .match_body(Matcher::PartialJson(json!({ "prompt": "users older than 30" })))
        .with_status(200)
        .with_body(
            r#"{"query":{"age":{"$gt":30}},"source":"gemini","used_prompt":"users older than 30"}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server.url());
    let ai = client
        .generate_query("app", "users", "users older than 30")
        .await
        .unwrap();

    assert!(ai.has_query());
    assert_eq!(ai.query, json!({ "age": { "$gt": 30 } }));
    assert_eq!(ai.source, "gemini");
}

#[tokio::test]
async fn test_settings_and_key_update() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", "/settings")
        .with_status(200)
        .with_body(
            r#"{"connectionString":"mongodb://u:p@db:27017/app","shortenedConnectionString":"mongodb://db:27017","authEnabledDefault":true,"hasGeminiKey":false}"#,
        )
        .create_async()
        .await;
    let _post = server
        .mock("POST", "/settings")
        .match_body(Matcher::Json(json!({ "geminiApiKey": "k-123" })))
        .with_status(200)
        .with_body(r#"{"success":true,"hasGeminiKey":true}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let settings = client.settings().await.unwrap();
    assert_eq!(settings.shortened_connection_string, "mongodb://db:27017");
    assert!(settings.auth_enabled_default);

    let update = client.update_settings(Some("  k-123 ")).await.unwrap();
    assert!(update.success && update.has_gemini_key);
}

#[tokio::test]
async fn test_dashboard_and_status() {
    let mut server = Server::new_async().await;
    let _dashboard = server
        .mock("GET", "/dashboard")
        .with_status(200)
        .with_body(
            r#"{"connectedTo":"mongodb://db:27017","totals":{"databases":2,"collections":5,"documents":900,"indexes":7,"storageSizeBytes":2048},"server":{"uptimeSeconds":3600,"connectionsCurrent":4,"opsPerSecond":1.5}}"#,
        )
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/status")
        .with_status(200)
        .with_body("MongoDB is up and running")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stats = client.dashboard().await.unwrap();
    assert_eq!(stats.totals.documents, 900);
    assert_eq!(stats.server.connections_current, 4);
    assert_eq!(client.status().await.unwrap(), "MongoDB is up and running");
}

#[tokio::test]
async fn test_slow_queries_recorded() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/query")
        .with_status(200)
        .with_body(r#"{"results":[]}"#)
        .create_async()
        .await;

    let logger = Arc::new(SlowQueryLogger::new(Duration::ZERO, true));
    let client = client_for(&server.url()).with_slow_query_logger(logger.clone());
    client
        .execute_query("shop", "orders", &json!({ "a": 1 }))
        .await
        .unwrap();

    let slow = logger.get_slow_queries(10);
    assert_eq!(slow.len(), 1);
    assert_eq!(slow[0].collection, "orders");
}

#[tokio::test]
async fn test_session_compiles_rows_into_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/query")
        .match_body(Matcher::PartialJson(json!({
            "query": { "name": { "$regex": "^Al", "$options": "i" }, "age": 30 }
        })))
        .with_status(200)
        .with_body(r#"{"results":[{"name":"Alice","age":30}]}"#)
        .create_async()
        .await;

    let session = QuerySession::new(client_for(&server.url()), CompileOptions::default());
    let rows: Vec<ConditionRow> = ["name:string:startsWith:Al", "age:number:equals:30", " :string:equals:x"]
        .iter()
        .map(|r| r.parse().unwrap())
        .collect();

    let target = Target::new("app", "users").unwrap();
    let run = session.run_manual(&target, &rows).await.unwrap();

    mock.assert_async().await;
    assert_eq!(run.source, QuerySource::Manual);
    assert_eq!(run.results.len(), 1);
}

/// Serves `POST /query`, answering requests for collection `slow` after `delay`
async fn spawn_delayed_backend(delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let (pause, body) = if request.contains(r#""collection":"slow""#) {
                    (delay, r#"{"results":[{"from":"slow"}]}"#)
                } else {
                    (Duration::ZERO, r#"{"results":[{"from":"fast"}]}"#)
                };
                tokio::time::sleep(pause).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_newer_execution_cancels_older() {
    let url = spawn_delayed_backend(Duration::from_millis(500)).await;
    let session = Arc::new(QuerySession::new(client_for(&url), CompileOptions::default()));

    let first = {
        let session = session.clone();
        tokio::spawn(async move {
            let target = Target::new("app", "slow").unwrap();
            session.execute(&target, json!({}), QuerySource::Manual).await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let target = Target::new("app", "fast").unwrap();
    let second = session
        .execute(&target, json!({}), QuerySource::Manual)
        .await
        .unwrap();
    assert_eq!(second.results, vec![json!({ "from": "fast" })]);

    let first = first.await.unwrap();
    assert!(first.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_cancel_all_aborts_in_flight_query() {
    let url = spawn_delayed_backend(Duration::from_millis(500)).await;
    let session = Arc::new(QuerySession::new(client_for(&url), CompileOptions::default()));

    let pending = {
        let session = session.clone();
        tokio::spawn(async move {
            let target = Target::new("app", "slow").unwrap();
            session.execute(&target, json!({}), QuerySource::Ai).await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.cancel_all();

    assert!(matches!(pending.await.unwrap(), Err(ClientError::Cancelled)));
}
