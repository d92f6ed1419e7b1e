use std::sync::Arc;

use persona::{Router, Server};
use persona::api::{self, people::InMemoryPeople};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(api::router(Arc::new(InMemoryPeople::default()))).await
    }

    /// Serves `app` on an ephemeral port.
    async fn spawn_with(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            Server::serve_on(listener, app, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self { base_url, shutdown: Some(tx), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

fn person() -> Value {
    json!({
        "first_name": "Ana",
        "last_name": "Gómez",
        "age": 31,
        "email": "ana@example.com",
        "is_married": false,
        "password": "correct-horse"
    })
}

#[tokio::test]
async fn home_says_hello() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "Hello": "World!" }));
}

#[tokio::test]
async fn create_person_answers_201_without_password() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/person/new"))
        .json(&person())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["is_married"], false);
}

#[tokio::test]
async fn invalid_person_answers_422_with_field_list() {
    let srv = TestServer::spawn().await;
    let mut bad = person();
    bad["first_name"] = json!("");
    bad["email"] = json!("nobody");
    let res = reqwest::Client::new()
        .post(srv.url("/person/new"))
        .json(&bad)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "errors": [
            { "field": "body.first_name", "message": "ensure this value has at least 1 characters" },
            { "field": "body.email", "message": "value is not a valid email address" }
        ]})
    );
}

#[tokio::test]
async fn person_detail_by_id() {
    let srv = TestServer::spawn().await;

    for id in 1..=4 {
        let res = reqwest::get(srv.url(&format!("/person/detail/{id}"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body[id.to_string()], "Succeed!");
    }

    for id in ["0", "-1"] {
        let res = reqwest::get(srv.url(&format!("/person/detail/{id}"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "id {id}");
    }

    let res = reqwest::get(srv.url("/person/detail/5")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "detail": "This person does not exist" }));
}

#[tokio::test]
async fn person_detail_query_is_deprecated_but_served() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/person/detail?age=25")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["deprecation"], "true");

    let res = reqwest::get(srv.url("/person/detail?name=Ana")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_person_merges_person_and_location() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .put(srv.url("/person/2"))
        .json(&json!({
            "person": person(),
            "location": { "city": "Madrid", "state": "Madrid", "country": "spain" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let mut expected = person();
    expected["hair_color"] = Value::Null;
    expected["city"] = json!("Madrid");
    expected["state"] = json!("Madrid");
    expected["country"] = json!("spain");
    assert_eq!(body, expected);
}

#[tokio::test]
async fn login_and_contact_forms() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("username=ana&password=x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "username": "ana", "message": "Login successful" }));

    let res = client
        .post(srv.url("/contact"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("user-agent", "persona-tests/1.0")
        .header("cookie", "ads=yes")
        .body("first_name=Ana&last_name=Gomez&email=ana%40example.com&message=Hello+there%2C+I+have+a+question")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!("persona-tests/1.0"));
}

#[tokio::test]
async fn uploads_report_size_in_kb() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let image = Part::bytes(vec![7u8; 3000]).file_name("dog.png").mime_str("image/png").unwrap();
    let res = client
        .post(srv.url("/post-image"))
        .multipart(Form::new().part("image", image))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "filename": "dog.png", "content-type": "image/png", "size_in_kb": 2.93 }));

    let form = Form::new()
        .part("images", Part::bytes(vec![0u8; 2048]).file_name("one.png"))
        .part("images", Part::bytes(vec![0u8; 512]).file_name("two.png"));
    let res = client.post(srv.url("/post-images")).multipart(form).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body[0]["filename"], "one.png");
    assert_eq!(body[0]["size_in_kb"], 2.0);
    assert_eq!(body[1]["filename"], "two.png");
    assert_eq!(body[1]["size_in_kb"], 0.5);
}

#[tokio::test]
async fn oversized_upload_is_413_before_the_handler() {
    let app = api::router(Arc::new(InMemoryPeople::default())).with_body_limit(1024);
    let srv = TestServer::spawn_with(app).await;
    let client = reqwest::Client::new();

    let image = Part::bytes(vec![1u8; 4096]).file_name("big.png");
    let res = client
        .post(srv.url("/post-image"))
        .multipart(Form::new().part("image", image))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let res = client
        .post(srv.url("/person/new"))
        .header("content-type", "application/json")
        .body(format!(r#"{{"first_name":"{}"}}"#, "x".repeat(2048)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let small = Part::bytes(vec![1u8; 256]).file_name("small.png");
    let res = client
        .post(srv.url("/post-image"))
        .multipart(Form::new().part("image", small))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["size_in_kb"], 0.25);
}

#[tokio::test]
async fn login_needs_non_empty_fields() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/login"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("username=&password=")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn encoded_path_ids_are_decoded() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/person/detail/%31")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "1": "Succeed!" }));
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(srv.url("/person/new")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_checks_answer() {
    let srv = TestServer::spawn().await;
    for (path, status) in [("/healthz", "ok"), ("/readyz", "ready")] {
        let res = reqwest::get(srv.url(path)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], status);
    }
}
