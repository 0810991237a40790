#![allow(dead_code)]

use fake::faker::internet::en::FreeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use marquee_client::api_client::ApiClient;
use marquee_client::session::{Session, TOKEN_KEY, USER_KEY};
use marquee_client::storage::{MemoryStorage, Storage};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "token-123";

pub struct TestApp {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub session: Session,
}

impl TestApp {
    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn stored_user(&self) -> Option<Value> {
        self.storage
            .get(USER_KEY)
            .map(|x| serde_json::from_str(&x).unwrap())
    }

    pub fn store_credential(&self, token: &str, user: &Value) {
        self.storage.set(TOKEN_KEY, token).unwrap();
        self.storage.set(USER_KEY, &user.to_string()).unwrap();
    }

    pub fn store_token_only(&self, token: &str) {
        self.storage.set(TOKEN_KEY, token).unwrap();
    }

    /// Logs in through a mocked backend that answers with `user`.
    pub async fn login_as(&self, user: Value) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_response(TOKEN, user)))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;

        self.session
            .login("ann@example.com", "secret1")
            .await
            .unwrap();
    }

    pub async fn mount_watchlist_change(&self, verb: &str, id: i64, status: u16) {
        Mock::given(method(verb))
            .and(path(format!("/api/watchlist/{id}")))
            .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(message(status)))
            .mount(&self.server)
            .await;
    }
}

fn message(status: u16) -> Value {
    if status < 300 {
        json!({"message": "ok"})
    } else {
        json!({"detail": "something went wrong"})
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_logout_timeout(Duration::from_secs(5)).await
}

pub async fn spawn_app_with_logout_timeout(timeout: Duration) -> TestApp {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let session = Session::new(api, storage.clone(), timeout);

    TestApp {
        server,
        storage,
        session,
    }
}

pub fn user_json(watchlist: &[i64]) -> Value {
    json!({
        "id": "65f0c0ffee",
        "name": Name().fake::<String>(),
        "email": FreeEmail().fake::<String>(),
        "avatar": "https://images.example.com/avatar.jpg",
        "watchlist": watchlist,
        "created_at": "2024-01-15T09:30:00.123456"
    })
}

pub fn auth_response(token: &str, user: Value) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user
    })
}

pub fn movie_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": format!("{title} overview"),
        "poster_path": null,
        "backdrop_path": null,
        "release_date": "1999-03-31",
        "vote_average": 7.5,
        "genre_ids": [28],
        "media_type": "movie",
        "trailer_url": null
    })
}
