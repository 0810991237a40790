mod helpers;
use helpers::{movie_json, spawn_app};
use marquee_client::error::ApiError;
use marquee_common::api::{MediaType, TimeWindow};
use marquee_common::domain::ItemId;
use serde_json::json;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn search_sends_query_and_page() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/api/movies/search"))
        .and(query_param("q", "the matrix"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([movie_json(603, "The Matrix")])),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let results = app.session.api().search("  the matrix ", 2).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, ItemId::new(603));
}

#[tokio::test]
async fn invalid_catalog_requests_never_reach_the_server() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.server)
        .await;

    let api = app.session.api();
    assert!(matches!(api.search("   ", 1).await, Err(ApiError::Validation(_))));
    assert!(matches!(api.popular(0).await, Err(ApiError::Validation(_))));
    assert!(matches!(api.by_genre(28, 501).await, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn trending_uses_media_type_and_window() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/api/movies/trending"))
        .and(query_param("media_type", "tv"))
        .and(query_param("time_window", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1399, "title": "Game of Thrones", "overview": "", "media_type": "tv"}
        ])))
        .expect(1)
        .mount(&app.server)
        .await;

    let shows = app
        .session
        .api()
        .trending(MediaType::Tv, TimeWindow::Week)
        .await
        .unwrap();
    assert_eq!(shows[0].media_type.as_deref(), Some("tv"));
    assert_eq!(shows[0].vote_average, 0.0);
}

#[tokio::test]
async fn details_and_trailer() {
    let app = spawn_app().await;

    let mut detail = movie_json(603, "The Matrix");
    detail["genres"] = json!([{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]);
    detail["runtime"] = json!(136);
    detail["tagline"] = json!("Welcome to the Real World.");

    Mock::given(method("GET"))
        .and(path("/api/movies/603"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/movies/603/trailer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"trailer_url": "https://www.youtube.com/watch?v=vKQi3bBA1y8"}),
        ))
        .mount(&app.server)
        .await;

    let api = app.session.api();
    let detail = api.details(ItemId::new(603)).await.unwrap();
    assert_eq!(detail.movie.title, "The Matrix");
    assert_eq!(detail.genres.len(), 2);
    assert_eq!(detail.runtime, Some(136));

    let trailer = api.trailer(ItemId::new(603)).await.unwrap();
    assert!(trailer.trailer_url.contains("youtube"));
}

#[tokio::test]
async fn missing_title_is_not_found_with_detail() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/api/movies/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Movie not found"})))
        .mount(&app.server)
        .await;

    let err = app.session.api().details(ItemId::new(1)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.detail(), Some("Movie not found"));
}

#[tokio::test]
async fn unexpected_shape_is_a_decode_error() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/api/movies/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&app.server)
        .await;

    let err = app.session.api().popular(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn genres_and_featured() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/api/genres"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 28, "name": "Action"},
            {"id": 35, "name": "Comedy"}
        ])))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/movies/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_json(550, "Fight Club")))
        .mount(&app.server)
        .await;

    let api = app.session.api();
    let genres = api.genres().await.unwrap();
    assert_eq!(genres[1].name, "Comedy");

    let featured = api.featured().await.unwrap();
    assert_eq!(featured.id, ItemId::new(550));
}
