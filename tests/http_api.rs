mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{
    InMemoryCatalog, MEDIA_BASE_URL, body_bytes, body_json, empty_request, json_request,
    multipart_request, router, send,
};

fn movie(title: &str, genre: &str, rating: f64, release_date: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} description"),
        "release_date": release_date,
        "genre": genre,
        "director": "Someone",
        "rating": rating,
        "duration": 120,
        "language": "English",
    })
}

async fn create(app: &axum::Router, body: Value) -> Value {
    let response = send(app, json_request("POST", "/movies", body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn setup() -> (tempfile::TempDir, Arc<InMemoryCatalog>, axum::Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Arc::new(InMemoryCatalog::default());
    let app = router(&catalog, dir.path());
    (dir, catalog, app)
}

#[tokio::test]
async fn movie_crud_round_trip() {
    let (_dir, _catalog, app) = setup();

    let created = create(&app, movie("Alien", "Horror", 8.5, "1979-05-25")).await;
    let id = created["id"].as_i64().expect("id");
    assert_eq!(created["title"], "Alien");
    assert_eq!(created["release_date"], "1979-05-25");

    let response = send(&app, empty_request("GET", &format!("/movies/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["genre"], "Horror");

    let mut replacement = movie("Aliens", "Action", 8.4, "1986-07-18");
    replacement["duration"] = json!(137);
    let response = send(
        &app,
        json_request("PUT", &format!("/movies/{id}"), replacement),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["title"], "Aliens");
    assert_eq!(updated["duration"], 137);

    let response = send(&app, empty_request("DELETE", &format!("/movies/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("GET", &format!("/movies/{id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn missing_movie_updates_and_deletes_are_not_found() {
    let (_dir, _catalog, app) = setup();

    let response = send(
        &app,
        json_request("PUT", "/movies/404", movie("Ghost", "Drama", 5.0, "1990-07-13")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("DELETE", "/movies/404")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_ids_are_rejected() {
    let (_dir, _catalog, app) = setup();

    for (method, uri) in [
        ("GET", "/movies/abc"),
        ("DELETE", "/movies/abc"),
        ("GET", "/movies/abc/poster"),
        ("GET", "/reviews/movie/abc"),
        ("DELETE", "/reviews/1.5"),
    ] {
        let response = send(&app, empty_request(method, uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn invalid_movie_bodies_are_rejected() {
    let (_dir, catalog, app) = setup();

    let response = send(
        &app,
        json_request("POST", "/movies", movie("Too good", "Drama", 11.0, "2000-01-01")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "invalid_input");

    let response = send(
        &app,
        json_request("POST", "/movies", json!({ "title": "   ", "rating": 5.0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/movies")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .expect("request");
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "bad_request");

    assert_eq!(catalog.movie_count().await, 0);
}

#[tokio::test]
async fn listing_paginates_with_total() {
    let (_dir, _catalog, app) = setup();
    for index in 0..25 {
        create(
            &app,
            movie(&format!("Movie {index:02}"), "Drama", 5.0, "2001-01-01"),
        )
        .await;
    }

    let response = send(&app, empty_request("GET", "/movies?page=2&page_size=10")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 25);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 10);
    let movies = body["movies"].as_array().expect("movies");
    assert_eq!(movies.len(), 10);
    assert_eq!(movies[0]["title"], "Movie 10");

    let response = send(&app, empty_request("GET", "/movies?page=3&pageSize=10")).await;
    let body = body_json(response).await;
    assert_eq!(body["movies"].as_array().expect("movies").len(), 5);
}

#[tokio::test]
async fn listing_defaults_invalid_parameters() {
    let (_dir, _catalog, app) = setup();
    create(&app, movie("Casablanca", "Drama", 8.5, "1942-11-26")).await;
    create(&app, movie("Amelie", "Comedy", 8.3, "2001-04-25")).await;
    create(&app, movie("Brazil", "Sci-Fi", 7.9, "1985-02-20")).await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/movies?sort_by=bogus&order=down&page=0&pageSize=-3&rating=15",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["total"], 3);
    let titles: Vec<&str> = body["movies"]
        .as_array()
        .expect("movies")
        .iter()
        .map(|movie| movie["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, ["Amelie", "Brazil", "Casablanca"]);
}

#[tokio::test]
async fn listing_tolerates_repeated_parameters() {
    let (_dir, _catalog, app) = setup();
    for index in 0..12 {
        create(
            &app,
            movie(&format!("Movie {index:02}"), "Drama", 5.0, "2001-01-01"),
        )
        .await;
    }

    let response = send(
        &app,
        empty_request("GET", "/movies?page=2&page=1&pageSize=5&pageSize=x"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["total"], 12);
    assert_eq!(body["movies"][0]["title"], "Movie 05");
}

#[tokio::test]
async fn listing_filters_and_sorts() {
    let (_dir, _catalog, app) = setup();
    create(&app, movie("Heat", "Crime", 8.3, "1995-12-15")).await;
    create(&app, movie("Ronin", "Crime", 7.2, "1998-09-25")).await;
    create(&app, movie("Up", "Animation", 8.3, "2009-05-29")).await;

    let response = send(
        &app,
        empty_request("GET", "/movies?genre=crime&rating=7.5&sort_by=rating&order=desc"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["movies"][0]["title"], "Heat");

    let response = send(
        &app,
        empty_request("GET", "/movies?sort_by=release_date&order=desc"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["movies"][0]["title"], "Up");
    assert_eq!(body["movies"][2]["title"], "Heat");

    let response = send(&app, empty_request("GET", "/movies?search=ON")).await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["movies"][0]["title"], "Ronin");
}

#[tokio::test]
async fn reviews_are_listed_per_movie() {
    let (_dir, _catalog, app) = setup();
    let created = create(&app, movie("Heat", "Crime", 8.3, "1995-12-15")).await;
    let movie_id = created["id"].as_i64().expect("id");

    for comment in ["Great diner scene", "Long but worth it"] {
        let response = send(
            &app,
            json_request(
                "POST",
                "/reviews",
                json!({ "movie_id": movie_id, "comment": comment }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(
        &app,
        empty_request("GET", &format!("/reviews/movie/{movie_id}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reviews = body_json(response).await;
    let reviews = reviews.as_array().expect("reviews");
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["comment"], "Great diner scene");

    let review_id = reviews[0]["id"].as_i64().expect("review id");
    let response = send(&app, empty_request("DELETE", &format!("/reviews/{review_id}"))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("DELETE", &format!("/reviews/{review_id}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        json_request(
            "POST",
            "/reviews",
            json!({ "movie_id": movie_id, "comment": "  " }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn poster_upload_serves_raw_bytes() {
    let (_dir, _catalog, app) = setup();
    let payload = b"\x89PNG fake image";

    let response = send(
        &app,
        multipart_request("/movies/7/poster", "poster", "poster.png", "image/png", payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["movie_id"], 7);
    assert_eq!(body["mime_type"], "image/png");
    assert_eq!(body["size_bytes"], payload.len());

    let response = send(&app, empty_request("GET", "/movies/7/poster")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().expect("header"),
        "image/png"
    );
    assert_eq!(body_bytes(response).await, payload);

    let response = send(&app, empty_request("DELETE", "/movies/7/poster")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("GET", "/movies/7/poster")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn poster_upload_requires_named_field() {
    let (_dir, _catalog, app) = setup();

    let response = send(
        &app,
        multipart_request("/movies/7/poster", "image", "poster.png", "image/png", b"data"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        multipart_request("/movies/7/poster", "poster", "poster.png", "image/png", b""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn oversized_poster_is_rejected() {
    let (_dir, _catalog, app) = setup();
    let payload = vec![0_u8; 128 * 1024];

    let response = send(
        &app,
        multipart_request("/movies/7/poster", "poster", "big.png", "image/png", &payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn trailer_upload_stores_object_and_sets_url() {
    let (dir, _catalog, app) = setup();
    let created = create(&app, movie("Heat", "Crime", 8.3, "1995-12-15")).await;
    let id = created["id"].as_i64().expect("id");

    let response = send(
        &app,
        multipart_request(
            &format!("/movies/{id}/trailer"),
            "trailer",
            "Heat Official Trailer.MP4",
            "video/mp4",
            b"fake video",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let expected_key = format!("trailers/{id}_heat-official-trailer.mp4");
    assert_eq!(
        body["trailer_url"],
        format!("{MEDIA_BASE_URL}/{expected_key}")
    );
    assert!(dir.path().join(&expected_key).exists());

    let response = send(&app, empty_request("GET", &format!("/media/{expected_key}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().expect("header"),
        "video/mp4"
    );
    assert_eq!(body_bytes(response).await, b"fake video");
}

#[tokio::test]
async fn trailer_for_missing_movie_leaves_no_object() {
    let (dir, _catalog, app) = setup();

    let response = send(
        &app,
        multipart_request("/movies/99/trailer", "trailer", "clip.mp4", "video/mp4", b"data"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!dir.path().join("trailers/99_clip.mp4").exists());
}

#[tokio::test]
async fn trailer_url_can_be_set_directly() {
    let (_dir, _catalog, app) = setup();
    let created = create(&app, movie("Heat", "Crime", 8.3, "1995-12-15")).await;
    let id = created["id"].as_i64().expect("id");

    let response = send(
        &app,
        empty_request(
            "PUT",
            &format!("/movies/{id}/trailer?url=https%3A%2F%2Fvideos.example%2Fheat"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["trailer_url"],
        "https://videos.example/heat"
    );

    let response = send(&app, empty_request("PUT", &format!("/movies/{id}/trailer"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        empty_request("PUT", &format!("/movies/{id}/trailer?url=a&url=b")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "bad_request");

    let response = send(
        &app,
        empty_request("PUT", "/movies/404/trailer?url=https%3A%2F%2Fx.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_rejects_missing_and_traversing_keys() {
    let (_dir, _catalog, app) = setup();

    let response = send(&app, empty_request("GET", "/media/trailers/none.mp4")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("GET", "/media/../secret")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn db_health_reflects_store() {
    let (_dir, catalog, app) = setup();

    let response = send(&app, empty_request("GET", "/_health/db")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    catalog.set_healthy(false);
    let response = send(&app, empty_request("GET", "/_health/db")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (_dir, _catalog, app) = setup();

    let response = send(&app, empty_request("GET", "/movies")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key(marquee::infra::http::REQUEST_ID_HEADER)
    );
}
