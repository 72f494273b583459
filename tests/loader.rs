mod support;

use std::io::Write;
use std::sync::Arc;

use marquee::application::loader::{LoadSummary, LoaderError, load_catalog};
use marquee::domain::listing::MovieListParams;

use support::{InMemoryCatalog, movie_service, review_service};

fn catalog_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write catalog");
    file
}

#[tokio::test]
async fn imports_movies_with_nested_reviews() {
    let catalog = Arc::new(InMemoryCatalog::default());
    let movies = movie_service(&catalog);
    let reviews = review_service(&catalog);

    let file = catalog_file(
        r#"[
            {
                "id": 42,
                "title": "The Third Man",
                "release_date": "1949-09-02T00:00:00Z",
                "genre": "Noir",
                "rating": 8.1,
                "duration": 104,
                "reviews": [{ "comment": "Zither!" }, { "comment": "Ferris wheel" }]
            },
            { "title": "Rashomon", "release_date": "1950-08-25", "rating": 8.2 }
        ]"#,
    );

    let summary = load_catalog(&movies, &reviews, file.path())
        .await
        .expect("catalog imports");
    assert_eq!(
        summary,
        LoadSummary {
            movies: 2,
            reviews: 2
        }
    );

    let page = movies
        .list(MovieListParams::default())
        .await
        .expect("listing");
    assert_eq!(page.total, 2);
    let third_man = page
        .items
        .iter()
        .find(|movie| movie.title == "The Third Man")
        .expect("imported movie");
    assert_ne!(third_man.id, 42);
    assert_eq!(
        third_man.release_date.map(|date| date.to_string()),
        Some("1949-09-02".to_string())
    );

    let imported_reviews = reviews
        .list_for_movie(third_man.id)
        .await
        .expect("reviews");
    assert_eq!(imported_reviews.len(), 2);
}

#[tokio::test]
async fn stops_at_first_invalid_movie() {
    let catalog = Arc::new(InMemoryCatalog::default());
    let movies = movie_service(&catalog);
    let reviews = review_service(&catalog);

    let file = catalog_file(
        r#"[
            { "title": "Valid", "rating": 6.0 },
            { "title": "Broken", "rating": 42.0 },
            { "title": "Never reached", "rating": 5.0 }
        ]"#,
    );

    let err = load_catalog(&movies, &reviews, file.path())
        .await
        .expect_err("second entry is invalid");
    match err {
        LoaderError::Movie { index, title, .. } => {
            assert_eq!(index, 1);
            assert_eq!(title, "Broken");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(catalog.movie_count().await, 1);
}

#[tokio::test]
async fn reports_unreadable_and_malformed_files() {
    let catalog = Arc::new(InMemoryCatalog::default());
    let movies = movie_service(&catalog);
    let reviews = review_service(&catalog);

    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.json");
    let err = load_catalog(&movies, &reviews, &missing)
        .await
        .expect_err("file is missing");
    assert!(matches!(err, LoaderError::Read { .. }));

    let file = catalog_file(r#"{ "title": "not an array" }"#);
    let err = load_catalog(&movies, &reviews, file.path())
        .await
        .expect_err("document is not an array");
    assert!(matches!(err, LoaderError::Parse(_)));
    assert_eq!(catalog.review_count().await, 0);
}
