//! In-memory repositories and router wiring shared by the integration tests.

#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;
use url::Url;

use marquee::application::movies::MovieService;
use marquee::application::posters::PosterService;
use marquee::application::repos::{
    HealthRepo, MovieParams, MoviesRepo, MoviesWriteRepo, NewPoster, PostersRepo, RepoError,
    ReviewsRepo,
};
use marquee::application::reviews::ReviewService;
use marquee::application::trailers::TrailerService;
use marquee::domain::entities::{MovieRecord, PosterRecord, ReviewRecord};
use marquee::domain::listing::{MovieQuery, SortField, SortOrder};
use marquee::infra::http::{ApiState, BodyLimits, build_router};
use marquee::infra::storage::ObjectStorage;

pub const MEDIA_BASE_URL: &str = "http://media.test/media";

/// Catalog kept in process memory, mirroring the Postgres adapter's semantics.
pub struct InMemoryCatalog {
    movies: Mutex<Vec<MovieRecord>>,
    reviews: Mutex<Vec<ReviewRecord>>,
    posters: Mutex<Vec<PosterRecord>>,
    next_id: AtomicI64,
    healthy: AtomicBool,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self {
            movies: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            posters: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            healthy: AtomicBool::new(true),
        }
    }
}

impl InMemoryCatalog {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub async fn movie_count(&self) -> usize {
        self.movies.lock().await.len()
    }

    pub async fn review_count(&self) -> usize {
        self.reviews.lock().await.len()
    }

    fn matches(movie: &MovieRecord, query: &MovieQuery) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| match needle {
            Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        };
        contains(&movie.title, &query.search)
            && contains(&movie.genre, &query.genre)
            && contains(&movie.language, &query.language)
            && query.min_rating.is_none_or(|min| movie.rating >= min)
    }

    fn compare(a: &MovieRecord, b: &MovieRecord, query: &MovieQuery) -> CmpOrdering {
        let directed = |ordering: CmpOrdering| match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        let primary = match query.sort_by {
            SortField::Title => directed(a.title.cmp(&b.title)),
            SortField::Rating => directed(a.rating.total_cmp(&b.rating)),
            SortField::ReleaseDate => match (a.release_date, b.release_date) {
                (Some(left), Some(right)) => directed(left.cmp(&right)),
                (Some(_), None) => CmpOrdering::Less,
                (None, Some(_)) => CmpOrdering::Greater,
                (None, None) => CmpOrdering::Equal,
            },
        };
        primary.then(a.id.cmp(&b.id))
    }

    fn record(id: i64, params: MovieParams) -> MovieRecord {
        MovieRecord {
            id,
            title: params.title,
            description: params.description,
            release_date: params.release_date,
            genre: params.genre,
            director: params.director,
            rating: params.rating,
            duration: params.duration,
            language: params.language,
            poster_url: params.poster_url,
            trailer_url: params.trailer_url,
        }
    }
}

#[async_trait]
impl MoviesRepo for InMemoryCatalog {
    async fn list_movies(&self, query: &MovieQuery) -> Result<Vec<MovieRecord>, RepoError> {
        let movies = self.movies.lock().await;
        let mut matching: Vec<MovieRecord> = movies
            .iter()
            .filter(|movie| Self::matches(movie, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| Self::compare(a, b, query));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(query.limit() as usize)
            .collect())
    }

    async fn count_movies(&self, query: &MovieQuery) -> Result<u64, RepoError> {
        let movies = self.movies.lock().await;
        Ok(movies.iter().filter(|movie| Self::matches(movie, query)).count() as u64)
    }

    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, RepoError> {
        let movies = self.movies.lock().await;
        Ok(movies.iter().find(|movie| movie.id == id).cloned())
    }
}

#[async_trait]
impl MoviesWriteRepo for InMemoryCatalog {
    async fn create_movie(&self, params: MovieParams) -> Result<MovieRecord, RepoError> {
        let record = Self::record(self.next_id(), params);
        self.movies.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update_movie(&self, id: i64, params: MovieParams) -> Result<MovieRecord, RepoError> {
        let mut movies = self.movies.lock().await;
        let slot = movies
            .iter_mut()
            .find(|movie| movie.id == id)
            .ok_or(RepoError::NotFound)?;
        *slot = Self::record(id, params);
        Ok(slot.clone())
    }

    async fn delete_movie(&self, id: i64) -> Result<(), RepoError> {
        let mut movies = self.movies.lock().await;
        let before = movies.len();
        movies.retain(|movie| movie.id != id);
        if movies.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_trailer_url(&self, id: i64, url: &str) -> Result<MovieRecord, RepoError> {
        let mut movies = self.movies.lock().await;
        let slot = movies
            .iter_mut()
            .find(|movie| movie.id == id)
            .ok_or(RepoError::NotFound)?;
        slot.trailer_url = url.to_string();
        Ok(slot.clone())
    }
}

#[async_trait]
impl ReviewsRepo for InMemoryCatalog {
    async fn list_for_movie(&self, movie_id: i64) -> Result<Vec<ReviewRecord>, RepoError> {
        let reviews = self.reviews.lock().await;
        Ok(reviews
            .iter()
            .filter(|review| review.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn create_review(
        &self,
        movie_id: i64,
        comment: &str,
    ) -> Result<ReviewRecord, RepoError> {
        let record = ReviewRecord {
            id: self.next_id(),
            movie_id,
            comment: comment.to_string(),
        };
        self.reviews.lock().await.push(record.clone());
        Ok(record)
    }

    async fn delete_review(&self, id: i64) -> Result<(), RepoError> {
        let mut reviews = self.reviews.lock().await;
        let before = reviews.len();
        reviews.retain(|review| review.id != id);
        if reviews.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostersRepo for InMemoryCatalog {
    async fn replace_poster(&self, poster: NewPoster) -> Result<PosterRecord, RepoError> {
        let record = PosterRecord {
            id: self.next_id(),
            movie_id: poster.movie_id,
            data: poster.data,
            mime_type: poster.mime_type,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut posters = self.posters.lock().await;
        posters.retain(|existing| existing.movie_id != record.movie_id);
        posters.push(record.clone());
        Ok(record)
    }

    async fn find_poster(&self, movie_id: i64) -> Result<Option<PosterRecord>, RepoError> {
        let posters = self.posters.lock().await;
        Ok(posters
            .iter()
            .filter(|poster| poster.movie_id == movie_id)
            .max_by_key(|poster| (poster.created_at, poster.id))
            .cloned())
    }

    async fn delete_poster(&self, movie_id: i64) -> Result<(), RepoError> {
        let mut posters = self.posters.lock().await;
        let before = posters.len();
        posters.retain(|poster| poster.movie_id != movie_id);
        if posters.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl HealthRepo for InMemoryCatalog {
    async fn health_check(&self) -> Result<(), RepoError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepoError::from_persistence("connection refused"))
        }
    }
}

pub fn movie_service(catalog: &Arc<InMemoryCatalog>) -> MovieService {
    let reader: Arc<dyn MoviesRepo> = catalog.clone();
    let writer: Arc<dyn MoviesWriteRepo> = catalog.clone();
    MovieService::new(reader, writer)
}

pub fn review_service(catalog: &Arc<InMemoryCatalog>) -> ReviewService {
    let repo: Arc<dyn ReviewsRepo> = catalog.clone();
    ReviewService::new(repo)
}

pub fn api_state(catalog: &Arc<InMemoryCatalog>, media_root: &Path) -> ApiState {
    let movies = Arc::new(movie_service(catalog));
    let posters_repo: Arc<dyn PostersRepo> = catalog.clone();
    let storage = Arc::new(
        ObjectStorage::new(
            media_root.to_path_buf(),
            Url::parse(MEDIA_BASE_URL).expect("media url"),
        )
        .expect("object storage"),
    );
    let health: Arc<dyn HealthRepo> = catalog.clone();

    ApiState {
        movies: movies.clone(),
        reviews: Arc::new(review_service(catalog)),
        posters: Arc::new(PosterService::new(posters_repo)),
        trailers: Arc::new(TrailerService::new(movies, storage.clone())),
        storage,
        health,
    }
}

pub fn router(catalog: &Arc<InMemoryCatalog>, media_root: &Path) -> Router {
    build_router(
        api_state(catalog, media_root),
        BodyLimits {
            poster_bytes: 64 * 1024,
            trailer_bytes: 256 * 1024,
        },
    )
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

const BOUNDARY: &str = "marquee-test-boundary";

/// Single-part multipart request carrying `data` under `field`.
pub fn multipart_request(
    uri: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}
