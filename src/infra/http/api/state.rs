use std::sync::Arc;

use crate::application::movies::MovieService;
use crate::application::posters::PosterService;
use crate::application::repos::HealthRepo;
use crate::application::reviews::ReviewService;
use crate::application::trailers::TrailerService;
use crate::infra::storage::ObjectStorage;

#[derive(Clone)]
pub struct ApiState {
    pub movies: Arc<MovieService>,
    pub reviews: Arc<ReviewService>,
    pub posters: Arc<PosterService>,
    pub trailers: Arc<TrailerService>,
    pub storage: Arc<ObjectStorage>,
    pub health: Arc<dyn HealthRepo>,
}
