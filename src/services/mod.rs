pub mod storage;
pub use storage::UploadStorage;

pub mod prediction_service;
pub mod prediction_service_impl;
pub use prediction_service::{PredictionError, PredictionOutcome, PredictionService, Upload};
pub use prediction_service_impl::SeaOrmPredictionService;

pub mod feedback_service;
pub mod feedback_service_impl;
pub use feedback_service::{FeedbackError, FeedbackService};
pub use feedback_service_impl::SeaOrmFeedbackService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod review_service;
pub mod review_service_impl;
pub use review_service::{ReviewError, ReviewService};
pub use review_service_impl::SeaOrmReviewService;
