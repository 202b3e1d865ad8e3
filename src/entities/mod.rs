pub mod prelude;

pub mod analysis_results;
pub mod feedback;
pub mod images;
pub mod produce;
pub mod reviews;
pub mod user_profiles;
pub mod users;
