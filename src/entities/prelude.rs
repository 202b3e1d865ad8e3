pub use super::analysis_results::Entity as AnalysisResults;
pub use super::feedback::Entity as Feedback;
pub use super::images::Entity as Images;
pub use super::produce::Entity as Produce;
pub use super::reviews::Entity as Reviews;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
