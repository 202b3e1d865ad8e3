pub mod analysis;
pub mod feedback;
pub mod image;
pub mod produce;
pub mod review;
pub mod visitor;
