pub mod candidate;
pub mod post;

pub use candidate::Candidate;
pub use post::Post;
