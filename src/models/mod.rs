pub mod catalog;
pub mod community;
pub mod listen;
pub mod recommendation;

pub use catalog::CatalogItem;
pub use community::CommunityAssignment;
pub use listen::{ListenEvent, ListenOutcome};
pub use recommendation::{HybridRecommendation, Recommendation, SimilarUser};
