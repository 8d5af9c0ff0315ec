pub(crate) mod analytics;
pub(crate) mod errors;
pub(crate) mod gradebook;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod quizzes;
pub(crate) mod router;
pub(crate) mod submissions;

pub(crate) use router::router;
