mod article;
mod cycle;
mod report;

pub use article::{Candidate, Category, NewArticle, RawArticle, StoredArticle};
pub use cycle::NewsCycle;
pub use report::RunReport;
