pub mod extraction_json;
pub mod outline;
pub mod topic_csv;
