pub mod json_errors;
pub mod request_id;
