pub mod request_path;
