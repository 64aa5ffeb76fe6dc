mod error_location;
mod redacted_token;
