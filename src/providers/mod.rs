pub mod factory;
pub mod gemini;
mod gemini_types;
pub mod http_client;
pub mod openai;
pub mod scrub;
pub mod traits;

pub use factory::create_generator;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::Generator;
