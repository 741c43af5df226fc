pub mod factory;
pub mod openai;

pub use factory::create_model;
pub use openai::OpenAiModel;
