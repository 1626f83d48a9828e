//! Prompt assembly: a small XML builder and the prompt texts built with it.

pub mod templates;
pub mod xml;

pub use templates::{
    assistant_prompt, enhance_prompt_request, tweet_writer_prompt, user_turn, writer_request,
    ENHANCE_PROMPT_SYSTEM, THREAD_SEPARATOR,
};
pub use xml::XmlPrompt;
