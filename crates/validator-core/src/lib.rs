pub mod config;
pub mod error;
pub mod history;
pub mod idea;
pub mod prompt;
pub mod reply;
pub mod reveal;
pub mod session;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use config::Config;
pub use error::SubmitError;
pub use history::{History, JudgementEntry};
pub use idea::{IdeaSubmission, ToneLevel, ValidIdea};
pub use prompt::{build_request, ChatRequest, RequestSettings, TemperaturePolicy};
pub use reply::{extract_reply, Reply, ReplySource};
pub use reveal::{spawn_reveal, RevealEvent, RevealHandle, Typewriter, REVEAL_INTERVAL};
pub use session::{LoadingFlag, PendingSubmission, Session};
pub use state::{ChatMessage, ChatRole};
pub use transport::{request_reply, ChatTransport, ProxyTransport};
