// Library surface: the typing-session core plus the collaborators the
// terminal binary wires around it (history, config, event runtime).
pub mod app_dirs;
pub mod config;
pub mod history;
pub mod language;
pub mod metrics;
pub mod record;
pub mod runtime;
pub mod session;
pub mod time_series;
pub mod timer;
pub mod word_source;

pub use record::ResultRecord;
pub use session::{KeyInput, Phase, TypingSession};
pub use timer::TestDuration;
