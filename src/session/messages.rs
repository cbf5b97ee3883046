//! Unified messaging system for session operations

use crate::environment::Environment;

// ANSI Color Codes for session messages
pub const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
pub const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
pub const COLOR_RESET: &str = "\x1b[0m";

/// Session-specific message types
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Normal session start/shutdown messages
    Info(String),
    /// Success messages for completed operations
    Success(String),
}

impl SessionMessage {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    fn render(&self) -> String {
        match self {
            Self::Info(msg) => format!("{}[INFO]{} {}", COLOR_INFO, COLOR_RESET, msg),
            Self::Success(msg) => format!("{}[SUCCESS]{} {}", COLOR_SUCCESS, COLOR_RESET, msg),
        }
    }

    /// Print the message with appropriate formatting
    pub fn print(&self) {
        println!("{}", self.render());
    }
}

/// Print session startup message
pub fn print_session_starting(environment: &Environment) {
    SessionMessage::info(format!(
        "Connecting to {} backend at {}",
        environment,
        environment.api_url()
    ))
    .print();
}

/// Print the message shown after the backend session was closed.
pub fn print_session_logged_out() {
    SessionMessage::info("Sesión cerrada. Configuración local eliminada.").print();
}

/// Print session exit message
pub fn print_session_exit_success() {
    SessionMessage::success("MARI CLI exited successfully").print();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_tag() {
        assert!(SessionMessage::info("hola").render().contains("[INFO]"));
        assert!(SessionMessage::success("listo").render().ends_with(" listo"));
    }
}
