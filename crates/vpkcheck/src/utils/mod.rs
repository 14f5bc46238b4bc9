use std::io::IsTerminal;

pub mod config;
pub mod logging;

/// Plain output when stdout is redirected to a file or pipe.
pub fn disable_colors_unless_terminal() {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}
