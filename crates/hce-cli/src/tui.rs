use std::time::Duration;

use hce_core::AssistantError;

use crate::LoadedSession;

#[cfg(coverage)]
pub(super) fn run_tui_ratatui_mode(session: &mut LoadedSession) -> Result<i32, AssistantError> {
    super::run_tui_line_mode(session)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;
    use std::time::{Duration, Instant};

    use crossterm::event::{self, Event, KeyEventKind};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use hce_core::AssistantError;
    use hce_runtime::AssistantEffect;
    use log::info;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;

    use super::split_whole_millis;
    use crate::tui_actions::handle_key;
    use crate::tui_render::render_tui;
    use crate::tui_state::TuiUiState;
    use crate::{map_tui_io, LoadedSession};

    const TICK_MS: u64 = 50;

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, AssistantError> {
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_tui_io)?;
            Ok(Self { terminal })
        }

        fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
            &mut self.terminal
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    pub(super) fn run_tui_ratatui_mode(session: &mut LoadedSession) -> Result<i32, AssistantError> {
        let mut terminal = TuiTerminal::new()?;
        let mut ui = TuiUiState::new();
        let state_path = session.state_path.display().to_string();
        let assistant = &mut session.assistant;

        let tick = Duration::from_millis(TICK_MS);
        let mut last_tick = Instant::now();
        let mut carry = Duration::ZERO;

        loop {
            // Virtual time follows the wall clock while the shell runs.
            let now = Instant::now();
            let (elapsed_ms, rest) = split_whole_millis(carry + (now - last_tick));
            last_tick = now;
            carry = rest;
            assistant.advance_clock(elapsed_ms);
            for effect in assistant.drain_effects() {
                match effect {
                    AssistantEffect::Navigate { link } => {
                        info!("navigate to {}", link);
                        ui.status = format!("navigate: {}", link);
                    }
                }
            }

            terminal
                .terminal_mut()
                .draw(|frame| render_tui(frame, assistant, &ui, &state_path))
                .map_err(map_tui_io)?;

            if !event::poll(tick).map_err(map_tui_io)? {
                continue;
            }

            if let Event::Key(key) = event::read().map_err(map_tui_io)? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let should_quit = match handle_key(key, assistant, &mut ui) {
                    Ok(should_quit) => should_quit,
                    Err(error) => {
                        ui.status = error.message;
                        false
                    }
                };
                if should_quit {
                    break;
                }
            }
        }

        assistant.shutdown();
        Ok(0)
    }
}

/// Whole milliseconds in `elapsed` and the remainder left over.
pub(crate) fn split_whole_millis(elapsed: Duration) -> (u64, Duration) {
    let whole = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let rest = elapsed.saturating_sub(Duration::from_millis(whole));
    (whole, rest)
}

#[cfg(not(coverage))]
pub(super) fn run_tui_ratatui_mode(session: &mut LoadedSession) -> Result<i32, AssistantError> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return super::run_tui_line_mode(session);
    }
    rich::run_tui_ratatui_mode(session)
}

#[cfg(test)]
mod tui_tests {
    use super::*;

    #[test]
    fn split_whole_millis_keeps_the_remainder() {
        let (whole, rest) = split_whole_millis(Duration::from_micros(2_750));
        assert_eq!(whole, 2);
        assert_eq!(rest, Duration::from_micros(750));

        let mut carry = Duration::ZERO;
        let mut total = 0u64;
        for _ in 0..4 {
            let (whole, rest) = split_whole_millis(carry + Duration::from_micros(600));
            total += whole;
            carry = rest;
        }
        assert_eq!(total, 2);
        assert_eq!(carry, Duration::from_micros(400));
    }
}
