//! Main TUI application state and logic

use crate::discrepancy::Mismatch;
use crate::session::ExecutionOutcome;
use crate::snapshot::Snapshot;
use crate::ui::panes::{
    self, MismatchRenderData, SourceRenderData, SourceScrollState, StatusRenderData,
    VariablesRenderData, VariablesScrollState,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Variables,
    Output,
    Mismatches,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> variables -> mismatches)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Mismatches,
            FocusedPane::Mismatches => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The finished run being replayed
    pub outcome: ExecutionOutcome,

    /// Whether a learner trace was compared against the run
    pub has_learner_trace: bool,

    /// The source code that was traced
    pub source_code: String,

    /// 0-based position in the trace
    pub position: usize,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub variables_scroll: VariablesScrollState,
    pub output_scroll: usize,
    pub mismatch_scroll: usize,

    pub should_quit: bool,

    /// Status message shown when the snapshot has no note
    pub status_message: String,

    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,

    /// Stand-in for an empty trace
    placeholder: Snapshot,
}

impl App {
    pub fn new(outcome: ExecutionOutcome, source_code: String, has_learner_trace: bool) -> Self {
        let a_second_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);

        App {
            outcome,
            has_learner_trace,
            source_code,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: VariablesScrollState::default(),
            output_scroll: usize::MAX,
            mismatch_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: a_second_ago,
            placeholder: Snapshot::empty(1),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn total_steps(&self) -> usize {
        self.outcome.trace.len()
    }

    pub fn current_snapshot(&self) -> &Snapshot {
        self.outcome
            .trace
            .get(self.position)
            .unwrap_or(&self.placeholder)
    }

    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.position
            .checked_sub(1)
            .and_then(|idx| self.outcome.trace.get(idx))
    }

    /// Mismatches reported at the current position
    pub fn current_mismatches(&self) -> Vec<&Mismatch> {
        self.outcome
            .mismatches
            .iter()
            .filter(|m| m.at_step == self.position + 1)
            .collect()
    }

    fn is_at_end(&self) -> bool {
        self.position + 1 >= self.total_steps()
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables (top) | Mismatches (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let snapshot = self
            .outcome
            .trace
            .get(self.position)
            .unwrap_or(&self.placeholder);
        let failed_here = self.outcome.error.is_some() && self.position + 1 >= self.outcome.trace.len();

        panes::render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source_code: &self.source_code,
                current_line: snapshot.source_line,
                is_error: failed_here,
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_output_pane(
            frame,
            left_rows[1],
            &snapshot.emitted,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        let previous = self
            .position
            .checked_sub(1)
            .and_then(|idx| self.outcome.trace.get(idx));
        let at_step: Vec<&Mismatch> = self
            .outcome
            .mismatches
            .iter()
            .filter(|m| m.at_step == self.position + 1)
            .collect();

        panes::render_variables_pane(
            frame,
            right_rows[0],
            VariablesRenderData {
                snapshot,
                previous,
                mismatches: at_step,
            },
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        panes::render_mismatch_pane(
            frame,
            right_rows[1],
            MismatchRenderData {
                mismatches: &self.outcome.mismatches,
                current_step: self.position + 1,
                has_learner_trace: self.has_learner_trace,
            },
            self.focused_pane == FocusedPane::Mismatches,
            &mut self.mismatch_scroll,
        );

        let message = match &self.outcome.error {
            Some(error) if failed_here => error.as_str(),
            _ => self.status_message.as_str(),
        };
        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message,
                current_step: self.position,
                total_steps: self.outcome.trace.len(),
                note: if failed_here { None } else { snapshot.note.as_deref() },
                condition: snapshot.condition.as_deref(),
                has_error: self.outcome.error.is_some(),
                truncated: self.outcome.truncated,
                is_playing: self.is_playing,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let stepped = (0..n).take_while(|_| self.step_forward()).count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last step".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
                FocusedPane::Mismatches => {
                    self.mismatch_scroll = self.mismatch_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
                FocusedPane::Mismatches => {
                    self.mismatch_scroll = self.mismatch_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.total_steps().saturating_sub(1);
                self.output_scroll = usize::MAX;
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.output_scroll = usize::MAX;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Advance one snapshot; false at the end of the trace
    pub fn step_forward(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.position += 1;
        self.output_scroll = usize::MAX;
        true
    }

    /// Go back one snapshot; false at the start of the trace
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.output_scroll = usize::MAX;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::session::{execute, ExecutionRequest, SubsetKind};
    use crossterm::event::KeyModifiers;

    fn app(source: &str) -> App {
        let request = ExecutionRequest::new(source, SubsetKind::CLike);
        let outcome = execute(&request, &SimulationConfig::default()).unwrap();
        App::new(outcome, source.to_string(), false)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_stepping_is_clamped() {
        let mut app = app("int a = 1;\na = 2;\na = 3;\n");
        assert_eq!(app.total_steps(), 3);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.position, 0);

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.position, 2);
        assert_eq!(app.status_message, "Stepped forward 2 step(s)");

        press(&mut app, KeyCode::Right);
        assert_eq!(app.position, 2);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_snapshot().source_line, 3);
    }

    #[test]
    fn test_focus_cycles_through_all_panes() {
        let mut app = app("int a = 1;\n");
        let start = app.focused_pane;
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.focused_pane, start);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_mismatches_at_current_step() {
        let mut app = app("int a = 1;\na = 2;\n");
        app.outcome.mismatches.push(Mismatch {
            at_step: 2,
            variable: "a".into(),
            predicted: Some(serde_json::json!(1)),
            actual: Some(serde_json::json!(2)),
            explanation: String::new(),
        });
        assert!(app.current_mismatches().is_empty());
        app.step_forward();
        assert_eq!(app.current_mismatches().len(), 1);
        assert!(app.previous_snapshot().is_some());
    }
}
