use crate::events::AppEvent;
use crate::models::AppConfig;

/// Lifecycle of the idea stream behind the ideas panel.
///
/// `Errored` keeps whatever partial text had arrived before the failure;
/// the panel renders it the same way as a completed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Loading { partial: String },
    Completed { text: String },
    Errored { partial: String },
}

/// What the ideas panel should show right now.
#[derive(Debug, PartialEq, Eq)]
pub enum DisplayState<'a> {
    Placeholder,
    Spinner,
    Ideas(&'a str),
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub topic: String,
    pub generation: GenerationState,
    pub seq: u64,
    pub scroll_offset: usize,
    pub show_help: bool,
    pub exit_pending: bool,
    pub endpoint_url: String,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            should_quit: false,
            topic: String::new(),
            generation: GenerationState::Idle,
            seq: 0,
            scroll_offset: 0,
            show_help: false,
            exit_pending: false,
            endpoint_url: config.endpoint_url.clone(),
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.generation, GenerationState::Loading { .. })
    }

    /// A new generation may start only when none is running and the topic
    /// has visible characters. The topic itself is still sent untrimmed.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.topic.trim().is_empty()
    }

    /// Enter the loading state for a fresh generation and return its
    /// sequence number. Any text from a previous run is discarded.
    pub fn begin_generation(&mut self) -> u64 {
        self.seq += 1;
        self.generation = GenerationState::Loading {
            partial: String::new(),
        };
        self.scroll_offset = 0;
        self.seq
    }

    /// Stop the running generation, keeping the text received so far.
    /// Bumps the sequence number so in-flight events from the aborted
    /// stream no longer match.
    pub fn cancel_generation(&mut self) {
        if let GenerationState::Loading { partial } = &mut self.generation {
            let partial = std::mem::take(partial);
            self.seq += 1;
            self.generation = GenerationState::Errored { partial };
        }
    }

    /// Fold a stream event into the generation state. Events whose sequence
    /// number does not match the current generation are dropped.
    pub fn apply_event(&mut self, event: AppEvent) {
        let seq = match &event {
            AppEvent::IdeaChunk { seq, .. }
            | AppEvent::StreamEnded { seq }
            | AppEvent::StreamFailed { seq } => *seq,
        };
        if seq != self.seq {
            return;
        }

        match event {
            AppEvent::IdeaChunk { text, .. } => {
                if let GenerationState::Loading { partial } = &mut self.generation {
                    partial.push_str(&text);
                    self.scroll_to_bottom();
                }
            }
            AppEvent::StreamEnded { .. } => {
                if let GenerationState::Loading { partial } = &mut self.generation {
                    let text = std::mem::take(partial);
                    self.generation = GenerationState::Completed { text };
                }
            }
            AppEvent::StreamFailed { .. } => {
                if let GenerationState::Loading { partial } = &mut self.generation {
                    let partial = std::mem::take(partial);
                    self.generation = GenerationState::Errored { partial };
                }
            }
        }
    }

    pub fn display(&self) -> DisplayState<'_> {
        match &self.generation {
            GenerationState::Idle => DisplayState::Placeholder,
            GenerationState::Loading { partial } if partial.is_empty() => DisplayState::Spinner,
            GenerationState::Loading { partial } => DisplayState::Ideas(partial),
            GenerationState::Completed { text } | GenerationState::Errored { partial: text }
                if text.is_empty() =>
            {
                DisplayState::Placeholder
            }
            GenerationState::Completed { text } => DisplayState::Ideas(text),
            GenerationState::Errored { partial } => DisplayState::Ideas(partial),
        }
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub const fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Set to a very large number to ensure we scroll to the actual bottom
        // The rendering code will clamp this to the maximum possible scroll
        self.scroll_offset = usize::MAX;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq: u64, text: &str) -> AppEvent {
        AppEvent::IdeaChunk {
            seq,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_app_new() {
        let app = App::default();
        assert!(!app.should_quit);
        assert!(app.topic.is_empty());
        assert_eq!(app.generation, GenerationState::Idle);
        assert!(!app.is_loading());
        assert_eq!(app.display(), DisplayState::Placeholder);
    }

    #[test]
    fn test_can_submit_requires_visible_topic() {
        let mut app = App::default();
        assert!(!app.can_submit());

        app.topic = "   ".to_string();
        assert!(!app.can_submit());

        app.topic = "AI in DevOps".to_string();
        assert!(app.can_submit());
    }

    #[test]
    fn test_can_submit_blocked_while_loading() {
        let mut app = App::default();
        app.topic = "Kubernetes".to_string();
        app.begin_generation();
        assert!(!app.can_submit());
    }

    #[test]
    fn test_begin_generation_discards_previous_text() {
        let mut app = App::default();
        let first = app.begin_generation();
        app.apply_event(chunk(first, "old ideas"));
        app.apply_event(AppEvent::StreamEnded { seq: first });

        let second = app.begin_generation();
        assert!(second > first);
        assert_eq!(
            app.generation,
            GenerationState::Loading {
                partial: String::new()
            }
        );
        assert_eq!(app.display(), DisplayState::Spinner);
    }

    #[test]
    fn test_chunks_append_in_order() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(chunk(seq, "## Idea 1\n"));
        app.apply_event(chunk(seq, "- takeaway"));

        assert_eq!(app.display(), DisplayState::Ideas("## Idea 1\n- takeaway"));
    }

    #[test]
    fn test_stream_ended_completes_with_text() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(chunk(seq, "done deal"));
        app.apply_event(AppEvent::StreamEnded { seq });

        assert!(!app.is_loading());
        assert_eq!(
            app.generation,
            GenerationState::Completed {
                text: "done deal".to_string()
            }
        );
        assert_eq!(app.display(), DisplayState::Ideas("done deal"));
    }

    #[test]
    fn test_stream_failure_keeps_partial_text() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(chunk(seq, "half an idea"));
        app.apply_event(AppEvent::StreamFailed { seq });

        assert!(!app.is_loading());
        // A failure renders exactly like a result; no error banner
        assert_eq!(app.display(), DisplayState::Ideas("half an idea"));
    }

    #[test]
    fn test_empty_completion_shows_placeholder() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(AppEvent::StreamEnded { seq });
        assert_eq!(app.display(), DisplayState::Placeholder);

        let seq = app.begin_generation();
        app.apply_event(AppEvent::StreamFailed { seq });
        assert_eq!(app.display(), DisplayState::Placeholder);
    }

    #[test]
    fn test_loading_without_text_shows_spinner() {
        let mut app = App::default();
        app.begin_generation();
        assert_eq!(app.display(), DisplayState::Spinner);
    }

    #[test]
    fn test_stale_events_are_dropped() {
        let mut app = App::default();
        let old = app.begin_generation();
        app.apply_event(chunk(old, "from the old stream"));

        let current = app.begin_generation();
        app.apply_event(chunk(old, "late arrival"));
        app.apply_event(AppEvent::StreamEnded { seq: old });

        assert!(app.is_loading());
        assert_eq!(app.display(), DisplayState::Spinner);

        app.apply_event(chunk(current, "fresh"));
        assert_eq!(app.display(), DisplayState::Ideas("fresh"));
    }

    #[test]
    fn test_cancel_keeps_partial_and_invalidates_stream() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(chunk(seq, "partial"));

        app.cancel_generation();
        assert!(!app.is_loading());
        assert_eq!(app.display(), DisplayState::Ideas("partial"));

        // Anything still in flight from the cancelled stream is ignored
        app.apply_event(chunk(seq, " overrun"));
        assert_eq!(app.display(), DisplayState::Ideas("partial"));
    }

    #[test]
    fn test_cancel_when_not_loading_is_noop() {
        let mut app = App::default();
        let seq = app.seq;
        app.cancel_generation();
        assert_eq!(app.generation, GenerationState::Idle);
        assert_eq!(app.seq, seq);
    }

    #[test]
    fn test_events_after_completion_are_ignored() {
        let mut app = App::default();
        let seq = app.begin_generation();
        app.apply_event(AppEvent::StreamEnded { seq });
        app.apply_event(chunk(seq, "stray"));

        assert_eq!(
            app.generation,
            GenerationState::Completed {
                text: String::new()
            }
        );
    }

    #[test]
    fn test_toggle_help() {
        let mut app = App::default();
        assert!(!app.show_help);
        app.toggle_help();
        assert!(app.show_help);
        app.toggle_help();
        assert!(!app.show_help);
    }

    #[test]
    fn test_scroll_up_saturates() {
        let mut app = App::default();
        app.scroll_offset = 10;
        app.scroll_up(3);
        assert_eq!(app.scroll_offset, 7);
        app.scroll_up(10);
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_scroll_down_unclamped() {
        let mut app = App::default();
        app.scroll_down(3);
        assert_eq!(app.scroll_offset, 3);
        // Clamping to the real content height happens in the UI layer
        app.scroll_down(100);
        assert_eq!(app.scroll_offset, 103);
    }

    #[test]
    fn test_chunk_arrival_follows_the_stream() {
        let mut app = App::default();
        let seq = app.begin_generation();
        assert_eq!(app.scroll_offset, 0);
        app.apply_event(chunk(seq, "text"));
        assert_eq!(app.scroll_offset, usize::MAX);
    }
}
