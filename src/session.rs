use chrono::Local;
use std::collections::HashMap;

use crate::metrics::{self, Metrics};
use crate::record::ResultRecord;
use crate::time_series::WpmSample;
use crate::timer::{Countdown, TestDuration, TickOutcome, TimerToken};
use crate::word_source::WordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    Active,
    Finished,
}

/// Position of the next keystroke: a word in the stream and a char within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub word_index: usize,
    pub char_index: usize,
}

/// A single interpreted keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Commit,
}

impl KeyInput {
    /// Space commits the current word, anything else is typed
    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            Self::Commit
        } else {
            Self::Char(c)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("test duration can only change before the session starts")]
    DurationLocked,
}

/// Read-only view handed to renderers after every transition
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a> {
    pub words: &'a [String],
    pub cursor: Cursor,
    pub input: &'a str,
    pub typed_words: &'a HashMap<usize, String>,
    pub phase: Phase,
    pub seconds_remaining: u32,
}

/// A timed typing session over an endless stream of random words
#[derive(Debug)]
pub struct TypingSession {
    source: WordSource,
    words: Vec<String>,
    cursor: Cursor,
    input: String,
    typed_words: HashMap<usize, String>,
    total_chars: usize,
    correct_chars: usize,
    phase: Phase,
    timer: Countdown,
    wpm_samples: Vec<WpmSample>,
    result: Option<ResultRecord>,
}

impl TypingSession {
    pub fn new(mut source: WordSource, duration: TestDuration) -> Self {
        let words = source.initial();
        Self {
            source,
            words,
            cursor: Cursor::default(),
            input: String::new(),
            typed_words: HashMap::new(),
            total_chars: 0,
            correct_chars: 0,
            phase: Phase::NotStarted,
            timer: Countdown::new(duration),
            wpm_samples: Vec::new(),
            result: None,
        }
    }

    pub fn apply(&mut self, key: KeyInput) {
        match key {
            KeyInput::Char(c) => self.insert_char(c),
            KeyInput::Backspace => self.delete_char(),
            KeyInput::Commit => self.commit_word(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.begin_input() {
            return;
        }

        let matches_target = self
            .target_word()
            .and_then(|w| w.chars().nth(self.cursor.char_index))
            .is_some_and(|expected| expected == c);

        self.input.push(c);
        self.total_chars += 1;
        if matches_target {
            self.correct_chars += 1;
        }
        self.cursor.char_index += 1;

        self.check_invariants();
    }

    pub fn commit_word(&mut self) {
        if !self.begin_input() {
            return;
        }

        let index = self.cursor.word_index;
        self.typed_words.insert(index, self.input.clone());

        if index + 1 < self.words.len() {
            self.cursor = Cursor {
                word_index: index + 1,
                char_index: 0,
            };
            self.input.clear();
            self.source.extend(&mut self.words, self.cursor.word_index);
        } else {
            tracing::warn!(index, "commit on the last buffered word, cursor held");
        }

        self.check_invariants();
    }

    pub fn delete_char(&mut self) {
        if !self.begin_input() {
            return;
        }

        if self.cursor.char_index > 0 {
            self.input.pop();
            self.cursor.char_index -= 1;
        } else if self.cursor.word_index > 0 {
            // The word being left keeps what is in the buffer (always empty
            // here). The previous word is re-entered where its typed text
            // ended, or empty without history.
            self.typed_words.insert(self.cursor.word_index, self.input.clone());
            let index = self.cursor.word_index - 1;
            self.input = self.typed_words.get(&index).cloned().unwrap_or_default();
            self.cursor = Cursor {
                word_index: index,
                char_index: self.input.chars().count(),
            };
        }

        self.check_invariants();
    }

    /// Back to a fresh, unstarted session with a new word stream
    pub fn reset(&mut self) {
        self.timer.reset(self.timer.duration());
        self.words = self.source.initial();
        self.cursor = Cursor::default();
        self.input.clear();
        self.typed_words.clear();
        self.total_chars = 0;
        self.correct_chars = 0;
        self.phase = Phase::NotStarted;
        self.wpm_samples.clear();
        self.result = None;
        tracing::debug!(words = self.words.len(), "session reset");
    }

    pub fn set_duration(&mut self, duration: TestDuration) -> Result<(), SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::DurationLocked);
        }
        self.timer.reset(duration);
        Ok(())
    }

    /// Advance the countdown by one second. Returns the result record on the
    /// tick that finishes the session.
    pub fn on_tick(&mut self, token: TimerToken) -> Option<ResultRecord> {
        match self.timer.tick(token) {
            TickOutcome::Stale => {
                tracing::debug!(?token, "ignoring stale tick");
                None
            }
            TickOutcome::Idle => None,
            TickOutcome::Running(_) => {
                self.record_sample();
                None
            }
            TickOutcome::Expired => {
                self.record_sample();
                Some(self.finish())
            }
        }
    }

    /// Token for the running countdown, if the session is active
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn duration(&self) -> TestDuration {
        self.timer.duration()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn typed_words(&self) -> &HashMap<usize, String> {
        &self.typed_words
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn correct_chars(&self) -> usize {
        self.correct_chars
    }

    pub fn wpm_samples(&self) -> &[WpmSample] {
        &self.wpm_samples
    }

    pub fn result(&self) -> Option<&ResultRecord> {
        self.result.as_ref()
    }

    /// Metrics over the seconds elapsed so far
    pub fn live_metrics(&self) -> Metrics {
        metrics::compute(self.correct_chars, self.total_chars, self.timer.elapsed())
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            words: &self.words,
            cursor: self.cursor,
            input: &self.input,
            typed_words: &self.typed_words,
            phase: self.phase,
            seconds_remaining: self.timer.remaining(),
        }
    }

    fn target_word(&self) -> Option<&str> {
        self.words.get(self.cursor.word_index).map(String::as_str)
    }

    /// Common prologue of every keystroke: reject input once finished, start
    /// the clock on the first key and keep the stream ahead of the cursor.
    fn begin_input(&mut self) -> bool {
        match self.phase {
            Phase::Finished => return false,
            Phase::NotStarted => {
                self.phase = Phase::Active;
                let token = self.timer.start();
                tracing::info!(duration = %self.timer.duration(), ?token, "session started");
            }
            Phase::Active => {}
        }

        self.source.extend(&mut self.words, self.cursor.word_index);
        true
    }

    fn record_sample(&mut self) {
        let live = self.live_metrics();
        self.wpm_samples
            .push(WpmSample::new(self.timer.elapsed(), live.wpm));
    }

    fn finish(&mut self) -> ResultRecord {
        self.phase = Phase::Finished;
        self.timer.stop();

        let duration_secs = self.timer.duration().secs();
        let record = ResultRecord::new(
            metrics::compute(self.correct_chars, self.total_chars, duration_secs),
            duration_secs,
            self.total_chars,
            self.correct_chars,
            Local::now(),
        );

        tracing::info!(
            wpm = record.wpm(),
            accuracy = record.accuracy(),
            total_chars = self.total_chars,
            correct_chars = self.correct_chars,
            "session finished"
        );

        self.result = Some(record.clone());
        record
    }

    fn check_invariants(&self) {
        debug_assert!(self.correct_chars <= self.total_chars);
        debug_assert!(self.cursor.word_index < self.words.len());
        debug_assert_eq!(self.cursor.char_index, self.input.chars().count());
    }
}
