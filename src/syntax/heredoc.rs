//! Pending heredoc terminators
//!
//! Heredoc openers are queued in the order they appear on a line; their
//! bodies start on the next line and are closed strictly in that order.

use std::collections::VecDeque;

/// One opened heredoc waiting for its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHeredoc {
    /// `<<-` and `<<~` allow the terminator to be indented
    pub tolerant: bool,
    /// Terminator without quotes
    pub terminator: String,
}

/// FIFO of heredocs opened but not yet closed
#[derive(Debug, Clone, Default)]
pub struct HeredocQueue {
    pending: VecDeque<PendingHeredoc>,
}

impl HeredocQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a heredoc from its opener (`<<`, `<<-`, `<<~`) and bare name
    pub fn open(&mut self, opener: &[u8], terminator: &[u8]) {
        self.pending.push_back(PendingHeredoc {
            tolerant: opener != b"<<",
            terminator: String::from_utf8_lossy(terminator).into_owned(),
        });
    }

    pub fn front(&self) -> Option<&PendingHeredoc> {
        self.pending.front()
    }

    /// Check a body line against the front terminator.
    ///
    /// On a match the entry is removed and `true` is returned.
    pub fn try_close(&mut self, line: &[u8]) -> bool {
        let Some(front) = self.pending.front() else {
            return false;
        };
        let check = if front.tolerant {
            line.trim_ascii()
        } else {
            line.trim_ascii_end()
        };
        if check == front.terminator.as_bytes() {
            self.pending.pop_front();
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = HeredocQueue::new();
        queue.open(b"<<", b"A");
        queue.open(b"<<~", b"B");
        assert_eq!(queue.len(), 2);

        assert!(!queue.try_close(b"B"));
        assert!(queue.try_close(b"A"));
        assert_eq!(queue.front().map(|h| h.terminator.as_str()), Some("B"));
        assert!(queue.try_close(b"  B  "));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_strict_terminator_rejects_indent() {
        let mut queue = HeredocQueue::new();
        queue.open(b"<<", b"EOS");
        assert!(!queue.try_close(b"  EOS"));
        assert!(queue.try_close(b"EOS \r"));
    }

    #[test]
    fn test_tolerant_terminator() {
        let mut queue = HeredocQueue::new();
        queue.open(b"<<-", b"SQL");
        assert!(queue.front().is_some_and(|h| h.tolerant));
        assert!(queue.try_close(b"\tSQL"));
    }

    #[test]
    fn test_empty_queue_never_closes() {
        let mut queue = HeredocQueue::new();
        assert!(!queue.try_close(b""));
    }
}
