//! Thread-safe input queues for VMs running on separate threads.

use crate::input::InputProvider;
use intcode_common::Word;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A shared FIFO of input words.
///
/// Cloning a `Mailbox` yields another handle to the same queue. Every
/// operation takes the queue lock, so pushes from several producers and
/// reads by the consuming VM never interleave within a call. Readers wait on
/// a condition variable rather than polling.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    inbox: Mutex<Inbox>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct Inbox {
    words: VecDeque<Word>,
    /// Reads that found the queue empty since the last successful read or push.
    empty_reads: usize,
    closed: bool,
}

impl Inbox {
    fn is_idle(&self, threshold: usize) -> bool {
        self.words.is_empty() && self.empty_reads >= threshold
    }
}

impl Mailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inbox> {
        // Inbox holds plain data; a panicking holder cannot leave it torn.
        self.shared.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one word and wake a waiting reader.
    pub fn push(&self, word: impl Into<Word>) {
        self.push_all([word.into()]);
    }

    /// Append several words under a single lock, so they stay contiguous.
    pub fn push_all<I>(&self, words: I)
    where
        I: IntoIterator<Item = Word>,
    {
        let mut inbox = self.lock();
        inbox.words.extend(words);
        inbox.empty_reads = 0;
        drop(inbox);
        self.shared.ready.notify_all();
    }

    /// Take the front word without waiting.
    pub fn pop(&self) -> Option<Word> {
        Self::take(&mut self.lock())
    }

    /// Take the front word, waiting up to `timeout` for one to arrive.
    ///
    /// Returns immediately once the mailbox is closed.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Word> {
        let inbox = self.lock();
        let (mut inbox, _) = self
            .shared
            .ready
            .wait_timeout_while(inbox, timeout, |i| i.words.is_empty() && !i.closed)
            .unwrap_or_else(PoisonError::into_inner);
        Self::take(&mut inbox)
    }

    fn take(inbox: &mut Inbox) -> Option<Word> {
        let word = inbox.words.pop_front();
        if word.is_some() {
            inbox.empty_reads = 0;
        } else {
            inbox.empty_reads = inbox.empty_reads.saturating_add(1);
        }
        word
    }

    /// Returns true if no words are queued. Never blocks on a reader.
    pub fn is_empty(&self) -> bool {
        self.lock().words.is_empty()
    }

    /// Number of queued words.
    pub fn len(&self) -> usize {
        self.lock().words.len()
    }

    /// Consecutive reads that found the queue empty.
    pub fn empty_reads(&self) -> usize {
        self.lock().empty_reads
    }

    /// Returns true if the queue is empty and its reader has come back
    /// empty-handed at least `threshold` times in a row, checked atomically.
    pub fn is_idle(&self, threshold: usize) -> bool {
        self.lock().is_idle(threshold)
    }

    /// Returns true if every mailbox is idle, judged on one snapshot.
    ///
    /// All queue locks are held together, always taken in slice order, so
    /// no push can land in a mailbox between two of the checks.
    pub fn all_idle(mailboxes: &[Mailbox], threshold: usize) -> bool {
        let inboxes: Vec<MutexGuard<'_, Inbox>> = mailboxes.iter().map(Mailbox::lock).collect();
        inboxes.iter().all(|inbox| inbox.is_idle(threshold))
    }

    /// Close the mailbox, waking every waiting reader.
    ///
    /// Queued words can still be read; readers stop waiting for more.
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.ready.notify_all();
    }

    /// Returns true once [`Mailbox::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// An input provider reading from this mailbox.
    ///
    /// The reader waits up to `poll_interval` for a word. If none arrives it
    /// answers `fallback` when one is given, otherwise it keeps waiting.
    /// Once the mailbox is closed and drained it answers `None`, which
    /// suspends the VM.
    pub fn reader(&self, fallback: Option<Word>, poll_interval: Duration) -> MailboxReader {
        MailboxReader {
            mailbox: self.clone(),
            fallback,
            poll_interval,
        }
    }
}

/// [`InputProvider`] backed by a [`Mailbox`]. See [`Mailbox::reader`].
#[derive(Debug, Clone)]
pub struct MailboxReader {
    mailbox: Mailbox,
    fallback: Option<Word>,
    poll_interval: Duration,
}

impl InputProvider for MailboxReader {
    fn next_input(&mut self) -> Option<Word> {
        loop {
            if let Some(word) = self.mailbox.pop_timeout(self.poll_interval) {
                return Some(word);
            }
            if self.mailbox.is_closed() {
                return None;
            }
            if let Some(fallback) = &self.fallback {
                return Some(fallback.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fifo_order() {
        let mailbox = Mailbox::new();
        mailbox.push(1);
        mailbox.push_all([Word::from(2), Word::from(3)]);
        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.pop(), Some(Word::from(1)));
        assert_eq!(mailbox.pop(), Some(Word::from(2)));
        assert_eq!(mailbox.pop(), Some(Word::from(3)));
        assert_eq!(mailbox.pop(), None);
    }

    #[test]
    fn empty_reads_count_and_reset() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.pop(), None);
        assert_eq!(mailbox.pop_timeout(Duration::from_millis(1)), None);
        assert_eq!(mailbox.empty_reads(), 2);
        assert!(mailbox.is_idle(2));
        assert!(!mailbox.is_idle(3));
        mailbox.push(7);
        assert_eq!(mailbox.empty_reads(), 0);
        assert!(!mailbox.is_idle(0));
    }

    #[test]
    fn empty_reads_saturate() {
        let mailbox = Mailbox::new();
        mailbox.lock().empty_reads = usize::MAX;
        assert_eq!(mailbox.pop(), None);
        assert_eq!(mailbox.empty_reads(), usize::MAX);
        assert!(mailbox.is_idle(usize::MAX));
    }

    #[test]
    fn all_idle_needs_every_mailbox() {
        let boxes = vec![Mailbox::new(), Mailbox::new()];
        assert!(!Mailbox::all_idle(&boxes, 1));
        for mailbox in &boxes {
            assert_eq!(mailbox.pop(), None);
        }
        assert!(Mailbox::all_idle(&boxes, 1));

        boxes[1].push(3);
        assert!(!Mailbox::all_idle(&boxes, 1));
        assert!(Mailbox::all_idle(&boxes[..1], 1));
        assert!(Mailbox::all_idle(&[], 1));
    }

    #[test]
    fn pop_timeout_wakes_on_push() {
        let mailbox = Mailbox::new();
        let producer = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.push(99);
        });
        assert_eq!(mailbox.pop_timeout(Duration::from_secs(10)), Some(Word::from(99)));
        handle.join().unwrap();
    }

    #[test]
    fn close_wakes_waiting_reader() {
        let mailbox = Mailbox::new();
        let closer = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            closer.close();
        });
        let mut reader = mailbox.reader(None, Duration::from_secs(10));
        assert_eq!(reader.next_input(), None);
        handle.join().unwrap();
    }

    #[test]
    fn reader_falls_back_when_empty() {
        let mailbox = Mailbox::new();
        let mut reader = mailbox.reader(Some(Word::from(-1)), Duration::from_millis(1));
        assert_eq!(reader.next_input(), Some(Word::from(-1)));
        mailbox.push(4);
        assert_eq!(reader.next_input(), Some(Word::from(4)));
    }

    #[test]
    fn closed_mailbox_still_drains() {
        let mailbox = Mailbox::new();
        mailbox.push(5);
        mailbox.close();
        let mut reader = mailbox.reader(Some(Word::from(-1)), Duration::from_millis(1));
        assert_eq!(reader.next_input(), Some(Word::from(5)));
        assert_eq!(reader.next_input(), None);
    }

    #[test]
    fn concurrent_producers_keep_packets_contiguous() {
        let mailbox = Mailbox::new();
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let producer = mailbox.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        producer.push_all([Word::from(p), Word::from(i)]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut next_seq = [0; 4];
        while let Some(p) = mailbox.pop() {
            let seq = mailbox.pop().unwrap();
            let p: usize = p.try_into().unwrap();
            assert_eq!(seq, Word::from(next_seq[p]), "producer {p} out of order");
            next_seq[p] += 1;
        }
        assert_eq!(next_seq, [50; 4]);
    }
}
