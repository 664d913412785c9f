//! Networks of VMs, one thread per node, exchanging packets through mailboxes.
//!
//! Node `i` boots with its own address `i` as first input and then reads
//! from its mailbox. Its outputs are grouped into packets of
//! [`NetworkConfig::packet_arity`] words: a destination followed by the
//! payload. Packets for a node inside the network are appended to that
//! node's mailbox in one locked operation; all others go to the supervisor
//! and can be read with [`Network::recv_timeout`].

use crate::config::Config;
use crate::error::RuntimeError;
use crate::machine::{State, Vm};
use crate::mailbox::Mailbox;
use intcode_common::{Program, Word};
use num_traits::ToPrimitive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Tunables for a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Words per packet, destination included. Values below 1 are treated as 1.
    pub packet_arity: usize,
    /// How long a node waits on an empty mailbox before using `empty_input`.
    pub poll_interval: Duration,
    /// Value a node reads when its mailbox stays empty for `poll_interval`.
    /// `None` makes nodes block until a word arrives.
    pub empty_input: Option<Word>,
    /// Consecutive empty reads after which a node with an empty mailbox
    /// counts as idle.
    pub idle_threshold: usize,
    /// Configuration of every node VM.
    pub vm: Config,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            packet_arity: 3,
            poll_interval: Duration::from_millis(2),
            empty_input: Some(Word::from(-1)),
            idle_threshold: 2,
            vm: Config::default(),
        }
    }
}

/// A packet addressed outside the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Node that sent it.
    pub from: usize,
    /// Destination word as produced by the sender.
    pub dest: Word,
    /// Remaining words of the packet.
    pub payload: Vec<Word>,
}

/// A running network of VM threads.
///
/// Dropping the network stops and joins the nodes, discarding their errors;
/// use [`Network::shutdown`] to collect them.
pub struct Network {
    mailboxes: Vec<Mailbox>,
    external: Receiver<Packet>,
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<Result<(), RuntimeError>>>,
    idle_threshold: usize,
}

impl Network {
    /// Boot `nodes` copies of `program`, each on its own thread.
    pub fn spawn(program: &Program, nodes: usize, config: NetworkConfig) -> Self {
        let mailboxes: Vec<Mailbox> = (0..nodes).map(|_| Mailbox::new()).collect();
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, external) = mpsc::channel();
        let arity = config.packet_arity.max(1);

        let handles = mailboxes
            .iter()
            .enumerate()
            .map(|(node, mailbox)| {
                let mut vm = Vm::with_config(program, config.vm).with_provider(
                    mailbox.reader(config.empty_input.clone(), config.poll_interval),
                );
                vm.push_input(node);
                let link = Link {
                    node,
                    mailboxes: mailboxes.clone(),
                    external: tx.clone(),
                    stop: Arc::clone(&stop),
                    arity,
                };
                thread::spawn(move || link.drive(vm))
            })
            .collect();

        Self {
            mailboxes,
            external,
            stop,
            handles,
            idle_threshold: config.idle_threshold,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    /// Returns true if the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    /// The mailbox of `node`.
    pub fn mailbox(&self, node: usize) -> Option<&Mailbox> {
        self.mailboxes.get(node)
    }

    /// Inject a payload into `node`'s mailbox as one contiguous block.
    ///
    /// Returns false if there is no such node.
    pub fn send<I>(&self, node: usize, payload: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Word>,
    {
        match self.mailboxes.get(node) {
            Some(mailbox) => {
                mailbox.push_all(payload.into_iter().map(Into::into));
                true
            }
            None => false,
        }
    }

    /// Wait up to `timeout` for a packet addressed outside the network.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Packet> {
        self.external.recv_timeout(timeout).ok()
    }

    /// Take a packet addressed outside the network, if one is waiting.
    pub fn try_recv(&self) -> Option<Packet> {
        self.external.try_recv().ok()
    }

    /// Returns true if every mailbox is empty and every node has found it
    /// empty at least `idle_threshold` times in a row.
    ///
    /// All mailboxes are inspected under their locks at once, so a packet
    /// forwarded during the check cannot slip past it. A node that has just
    /// taken a word resets its count and is not idle until it has read an
    /// empty mailbox `idle_threshold` more times.
    pub fn is_idle(&self) -> bool {
        Mailbox::all_idle(&self.mailboxes, self.idle_threshold)
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        for mailbox in &self.mailboxes {
            mailbox.close();
        }
    }

    /// Stop every node, wait for the threads, and report the first fault.
    ///
    /// A node stuck in a loop that never reads input or produces output
    /// cannot be interrupted, and joining it blocks.
    pub fn shutdown(mut self) -> Result<(), RuntimeError> {
        self.join()
    }

    fn join(&mut self) -> Result<(), RuntimeError> {
        self.stop();
        let mut result = Ok(());
        for handle in std::mem::take(&mut self.handles) {
            // A panicked node thread has no runtime error to report.
            if let Ok(Err(err)) = handle.join() {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        let _ = self.join();
    }
}

/// Everything a node thread needs to route its packets.
struct Link {
    node: usize,
    mailboxes: Vec<Mailbox>,
    external: Sender<Packet>,
    stop: Arc<AtomicBool>,
    arity: usize,
}

impl Link {
    fn drive(self, mut vm: Vm) -> Result<(), RuntimeError> {
        let mut packet = Vec::with_capacity(self.arity);
        loop {
            match vm.run()? {
                State::Output => packet.extend(vm.take_output()),
                // Halted, or the mailbox was closed under a waiting reader.
                _ => return Ok(()),
            }
            if packet.len() == self.arity {
                let mut words = std::mem::take(&mut packet).into_iter();
                if let Some(dest) = words.next() {
                    self.route(dest, words.collect());
                }
            }
            if self.stop.load(Ordering::Acquire) {
                return Ok(());
            }
        }
    }

    fn route(&self, dest: Word, payload: Vec<Word>) {
        let inside = dest.to_usize().and_then(|d| self.mailboxes.get(d));
        match inside {
            Some(mailbox) => mailbox.push_all(payload),
            None => {
                // The supervisor may have gone away; the packet is dropped then.
                let _ = self.external.send(Packet {
                    from: self.node,
                    dest,
                    payload,
                });
            }
        }
    }
}
