//! Deferred host calls.
//!
//! A [`Notifier`] is a queue of host calls that is built eagerly and executed
//! later. Notifiers from many windows can be combined and committed as one
//! batch, so a group of windows is rearranged without intermediate redraws
//! and with one round trip per logical operation.
//!
//! Controller state touched by a step is registered with
//! [`Notifier::on_abort`]; it is captured when the batch begins and put back
//! if the host aborts it, so the host and the controllers never disagree.

use std::fmt;

use crate::error::{FloatError, Result};
use crate::host::Host;

type NotifyFn = Box<dyn FnOnce(&mut dyn Host) -> Result<()>>;
type RestoreFn = Box<dyn FnOnce()>;
type SnapshotFn = Box<dyn FnOnce() -> RestoreFn>;

#[must_use = "a notifier does nothing until it is run"]
pub struct Notifier {
    fns: Vec<NotifyFn>,
    snapshots: Vec<SnapshotFn>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("calls", &self.fns.len())
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::noop()
    }
}

impl Notifier {
    pub fn noop() -> Self {
        Self {
            fns: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn create<F>(notify: F) -> Self
    where
        F: FnOnce(&mut dyn Host) -> Result<()> + 'static,
    {
        Self {
            fns: vec![Box::new(notify)],
            snapshots: Vec::new(),
        }
    }

    /// Register state to put back if the batch running this notifier is
    /// aborted. `snapshot` is called right before the batch begins and returns
    /// the closure that restores what it saw.
    pub fn on_abort<S, R>(mut self, snapshot: S) -> Self
    where
        S: FnOnce() -> R + 'static,
        R: FnOnce() + 'static,
    {
        self.snapshots
            .push(Box::new(move || Box::new(snapshot()) as RestoreFn));
        self
    }

    pub fn is_noop(&self) -> bool {
        self.fns.is_empty()
    }

    /// Number of queued steps.
    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    pub fn concat(mut self, other: Notifier) -> Self {
        self.push(other);
        self
    }

    pub fn push(&mut self, other: Notifier) {
        self.fns.extend(other.fns);
        self.snapshots.extend(other.snapshots);
    }

    pub fn combine<I>(notifiers: I) -> Self
    where
        I: IntoIterator<Item = Notifier>,
    {
        notifiers
            .into_iter()
            .fold(Notifier::noop(), |acc, cur| acc.concat(cur))
    }

    /// Execute the queued calls in order without opening a batch. Stops at the
    /// first failure. Nothing is rolled back.
    pub fn notify(self, host: &mut dyn Host) -> Result<()> {
        run_steps(host, self.fns)
    }

    /// Execute as one atomic batch.
    pub fn run(self, host: &mut dyn Host) -> Result<()> {
        Self::run_all(host, [self])
    }

    /// Combine `notifiers` and execute them as one atomic batch. Either every
    /// call is committed or the batch is aborted, every registered snapshot
    /// is restored and the first error returned. Nothing reaches the host
    /// when all notifiers are no-ops.
    pub fn run_all<I>(host: &mut dyn Host, notifiers: I) -> Result<()>
    where
        I: IntoIterator<Item = Notifier>,
    {
        let Notifier { fns, snapshots } = Notifier::combine(notifiers);
        if fns.is_empty() {
            return Ok(());
        }
        tracing::trace!(calls = fns.len(), snapshots = snapshots.len(), "committing host batch");
        let restores: Vec<RestoreFn> = snapshots.into_iter().map(|snapshot| snapshot()).collect();
        host.begin_batch();
        let result = match run_steps(host, fns) {
            Ok(()) => host.commit_batch().map_err(FloatError::from),
            Err(err) => {
                host.abort_batch();
                Err(err)
            }
        };
        if let Err(err) = &result {
            tracing::warn!(error = %err, restored = restores.len(), "host batch aborted");
            restores.into_iter().rev().for_each(|restore| restore());
        }
        result
    }
}

fn run_steps(host: &mut dyn Host, fns: Vec<NotifyFn>) -> Result<()> {
    for notify in fns {
        notify(host)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::term::TermHost;
    use crate::host::{BufferId, BufferOption, HostError};
    use crate::layout::ScreenSize;

    #[test]
    fn noop_run_touches_nothing() {
        let mut host = TermHost::new(ScreenSize::new(10, 10));
        Notifier::noop().run(&mut host).unwrap();
        Notifier::run_all(&mut host, [Notifier::noop(), Notifier::noop()]).unwrap();
        assert_eq!(host.stats().calls, 0);
        assert_eq!(host.stats().commits, 0);
    }

    #[test]
    fn combined_notifiers_commit_once_in_order() {
        let mut host = TermHost::new(ScreenSize::new(10, 10));
        let buffer = host.create_buffer("").unwrap();
        let first = Notifier::create(move |host| {
            host.set_buffer_lines(buffer, &["one".to_owned()])?;
            Ok(())
        });
        let second = Notifier::create(move |host| {
            host.set_buffer_lines(buffer, &["two".to_owned()])?;
            Ok(())
        });
        let combined = Notifier::combine([first, Notifier::noop(), second]);
        assert_eq!(combined.len(), 2);
        combined.run(&mut host).unwrap();
        assert_eq!(host.buffer_lines(buffer), Some(&["two".to_owned()][..]));
        assert_eq!(host.stats().commits, 1);
    }

    #[test]
    fn failing_step_aborts_the_whole_batch() {
        let mut host = TermHost::new(ScreenSize::new(10, 10));
        let buffer = host.create_buffer("").unwrap();
        let write = Notifier::create(move |host| {
            host.set_buffer_lines(buffer, &["kept?".to_owned()])?;
            Ok(())
        });
        let fail = Notifier::create(|host| {
            host.set_buffer_option(BufferId(999), BufferOption::Modifiable(true))?;
            Ok(())
        });
        let err = Notifier::run_all(&mut host, [write, fail]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::FloatError::Host(HostError::BufferNotFound(BufferId(999)))
        ));
        assert_eq!(host.buffer_lines(buffer), Some(&[][..]));
        assert_eq!(host.stats().commits, 0);
    }

    #[test]
    fn aborted_batch_restores_snapshots() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut host = TermHost::new(ScreenSize::new(10, 10));
        let counter = Rc::new(Cell::new(1));
        let bump = |counter: &Rc<Cell<i32>>| {
            let step = Rc::clone(counter);
            let saved = Rc::clone(counter);
            Notifier::create(move |_| {
                step.set(step.get() + 1);
                Ok(())
            })
            .on_abort(move || {
                let value = saved.get();
                move || saved.set(value)
            })
        };
        let fail = Notifier::create(|host| {
            host.set_buffer_option(BufferId(999), BufferOption::Wrap(false))?;
            Ok(())
        });

        Notifier::run_all(&mut host, [bump(&counter), bump(&counter), fail]).unwrap_err();
        assert_eq!(counter.get(), 1);

        Notifier::run_all(&mut host, [bump(&counter), bump(&counter)]).unwrap();
        assert_eq!(counter.get(), 3);
    }
}
