//! Two-phase startup.
//!
//! Setup work is registered on a [`RuntimeBuilder`] first and only executed by
//! [`RuntimeBuilder::initialize`], once a host is available. The resulting
//! [`Runtime`] is shared by every controller through an `Rc`.

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use crate::config::FloatConfig;
use crate::error::Result;
use crate::host::{Host, NamespaceId};
use crate::notifier::Notifier;
use crate::window::ConfigBuilder;

/// Run `f` and log how long it took.
pub fn measure<T>(description: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let value = f();
    tracing::debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "[measure] {description}"
    );
    value
}

/// Shared state produced by initialization.
pub struct Runtime {
    config: FloatConfig,
    namespace: NamespaceId,
    builder: Rc<dyn ConfigBuilder>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("backend", &self.config.backend)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Runtime {
    pub fn config(&self) -> &FloatConfig {
        &self.config
    }

    /// Namespace every highlight added by controllers is placed in.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    pub fn builder(&self) -> &dyn ConfigBuilder {
        self.builder.as_ref()
    }
}

type InitStep = Box<dyn FnOnce(&mut dyn Host, &Runtime) -> Result<()>>;

pub struct RuntimeBuilder {
    config: FloatConfig,
    steps: Vec<(String, InitStep)>,
}

impl fmt::Debug for RuntimeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<&str> = self.steps.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("RuntimeBuilder")
            .field("config", &self.config)
            .field("steps", &steps)
            .finish()
    }
}

impl RuntimeBuilder {
    /// Builder with the default steps registered: linking the inactive
    /// window highlight to the active one.
    pub fn new(config: FloatConfig) -> Self {
        let builder = Self {
            config,
            steps: Vec::new(),
        };
        builder.register("link highlight groups", |host, runtime| {
            let config = runtime.config();
            host.link_highlight(&config.win_hl_nc, &config.win_hl)?;
            Ok(())
        })
    }

    /// Queue `step` to run during [`RuntimeBuilder::initialize`], after every
    /// step registered before it.
    pub fn register<F>(mut self, description: impl Into<String>, step: F) -> Self
    where
        F: FnOnce(&mut dyn Host, &Runtime) -> Result<()> + 'static,
    {
        self.steps.push((description.into(), Box::new(step)));
        self
    }

    pub fn pending(&self) -> usize {
        self.steps.len()
    }

    /// Create the namespace, select the placement dialect and run the
    /// registered steps in order as one batch.
    pub fn initialize(self, host: &mut dyn Host) -> Result<Rc<Runtime>> {
        let RuntimeBuilder { config, steps } = self;
        let namespace = measure("create namespace", || host.create_namespace(&config.namespace))?;
        let builder = config.config_builder();
        tracing::debug!(backend = %config.backend, ?namespace, "runtime configured");
        let runtime = Rc::new(Runtime {
            config,
            namespace,
            builder,
        });

        let notifiers = steps.into_iter().map(|(description, step)| {
            let runtime = Rc::clone(&runtime);
            Notifier::create(move |host| measure(&description, || step(host, &runtime)))
        });
        Notifier::run_all(host, notifiers)?;
        Ok(runtime)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::Backend;
    use crate::host::term::TermHost;
    use crate::layout::ScreenSize;

    #[test]
    fn steps_run_in_registration_order() {
        let mut host = TermHost::new(ScreenSize::new(10, 10));
        let order = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&order), Rc::clone(&order));
        let builder = RuntimeBuilder::new(FloatConfig::default())
            .register("first", move |_, _| {
                a.borrow_mut().push("first");
                Ok(())
            })
            .register("second", move |_, _| {
                b.borrow_mut().push("second");
                Ok(())
            });
        assert_eq!(builder.pending(), 3);
        assert!(order.borrow().is_empty());
        let runtime = builder.initialize(&mut host).unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(runtime.builder().backend(), Backend::Float);
        assert_eq!(
            host.highlight_link("FloatWmNormalFloatNC"),
            Some("FloatWmNormalFloat")
        );
    }

    #[test]
    fn failing_step_rolls_back_the_links() {
        let mut host = TermHost::new(ScreenSize::new(10, 10));
        let result = RuntimeBuilder::new(FloatConfig::default())
            .register("fail", |_, _| Err(crate::error::FloatError::Listener("nope".into())))
            .initialize(&mut host);
        assert!(result.is_err());
        assert_eq!(host.highlight_link("FloatWmNormalFloatNC"), None);
    }
}
