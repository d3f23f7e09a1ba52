//! Lifecycle of one floating window and its optional border window.
//!
//! Every mutating operation has a `*_notifier` form that only computes the
//! layout and returns a [`Notifier`]; the plain form runs it immediately as
//! its own batch. Window ids and the stored cursor are written into the
//! shared [`WindowHandle`] while the batch executes; an aborted batch puts
//! the handle back the way it was.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::decorator::{BorderRender, render_border_data};
use super::{
    BufferHook, CreateOptions, Mode, OpenOptions, WinConfig, WinConfigs, WindowHandle,
    WindowHook, WindowState,
};
use crate::constants::BORDER_FILETYPE;
use crate::error::{FloatError, Result};
use crate::events::{EditorEvent, EventBus, SubscriptionId};
use crate::host::{BufferId, BufferOption, Host, NamespaceId, WindowId, WindowOption};
use crate::layout::{CursorAnchor, LayoutContext, Position};
use crate::notifier::Notifier;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Fresh windows; anything shown before was closed earlier in the batch.
    Open,
    /// Reuse windows that are still shown, reopen the rest.
    Resume,
    /// Move the recorded windows.
    Resize,
}

/// Everything one placement writes, computed before the batch runs.
#[derive(Debug)]
struct Layout {
    main: WinConfig,
    main_options: Vec<WindowOption>,
    main_hook: Option<WindowHook>,
    focus: bool,
    border: Option<WinConfig>,
    border_options: Vec<WindowOption>,
    border_hook: Option<WindowHook>,
    render: Option<(BufferId, BorderRender)>,
    cursor: Option<Position>,
}

#[derive(Debug)]
pub struct FloatingWindow {
    handle: Rc<RefCell<WindowHandle>>,
    runtime: Rc<Runtime>,
    mode: Mode,
    create_options: CreateOptions,
    subscription: SubscriptionId,
}

impl FloatingWindow {
    /// Allocate the buffers and apply the mode's buffer settings. Border
    /// buffers always get the [`Mode::Show`] settings.
    pub fn create(
        host: &mut dyn Host,
        bus: &mut EventBus,
        runtime: Rc<Runtime>,
        options: CreateOptions,
    ) -> Result<Self> {
        let buffer = host.create_buffer(&options.name)?;
        let border_buffer = if options.has_border_buf {
            Some(host.create_buffer("")?)
        } else {
            None
        };
        tracing::debug!(%buffer, ?border_buffer, mode = ?options.mode, "creating floating window");

        let mut init = buffer_options_notifier(buffer, options.mode.buffer_options());
        init.push(buffer_hook_notifier(options.on_init.clone(), buffer));
        if let Some(border) = border_buffer {
            let mut border_options = vec![BufferOption::FileType(BORDER_FILETYPE.to_owned())];
            if options.border_on_init.is_none() {
                border_options.splice(0..0, Mode::Show.buffer_options());
            }
            init.push(buffer_options_notifier(border, border_options));
            init.push(buffer_hook_notifier(options.border_on_init.clone(), border));
        }
        init.run(host)?;

        let handle = Rc::new(RefCell::new(WindowHandle::new(buffer, border_buffer)));
        let subscription = bus.on(cascade_close_listener(Rc::clone(&handle)));
        Ok(Self {
            handle,
            runtime,
            mode: options.mode,
            create_options: options,
            subscription,
        })
    }

    pub fn buffer(&self) -> BufferId {
        self.handle.borrow().buffer
    }

    pub fn border_buffer(&self) -> Option<BufferId> {
        self.handle.borrow().border_buffer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn create_options(&self) -> &CreateOptions {
        &self.create_options
    }

    pub fn handle(&self) -> Ref<'_, WindowHandle> {
        self.handle.borrow()
    }

    pub(crate) fn shared_handle(&self) -> Rc<RefCell<WindowHandle>> {
        Rc::clone(&self.handle)
    }

    pub fn state(&self) -> WindowState {
        self.handle.borrow().state
    }

    /// Window currently showing the content buffer.
    pub fn win(&self, host: &dyn Host) -> Option<WindowId> {
        host.window_of_buffer(self.buffer())
    }

    pub fn border_win(&self, host: &dyn Host) -> Option<WindowId> {
        self.border_buffer()
            .and_then(|buffer| host.window_of_buffer(buffer))
    }

    pub fn opened(&self, host: &dyn Host) -> bool {
        self.win(host).is_some()
    }

    fn focus(&self, options: &OpenOptions) -> bool {
        options
            .focus
            .or(self.mode.default_focus())
            .unwrap_or(false)
    }

    fn modifiable(&self, options: &OpenOptions) -> bool {
        options
            .modifiable
            .or(self.mode.default_modifiable())
            .unwrap_or(false)
    }

    fn layout(
        &self,
        ctx: &LayoutContext,
        options: &OpenOptions,
        configs: WinConfigs,
        store_cursor: bool,
    ) -> Layout {
        let builder = self.runtime.builder();
        let win_hl = builder.window_highlight(options).map(WindowOption::WinHighlight);
        let with_hl = |mut window_options: Vec<WindowOption>| {
            window_options.extend(win_hl.clone());
            window_options
        };
        let cursor = configs.cursor().filter(|_| store_cursor);
        // A border hook replaces the border's preset window settings.
        let border_preset = if options.border_on_open.is_some() {
            Vec::new()
        } else {
            Mode::Show.window_options()
        };
        let render = |buffer: BufferId, config: &WinConfig| {
            render_border_data(
                ctx,
                builder.border_chars(options),
                Some(builder.border_highlight(options)),
                config.content_size(),
            )
            .map(|render| (buffer, render))
        };

        if options.border_only {
            // The frame takes the content buffer's place.
            let main = configs.border.map(WinConfig::from).unwrap_or(configs.window);
            let render = configs
                .border
                .and_then(|_| render(self.buffer(), &main));
            return Layout {
                main,
                main_options: with_hl(border_preset),
                main_hook: options.border_on_open.clone(),
                focus: false,
                border: None,
                border_options: Vec::new(),
                border_hook: None,
                render,
                cursor,
            };
        }

        let wants_border = ctx.border_enabled || ctx.padding_enabled;
        let border = match (self.border_buffer(), configs.border) {
            (Some(_), Some(border)) if wants_border => Some(WinConfig::from(border)),
            _ => None,
        };
        let render = match (self.border_buffer(), &border) {
            (Some(buffer), Some(config)) => render(buffer, config),
            _ => None,
        };
        Layout {
            main: configs.window,
            main_options: with_hl(self.mode.window_options()),
            main_hook: options.on_open.clone(),
            focus: self.focus(options),
            border,
            border_options: with_hl(border_preset),
            border_hook: options.border_on_open.clone(),
            render,
            cursor,
        }
    }

    fn place_notifier(&self, placement: Placement, layout: Layout) -> Notifier {
        let handle = Rc::clone(&self.handle);
        let namespace = self.runtime.namespace();
        let notifier = Notifier::create(move |host| {
            let (buffer, border_buffer, known_window, known_border) = {
                let h = handle.borrow();
                (h.buffer, h.border_buffer, h.window, h.border_window)
            };

            let mut border_window = None;
            match (border_buffer, &layout.border) {
                (Some(border_buffer), Some(config)) => {
                    let existing = existing_window(&*host, placement, border_buffer, known_border);
                    border_window = Some(show(
                        host,
                        border_buffer,
                        existing,
                        false,
                        config,
                        &layout.border_options,
                        layout.border_hook.as_ref(),
                    )?);
                }
                (Some(border_buffer), None) if placement != Placement::Open => {
                    close_if_shown(host, border_buffer)?;
                }
                _ => {}
            }

            let existing = existing_window(&*host, placement, buffer, known_window);
            let window = show(
                host,
                buffer,
                existing,
                layout.focus,
                &layout.main,
                &layout.main_options,
                layout.main_hook.as_ref(),
            )?;
            {
                let mut h = handle.borrow_mut();
                h.window = Some(window);
                h.border_window = border_window;
                h.state = WindowState::Opened;
                if layout.cursor.is_some() {
                    h.stored_cursor = layout.cursor;
                }
            }
            tracing::debug!(%buffer, %window, ?border_window, ?placement, "placed floating window");

            if let Some((target, render)) = &layout.render {
                write_border(host, *target, render, namespace)?;
            }
            Ok(())
        });
        restore_on_abort(notifier, &self.handle)
    }

    /// Close whatever is shown, then open at a freshly sampled cursor.
    /// Windows with a non-positive width or height are never opened.
    pub fn open_notifier(&self, host: &dyn Host, options: &OpenOptions) -> Result<Notifier> {
        if options.is_degenerate() {
            tracing::debug!(
                buffer = %self.buffer(),
                width = options.width,
                height = options.height,
                "skipping open of empty window"
            );
            return Ok(Notifier::noop());
        }
        let ctx = LayoutContext::from_options(host, options)?;
        let anchor = CursorAnchor::updating(self.handle.borrow().stored_cursor);
        let configs = self.runtime.builder().build(&ctx, options, anchor);
        let layout = self.layout(&ctx, options, configs, true);

        Ok(Notifier::combine([
            self.close_notifier(),
            self.place_notifier(Placement::Open, layout),
            self.set_lines_notifier(options),
            self.filetype_notifier(options),
        ]))
    }

    pub fn open(&self, host: &mut dyn Host, options: &OpenOptions) -> Result<()> {
        self.open_notifier(&*host, options)?.run(host)
    }

    /// Show the window again where it was last placed, reusing windows that
    /// are still open.
    pub fn resume_notifier(&self, host: &dyn Host, options: &OpenOptions) -> Result<Notifier> {
        if options.is_degenerate() {
            return Ok(Notifier::noop());
        }
        let ctx = LayoutContext::from_options(host, options)?;
        let anchor = CursorAnchor::keep(self.handle.borrow().stored_cursor);
        let configs = self.runtime.builder().build(&ctx, options, anchor);
        let layout = self.layout(&ctx, options, configs, true);
        Ok(self.place_notifier(Placement::Resume, layout))
    }

    pub fn resume(&self, host: &mut dyn Host, options: &OpenOptions) -> Result<()> {
        self.resume_notifier(&*host, options)?.run(host)
    }

    /// Recompute the layout against the stored cursor and move the open
    /// windows. Fails with [`FloatError::NotOpened`] when no window was
    /// recorded for this controller.
    pub fn resize_notifier(&self, host: &dyn Host, options: &OpenOptions) -> Result<Notifier> {
        if options.is_degenerate() {
            return Ok(Notifier::noop());
        }
        let (window, stored) = {
            let h = self.handle.borrow();
            (h.window, h.stored_cursor)
        };
        if window.is_none() {
            return Err(FloatError::NotOpened {
                buffer: self.buffer(),
            });
        }
        let ctx = LayoutContext::from_options(host, options)?;
        let configs = self
            .runtime
            .builder()
            .build(&ctx, options, CursorAnchor::keep(stored));
        let layout = self.layout(&ctx, options, configs, false);
        Ok(self.place_notifier(Placement::Resize, layout))
    }

    pub fn resize(&self, host: &mut dyn Host, options: &OpenOptions) -> Result<()> {
        self.resize_notifier(&*host, options)?.run(host)
    }

    /// Close the content and border windows. Buffers are kept.
    pub fn close_notifier(&self) -> Notifier {
        close_handle_notifier(Rc::clone(&self.handle))
    }

    pub fn close(&self, host: &mut dyn Host) -> Result<()> {
        self.close_notifier().run(host)
    }

    /// Write `options.lines` and `options.highlights`. Does nothing unless
    /// lines are given or the buffer is requested modifiable.
    pub fn set_lines_notifier(&self, options: &OpenOptions) -> Notifier {
        if options.lines.is_none() && options.modifiable != Some(true) {
            return Notifier::noop();
        }
        let buffer = self.buffer();
        let namespace = self.runtime.namespace();
        let modifiable = self.modifiable(options);
        let lines = options.lines.clone();
        let highlights = options.highlights.clone();
        Notifier::create(move |host| {
            host.set_buffer_option(buffer, BufferOption::Modifiable(true))?;
            host.set_buffer_option(buffer, BufferOption::ReadOnly(false))?;
            if let Some(lines) = &lines {
                host.set_buffer_lines(buffer, lines)?;
            }
            if !modifiable {
                host.set_buffer_option(buffer, BufferOption::Modifiable(false))?;
                host.set_buffer_option(buffer, BufferOption::ReadOnly(true))?;
            }
            for mut highlight in highlights {
                highlight.namespace.get_or_insert(namespace);
                host.add_highlight(buffer, &highlight)?;
            }
            Ok(())
        })
    }

    pub fn set_lines(&self, host: &mut dyn Host, options: &OpenOptions) -> Result<()> {
        self.set_lines_notifier(options).run(host)
    }

    fn filetype_notifier(&self, options: &OpenOptions) -> Notifier {
        let Some(filetype) = options.filetype.clone() else {
            return Notifier::noop();
        };
        let buffer = self.buffer();
        Notifier::create(move |host| {
            host.set_buffer_option(buffer, BufferOption::FileType(filetype))?;
            Ok(())
        })
    }

    /// Close the windows, drop the event subscription and delete the buffers.
    pub fn dispose(self, host: &mut dyn Host, bus: &mut EventBus) -> Result<()> {
        bus.off(self.subscription);
        self.close(host)?;
        let buffers: Vec<BufferId> = self.handle.borrow().buffers().collect();
        for buffer in buffers {
            if let Err(err) = host.delete_buffer(buffer) {
                tracing::warn!(%buffer, error = %err, "failed to delete buffer on dispose");
            }
        }
        tracing::debug!(buffer = %self.buffer(), "floating window disposed");
        Ok(())
    }
}

pub(crate) fn close_handle_notifier(handle: Rc<RefCell<WindowHandle>>) -> Notifier {
    let closing = Rc::clone(&handle);
    let notifier = Notifier::create(move |host| {
        let buffers: Vec<BufferId> = closing.borrow().buffers().collect();
        for buffer in buffers {
            close_if_shown(host, buffer)?;
        }
        closing.borrow_mut().mark_closed();
        Ok(())
    });
    restore_on_abort(notifier, &handle)
}

/// Put `handle` back to its state at batch start if the batch is aborted.
fn restore_on_abort(notifier: Notifier, handle: &Rc<RefCell<WindowHandle>>) -> Notifier {
    let handle = Rc::clone(handle);
    notifier.on_abort(move || {
        let saved = handle.borrow().clone();
        move || *handle.borrow_mut() = saved
    })
}

fn buffer_options_notifier(buffer: BufferId, options: Vec<BufferOption>) -> Notifier {
    if options.is_empty() {
        return Notifier::noop();
    }
    Notifier::create(move |host| {
        for option in options {
            host.set_buffer_option(buffer, option)?;
        }
        Ok(())
    })
}

fn buffer_hook_notifier(hook: Option<BufferHook>, buffer: BufferId) -> Notifier {
    match hook {
        Some(hook) => Notifier::create(move |host| hook.call(host, buffer)),
        None => Notifier::noop(),
    }
}

/// Closes the border window once the content window has gone away.
fn cascade_close_listener(
    handle: Rc<RefCell<WindowHandle>>,
) -> impl FnMut(&mut dyn Host, &EditorEvent) -> Result<()> + 'static {
    move |host, event| {
        let EditorEvent::BufWinLeave(left) = *event;
        let (buffer, border_buffer) = {
            let h = handle.borrow();
            (h.buffer, h.border_buffer)
        };
        if left != buffer || host.window_of_buffer(buffer).is_some() {
            return Ok(());
        }
        let close = Rc::clone(&handle);
        let notifier = Notifier::create(move |host| {
            if let Some(border_buffer) = border_buffer {
                tracing::debug!(%buffer, %border_buffer, "content window left, closing border");
                close_if_shown(host, border_buffer)?;
            }
            close.borrow_mut().mark_closed();
            Ok(())
        });
        restore_on_abort(notifier, &handle).run(host)
    }
}

fn existing_window(
    host: &dyn Host,
    placement: Placement,
    buffer: BufferId,
    known: Option<WindowId>,
) -> Option<WindowId> {
    match placement {
        Placement::Open => None,
        Placement::Resume => host.window_of_buffer(buffer),
        Placement::Resize => known,
    }
}

/// Move `existing`, or open a new window, apply `window_options` to it and
/// run `hook`.
fn show(
    host: &mut dyn Host,
    buffer: BufferId,
    existing: Option<WindowId>,
    focus: bool,
    config: &WinConfig,
    window_options: &[WindowOption],
    hook: Option<&WindowHook>,
) -> Result<WindowId> {
    if let Some(window) = existing {
        host.set_window_config(window, config)?;
        return Ok(window);
    }
    let window = host.open_window(buffer, focus, config)?;
    for option in window_options {
        host.set_window_option(window, option.clone())?;
    }
    if let Some(hook) = hook {
        hook.call(host, buffer, window)?;
    }
    Ok(window)
}

/// Close the window showing `buffer`, treating an already closed window as
/// success.
fn close_if_shown(host: &mut dyn Host, buffer: BufferId) -> Result<()> {
    if host.window_of_buffer(buffer).is_none() {
        return Ok(());
    }
    match host.close_window_by_buffer(buffer) {
        Ok(()) => Ok(()),
        Err(err) => {
            let err = FloatError::from(err);
            if err.is_already_closed() {
                tracing::debug!(%buffer, error = %err, "window already closed");
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn write_border(
    host: &mut dyn Host,
    buffer: BufferId,
    render: &BorderRender,
    namespace: NamespaceId,
) -> Result<()> {
    host.set_buffer_option(buffer, BufferOption::Modifiable(true))?;
    host.set_buffer_option(buffer, BufferOption::ReadOnly(false))?;
    host.set_buffer_lines(buffer, &render.lines)?;
    host.set_buffer_option(buffer, BufferOption::Modifiable(false))?;
    host.set_buffer_option(buffer, BufferOption::ReadOnly(true))?;
    for highlight in &render.highlights {
        host.add_highlight(buffer, &highlight.clone().with_namespace(namespace))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FloatConfig;
    use crate::host::term::TermHost;
    use crate::layout::ScreenSize;
    use crate::runtime::RuntimeBuilder;
    use crate::window::Relative;

    fn setup() -> (TermHost, EventBus, Rc<Runtime>) {
        let mut host = TermHost::new(ScreenSize::new(30, 80));
        let runtime = RuntimeBuilder::new(FloatConfig::default())
            .initialize(&mut host)
            .unwrap();
        (host, EventBus::new(), runtime)
    }

    #[test]
    fn show_mode_marks_border_buffer() {
        let (mut host, mut bus, runtime) = setup();
        let win = FloatingWindow::create(
            &mut host,
            &mut bus,
            runtime,
            CreateOptions::default().with_mode(Mode::Show),
        )
        .unwrap();
        let border = win.border_buffer().unwrap();
        assert_eq!(
            host.buffer_option(border, "filetype"),
            Some(&BufferOption::FileType(BORDER_FILETYPE.to_owned()))
        );
        assert_eq!(
            host.buffer_option(win.buffer(), "readonly"),
            Some(&BufferOption::ReadOnly(true))
        );
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn degenerate_open_is_a_noop() {
        let (mut host, mut bus, runtime) = setup();
        let win =
            FloatingWindow::create(&mut host, &mut bus, runtime, CreateOptions::default()).unwrap();
        let before = host.stats();
        let notifier = win.open_notifier(&host, &OpenOptions::new(0, 5)).unwrap();
        assert!(notifier.is_noop());
        notifier.run(&mut host).unwrap();
        assert_eq!(host.stats(), before);
        assert_eq!(win.state(), WindowState::Created);
    }

    #[test]
    fn border_window_sits_around_content() {
        let (mut host, mut bus, runtime) = setup();
        let win =
            FloatingWindow::create(&mut host, &mut bus, runtime, CreateOptions::default()).unwrap();
        let options = OpenOptions::new(10, 3)
            .with_position(2, 4)
            .with_border(vec![])
            .with_title("hi")
            .with_lines(["hello"]);
        win.open(&mut host, &options).unwrap();

        let handle = win.handle().clone();
        assert_eq!(handle.state, WindowState::Opened);
        let border_window = handle.border_window.unwrap();
        let WinConfig::Float(border) = host.window_config(border_window).unwrap().clone() else {
            panic!("float dialect expected");
        };
        assert_eq!((border.row, border.col, border.width, border.height), (2, 4, 12, 5));
        let lines = host.buffer_lines(win.border_buffer().unwrap()).unwrap();
        assert_eq!(lines[0], "┌hi────────┐");
        assert_eq!(host.buffer_lines(win.buffer()).unwrap(), &["hello".to_owned()]);
        assert_eq!(handle.stored_cursor, Some(Position::default()));
    }

    #[test]
    fn resize_before_open_is_rejected() {
        let (mut host, mut bus, runtime) = setup();
        let win =
            FloatingWindow::create(&mut host, &mut bus, runtime, CreateOptions::default()).unwrap();
        let err = win
            .resize(&mut host, &OpenOptions::new(4, 4).with_relative(Relative::Cursor))
            .unwrap_err();
        assert!(matches!(err, FloatError::NotOpened { .. }));
    }
}
