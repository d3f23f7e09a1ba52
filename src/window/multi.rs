//! A group of floating windows sharing one frame.
//!
//! The coordinator owns a frame controller, opened with `border_only` around
//! the union of its children, and any number of keyed child controllers.
//! Children are positioned relative to the frame's content box, never
//! relative to the cursor, so the whole group moves as one unit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use super::floating::close_handle_notifier;
use super::{CreateOptions, FloatingWindow, Mode, OpenOptions, Relative, WindowHandle};
use crate::error::{FloatError, Result};
use crate::events::{EditorEvent, EventBus, SubscriptionId};
use crate::host::{BufferId, Environment, Host, WindowId};
use crate::layout::{CursorAnchor, LayoutContext, Position, Size, box_sizes};
use crate::notifier::Notifier;
use crate::runtime::Runtime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCreateOptions<K> {
    /// Name of the frame buffer.
    pub name: String,
    /// Children in creation order.
    pub wins: Vec<(K, CreateOptions)>,
}

impl<K> MultiCreateOptions<K> {
    pub fn new(wins: Vec<(K, CreateOptions)>) -> Self {
        Self {
            name: String::new(),
            wins,
        }
    }
}

/// Open options for a whole group.
///
/// `base` places the frame; its `width` and `height` are ignored in favour of
/// the explicit `width`/`height` fields, which default to the union of the
/// children. Child `top`/`left` are offsets into the frame's content box,
/// after `base.top_offset`/`base.left_offset` have moved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiOpenOptions<K: Eq + Hash> {
    pub base: OpenOptions,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub wins: HashMap<K, OpenOptions>,
}

impl<K: Eq + Hash> MultiOpenOptions<K> {
    pub fn new(base: OpenOptions, wins: HashMap<K, OpenOptions>) -> Self {
        Self {
            base,
            width: None,
            height: None,
            wins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiWindows<K> {
    pub frame: Option<WindowId>,
    pub wins: Vec<(K, Option<WindowId>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Open,
    Resume,
    Resize,
}

impl Action {
    /// Whether the frame's notifier runs before the children's.
    fn frame_first(self) -> bool {
        matches!(self, Action::Open | Action::Resume)
    }

    fn anchor(self, stored: Option<Position>) -> CursorAnchor {
        match self {
            Action::Open => CursorAnchor::updating(stored),
            Action::Resume | Action::Resize => CursorAnchor::keep(stored),
        }
    }

    fn notifier(self, win: &FloatingWindow, host: &dyn Host, options: &OpenOptions) -> Result<Notifier> {
        match self {
            Action::Open => win.open_notifier(host, options),
            Action::Resume => win.resume_notifier(host, options),
            Action::Resize => win.resize_notifier(host, options),
        }
    }
}

/// Bounding size of `wins`: the furthest right and bottom edge of any
/// child's border box, measured from the group's origin.
pub fn size_by_wins_options<'a, E, I>(env: &E, wins: I) -> Result<Size>
where
    E: Environment + ?Sized,
    I: IntoIterator<Item = &'a OpenOptions>,
{
    let mut size = Size::new(0, 0);
    for options in wins {
        let ctx = LayoutContext::from_options(env, options)?;
        let boxes = box_sizes(&ctx, options, CursorAnchor::keep(None));
        size.width = size.width.max(options.left + boxes.border.width);
        size.height = size.height.max(options.top + boxes.border.height);
    }
    Ok(size)
}

#[derive(Debug)]
pub struct MultiFloatingWindow<K> {
    frame: FloatingWindow,
    wins: Vec<(K, FloatingWindow)>,
    subscription: SubscriptionId,
}

impl<K> MultiFloatingWindow<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Create the frame and every child. Neither gets a border buffer; the
    /// frame draws the only border of the group.
    pub fn create(
        host: &mut dyn Host,
        bus: &mut EventBus,
        runtime: Rc<Runtime>,
        options: MultiCreateOptions<K>,
    ) -> Result<Self> {
        let frame_options = CreateOptions {
            name: options.name,
            mode: Mode::Show,
            has_border_buf: false,
            ..CreateOptions::default()
        };
        let frame = FloatingWindow::create(host, bus, Rc::clone(&runtime), frame_options)?;
        let mut wins = Vec::with_capacity(options.wins.len());
        for (key, win_options) in options.wins {
            let win = FloatingWindow::create(
                host,
                bus,
                Rc::clone(&runtime),
                win_options.with_border_buf(false),
            )?;
            wins.push((key, win));
        }

        let handles: Vec<Rc<RefCell<WindowHandle>>> = std::iter::once(&frame)
            .chain(wins.iter().map(|(_, win)| win))
            .map(FloatingWindow::shared_handle)
            .collect();
        let subscription = bus.on(group_close_listener(handles));
        tracing::debug!(frame = %frame.buffer(), children = wins.len(), "created window group");
        Ok(Self {
            frame,
            wins,
            subscription,
        })
    }

    pub fn frame(&self) -> &FloatingWindow {
        &self.frame
    }

    pub fn get(&self, key: &K) -> Option<&FloatingWindow> {
        self.wins
            .iter()
            .find_map(|(k, win)| (k == key).then_some(win))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.wins.iter().map(|(key, _)| key)
    }

    /// Frame buffer first, then children in creation order.
    pub fn buffers(&self) -> Vec<BufferId> {
        std::iter::once(self.frame.buffer())
            .chain(self.wins.iter().map(|(_, win)| win.buffer()))
            .collect()
    }

    fn batch_notifier(
        &self,
        action: Action,
        host: &dyn Host,
        options: &MultiOpenOptions<K>,
    ) -> Result<Notifier> {
        let (width, height) = match (options.width, options.height) {
            (Some(width), Some(height)) => (width, height),
            (width, height) => {
                let size = size_by_wins_options(host, options.wins.values())?;
                (width.unwrap_or(size.width), height.unwrap_or(size.height))
            }
        };
        let mut frame_options = OpenOptions {
            width,
            height,
            border_only: true,
            ..options.base.clone()
        };
        let ctx = LayoutContext::from_options(host, &frame_options)?;
        let stored = self.frame.handle().stored_cursor;
        let content = box_sizes(&ctx, &frame_options, action.anchor(stored)).content;
        // The frame is shifted by the base offsets after anchoring.
        let origin = Position::new(
            content.top + frame_options.top_offset,
            content.left + frame_options.left_offset,
        );
        frame_options.context = Some(ctx);

        let mut children = Vec::with_capacity(self.wins.len());
        for (key, win) in &self.wins {
            let Some(win_options) = options.wins.get(key) else {
                continue;
            };
            let placed = OpenOptions {
                relative: Relative::Editor,
                top: origin.top + win_options.top,
                left: origin.left + win_options.left,
                ..win_options.clone()
            };
            children.push(action.notifier(win, host, &placed)?);
        }
        let frame = action.notifier(&self.frame, host, &frame_options)?;

        tracing::debug!(?action, width, height, children = children.len(), "group batch");
        let children = Notifier::combine(children);
        Ok(if action.frame_first() {
            frame.concat(children)
        } else {
            children.concat(frame)
        })
    }

    pub fn open_notifier(&self, host: &dyn Host, options: &MultiOpenOptions<K>) -> Result<Notifier> {
        self.batch_notifier(Action::Open, host, options)
    }

    pub fn open(&self, host: &mut dyn Host, options: &MultiOpenOptions<K>) -> Result<()> {
        self.open_notifier(&*host, options)?.run(host)
    }

    pub fn resume_notifier(
        &self,
        host: &dyn Host,
        options: &MultiOpenOptions<K>,
    ) -> Result<Notifier> {
        self.batch_notifier(Action::Resume, host, options)
    }

    pub fn resume(&self, host: &mut dyn Host, options: &MultiOpenOptions<K>) -> Result<()> {
        self.resume_notifier(&*host, options)?.run(host)
    }

    pub fn resize_notifier(
        &self,
        host: &dyn Host,
        options: &MultiOpenOptions<K>,
    ) -> Result<Notifier> {
        self.batch_notifier(Action::Resize, host, options)
    }

    pub fn resize(&self, host: &mut dyn Host, options: &MultiOpenOptions<K>) -> Result<()> {
        self.resize_notifier(&*host, options)?.run(host)
    }

    pub fn close_notifier(&self) -> Notifier {
        Notifier::combine(
            std::iter::once(self.frame.close_notifier())
                .chain(self.wins.iter().map(|(_, win)| win.close_notifier())),
        )
    }

    pub fn close(&self, host: &mut dyn Host) -> Result<()> {
        self.close_notifier().run(host)
    }

    pub fn opened(&self, host: &dyn Host) -> bool {
        self.frame.opened(host)
    }

    pub fn windows(&self, host: &dyn Host) -> MultiWindows<K> {
        MultiWindows {
            frame: self.frame.win(host),
            wins: self
                .wins
                .iter()
                .map(|(key, win)| (key.clone(), win.win(host)))
                .collect(),
        }
    }

    /// Drop the group subscription and dispose the frame and every child.
    /// Every controller is disposed even if one fails; the first error is
    /// returned.
    pub fn dispose(self, host: &mut dyn Host, bus: &mut EventBus) -> Result<()> {
        bus.off(self.subscription);
        let mut first_err: Option<FloatError> = None;
        let all = std::iter::once(self.frame).chain(self.wins.into_iter().map(|(_, win)| win));
        for win in all {
            if let Err(err) = win.dispose(host, bus) {
                tracing::warn!(error = %err, "failed to dispose grouped window");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Closes the whole group when any of its buffers leaves its window.
fn group_close_listener(
    handles: Vec<Rc<RefCell<WindowHandle>>>,
) -> impl FnMut(&mut dyn Host, &EditorEvent) -> Result<()> + 'static {
    move |host, event| {
        let EditorEvent::BufWinLeave(left) = *event;
        let buffers: Vec<BufferId> = handles.iter().map(|h| h.borrow().buffer).collect();
        if !buffers.contains(&left) || host.window_of_buffer(left).is_some() {
            return Ok(());
        }
        if buffers.iter().all(|b| host.window_of_buffer(*b).is_none()) {
            return Ok(());
        }
        tracing::debug!(buffer = %left, "grouped window left, closing group");
        Notifier::combine(handles.iter().cloned().map(close_handle_notifier)).run(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ScreenSize;

    struct FixedEnv;

    impl Environment for FixedEnv {
        fn global_cursor_position(&self) -> Position {
            Position::new(0, 0)
        }

        fn screen_size(&self) -> ScreenSize {
            ScreenSize::new(40, 100)
        }
    }

    #[test]
    fn size_covers_every_child_border_box() {
        let wins = [
            OpenOptions::new(10, 2).with_position(0, 0),
            OpenOptions::new(5, 3)
                .with_position(3, 12)
                .with_border(vec![]),
        ];
        let size = size_by_wins_options(&FixedEnv, &wins).unwrap();
        assert_eq!(size, Size::new(12 + 7, 3 + 5));
    }

    #[test]
    fn empty_group_has_no_size() {
        let wins: [OpenOptions; 0] = [];
        let size = size_by_wins_options(&FixedEnv, &wins).unwrap();
        assert_eq!(size, Size::new(0, 0));
    }

    #[test]
    fn frame_goes_first_only_when_opening() {
        assert!(Action::Open.frame_first());
        assert!(Action::Resume.frame_first());
        assert!(!Action::Resize.frame_first());
    }
}
