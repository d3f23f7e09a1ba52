use std::collections::HashMap;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use indoc::indoc;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};

use float_wm::diagnostics::{self, DiagnosticLog};
use float_wm::host::term::TermHost;
use float_wm::layout::{Position, ScreenSize};
use float_wm::theme::Theme;
use float_wm::{
    Backend, CreateOptions, Environment, EventBus, FloatConfig, FloatingWindow, Mode,
    MultiCreateOptions, MultiFloatingWindow, MultiOpenOptions, OpenOptions, Relative,
    RuntimeBuilder, tracing_sub,
};

/// Rows at the bottom of the terminal reserved for the diagnostic log.
const LOG_ROWS: u16 = 4;

const HELP: &str = indoc! {"
    arrows move the cursor, o open, r resume, +/- resize, c close
    x close from outside, m toggle group, q quit
"};

#[derive(Parser, Debug)]
#[command(
    name = "float-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive playground for floating window placement"
)]
struct Cli {
    /// Placement dialect: popup or float.
    #[arg(short, long, default_value_t = Backend::Float)]
    backend: Backend,

    /// center, cursor, cursor-around or editor.
    #[arg(short, long, default_value_t = Relative::CursorAround)]
    relative: Relative,

    #[arg(short = 'W', long, default_value_t = 10)]
    width: i32,

    #[arg(short = 'H', long, default_value_t = 1)]
    height: i32,

    /// Border shorthand, e.g. `1,1,1,0`. Pass the flag alone for all sides.
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    border: Option<Vec<i32>>,

    /// Padding shorthand, e.g. `0,1`. Pass the flag alone for all sides.
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    padding: Option<Vec<i32>>,

    #[arg(short, long, default_value = "test")]
    title: String,
}

impl Cli {
    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new(self.width, self.height)
            .with_relative(self.relative)
            .with_border(self.border.clone().unwrap_or_else(|| vec![1, 1, 1, 0]))
            .with_title(self.title.clone())
            .with_lines(["hello"]);
        options.padding = self.padding.clone();
        options
    }
}

type DemoTerminal = Terminal<CrosstermBackend<Stdout>>;

type GroupKey = &'static str;

struct Demo {
    host: TermHost,
    bus: EventBus,
    win: FloatingWindow,
    group: MultiFloatingWindow<GroupKey>,
    options: OpenOptions,
    log: DiagnosticLog,
    theme: Theme,
}

impl Demo {
    fn new(cli: &Cli, screen: ScreenSize, log: DiagnosticLog) -> float_wm::Result<Self> {
        let mut host = TermHost::new(screen);
        host.set_cursor(Position::new(screen.lines / 2, screen.columns / 2));
        let mut bus = EventBus::new();
        let config = FloatConfig::default().with_backend(cli.backend);
        let runtime = RuntimeBuilder::new(config).initialize(&mut host)?;

        let win = FloatingWindow::create(
            &mut host,
            &mut bus,
            Rc::clone(&runtime),
            CreateOptions::default().with_mode(Mode::Show),
        )?;
        let mut group_options = MultiCreateOptions::new(vec![
            ("left", CreateOptions::default().with_mode(Mode::Show)),
            ("right", CreateOptions::default().with_mode(Mode::Show)),
        ]);
        group_options.name = "group".to_owned();
        let group = MultiFloatingWindow::create(&mut host, &mut bus, runtime, group_options)?;

        Ok(Self {
            host,
            bus,
            win,
            group,
            options: cli.open_options(),
            log,
            theme: Theme::default(),
        })
    }

    fn group_options(&self) -> MultiOpenOptions<GroupKey> {
        let base = OpenOptions::default()
            .with_relative(Relative::Center)
            .with_border(vec![])
            .with_title("group");
        let wins = HashMap::from([
            (
                "left",
                OpenOptions::new(16, 3)
                    .with_position(0, 0)
                    .with_lines(["left", "pane"]),
            ),
            (
                "right",
                OpenOptions::new(16, 3)
                    .with_position(0, 18)
                    .with_lines(["right", "pane"]),
            ),
        ]);
        MultiOpenOptions::new(base, wins)
    }

    /// Moves the cursor and reopens an open window so cursor-relative
    /// placements follow it.
    fn move_cursor(&mut self, rows: i32, cols: i32) -> float_wm::Result<()> {
        let screen = self.host.screen_size();
        let cursor = self.host.global_cursor_position();
        self.host.set_cursor(Position::new(
            (cursor.top + rows).clamp(0, (screen.lines - 1).max(0)),
            (cursor.left + cols).clamp(0, (screen.columns - 1).max(0)),
        ));
        if self.win.opened(&self.host) {
            self.win.open(&mut self.host, &self.options)?;
        }
        Ok(())
    }

    fn grow(&mut self, by: i32) -> float_wm::Result<()> {
        self.options.width = (self.options.width + by).max(1);
        if self.win.opened(&self.host) {
            self.win.resize(&mut self.host, &self.options)?;
        }
        Ok(())
    }

    fn toggle_group(&mut self) -> float_wm::Result<()> {
        if self.group.opened(&self.host) {
            self.group.close(&mut self.host)
        } else {
            let options = self.group_options();
            self.group.open(&mut self.host, &options)
        }
    }

    /// Close the content window behind the controller's back, the way a user
    /// closing it would.
    fn close_externally(&mut self) -> float_wm::Result<()> {
        if let Some(window) = self.win.win(&self.host) {
            self.host.close_window(window)?;
        }
        Ok(())
    }

    /// Returns false when the demo should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let result = match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Char('o') => self.win.open(&mut self.host, &self.options),
            KeyCode::Char('r') => self.win.resume(&mut self.host, &self.options),
            KeyCode::Char('+') => self.grow(2),
            KeyCode::Char('-') => self.grow(-2),
            KeyCode::Char('c') => self.win.close(&mut self.host),
            KeyCode::Char('x') => self.close_externally(),
            KeyCode::Char('m') => self.toggle_group(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, ?code, "action failed");
        }
        let events = self.host.take_events();
        self.bus.fire_all(&mut self.host, events);
        true
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let log_rows = LOG_ROWS.min(area.height);
        let editor = Rect::new(area.x, area.y, area.width, area.height - log_rows);
        let log_area = Rect::new(area.x, editor.bottom(), area.width, log_rows);

        self.host.render(editor, frame.buffer_mut(), &self.theme);
        frame.render_widget(self.log.view(self.theme.style("Comment")), log_area);

        let cursor = self.host.global_cursor_position();
        let x = editor.x.saturating_add(cursor.left.max(0) as u16);
        let y = editor.y.saturating_add(cursor.top.max(0) as u16);
        if x < editor.right() && y < editor.bottom() {
            frame.set_cursor_position((x, y));
        }
    }
}

fn editor_screen(width: u16, height: u16) -> ScreenSize {
    ScreenSize::new(i32::from(height.saturating_sub(LOG_ROWS)), i32::from(width))
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let log = DiagnosticLog::default();
    diagnostics::set_global(log.clone());
    tracing_sub::init_default();

    let (width, height) = terminal::size()?;
    let mut demo = Demo::new(&cli, editor_screen(width, height), log).map_err(io::Error::other)?;
    for line in HELP.lines() {
        diagnostics::log_line(line);
    }

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Show)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut demo);

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    terminal.show_cursor()?;

    result
}

fn run(terminal: &mut DemoTerminal, demo: &mut Demo) -> io::Result<()> {
    loop {
        terminal.draw(|frame| demo.draw(frame))?;
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !demo.handle_key(key.code) {
                    return Ok(());
                }
            }
            Event::Resize(width, height) => demo.host.set_screen(editor_screen(width, height)),
            _ => {}
        }
    }
}
