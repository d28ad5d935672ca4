//! Demo application state and event loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::time::Instant;

use crate::config::EngineConfig;
use crate::error::NavResult;
use crate::factory::FactoryRegistry;
use crate::stack::StackEngine;
use crate::terminal::TerminalSession;
use crate::traits::StackChange;

use super::pages::{ColorFactory, Swatch};
use super::store::StackStore;
use super::view::{PanelView, TuiContainer};

const HELP: &str =
    "r/g/b push  ⌫ pop  h first  x replace↑  R reset  n/m nested  space touch  q quit";

/// Owns the root engine and its container.
pub struct DemoApp {
    engine: StackEngine,
    container: Rc<RefCell<TuiContainer>>,
    quit: Rc<Cell<bool>>,
    last_change: Rc<Cell<Option<StackChange>>>,
    store: StackStore,
    status: String,
    needs_redraw: bool,
}

impl DemoApp {
    pub fn new(config: EngineConfig, store: StackStore) -> Self {
        let mut registry = FactoryRegistry::new();
        registry.register::<ColorFactory>();

        let container = TuiContainer::shared();
        let quit = Rc::new(Cell::new(false));
        let last_change = Rc::new(Cell::new(None));

        let delegate_quit = Rc::clone(&quit);
        let mut engine = StackEngine::new(container.clone())
            .with_config(config)
            .with_registry(registry)
            .with_delegate(move || {
                tracing::info!("root stack would become empty, quitting");
                delegate_quit.set(true);
            });

        let observed = Rc::clone(&last_change);
        engine.add_observer(move |change: &StackChange| observed.set(Some(*change)));

        Self {
            engine,
            container,
            quit,
            last_change,
            store,
            status: String::from("ready"),
            needs_redraw: true,
        }
    }

    /// Restore the saved stack, or start from a Red page, then bring the
    /// host up.
    pub fn launch(&mut self, fresh: bool) -> NavResult<()> {
        let saved = if fresh {
            None
        } else {
            match self.store.load() {
                Ok(saved) => saved,
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable saved stack");
                    None
                }
            }
        };

        match saved.filter(|s| !s.is_empty()) {
            Some(saved) => {
                let size = saved.len();
                self.engine.restore_state(saved)?;
                self.status = format!("restored {size} pages");
            }
            None => {
                self.push(Swatch::Red)?;
            }
        }

        self.engine.on_start();
        self.engine.on_resume();
        Ok(())
    }

    pub fn engine(&self) -> &StackEngine {
        &self.engine
    }

    pub fn should_quit(&self) -> bool {
        self.quit.get()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn push(&mut self, swatch: Swatch) -> NavResult<()> {
        self.engine
            .push_boxed(Box::new(ColorFactory::new(swatch)), Some(swatch.transition()))
            .map(drop)
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.needs_redraw = true;
        let result = match key.code {
            KeyCode::Char('q') => {
                self.quit.set(true);
                Ok(())
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit.set(true);
                Ok(())
            }
            KeyCode::Char('r') => self.push(Swatch::Red),
            KeyCode::Char('g') => self.push(Swatch::Green),
            KeyCode::Char('b') => self.push(Swatch::Blue),
            KeyCode::Backspace | KeyCode::Esc => self.engine.pop().map(drop),
            KeyCode::Char('h') => self.engine.go_to_first(),
            KeyCode::Char('x') => {
                let green = Swatch::Green;
                self.engine
                    .replace_except_first_boxed(Box::new(ColorFactory::new(green)), Some(green.transition()))
                    .map(drop)
            }
            KeyCode::Char('R') => {
                let red = Swatch::Red;
                self.engine
                    .replace_all_boxed(Box::new(ColorFactory::new(red)), Some(red.transition()))
                    .map(drop)
            }
            KeyCode::Char('n') => self.with_nested(|nested| {
                let red = Swatch::Red;
                nested
                    .push_boxed(Box::new(ColorFactory::new(red)), Some(red.transition()))
                    .map(drop)
            }),
            KeyCode::Char('m') => self.with_nested(|nested| nested.pop().map(drop)),
            KeyCode::Char(' ') => {
                self.touch_top();
                Ok(())
            }
            _ => {
                self.needs_redraw = false;
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                if let Some(change) = self.last_change.get() {
                    self.status = format!("{} pages", change.size);
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, code = err.error_code(), "key ignored");
                self.status = err.to_string();
            }
        }
    }

    fn with_nested<F>(&mut self, op: F) -> NavResult<()>
    where
        F: FnOnce(&mut StackEngine) -> NavResult<()>,
    {
        let top = self.engine.peek_top()?;
        let mut page = top.borrow_mut();
        match page.core_mut().nested_mut() {
            Some(nested) => op(nested),
            None => {
                self.status = String::from("top page has no nested stack");
                Ok(())
            }
        }
    }

    fn touch_top(&mut self) {
        let Ok(top) = self.engine.peek_top() else {
            return;
        };
        let page = top.borrow();
        if let Ok(view) = page.core().view() {
            if let Some(panel) = view.borrow().as_any().downcast_ref::<PanelView>() {
                let touches = panel.touch();
                self.status = format!("touched {touches} times");
            }
        }
    }

    /// One frame: advance the engine and decide whether to redraw.
    pub fn tick(&mut self) {
        if !self.engine.tick() {
            self.needs_redraw = true;
        }
        if self.container.borrow().is_animating(Instant::now()) {
            self.needs_redraw = true;
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        self.container.borrow().render(frame, body, Instant::now());

        let back = if self.engine.size() > 1 { "◀ " } else { "" };
        let footer_line = Line::from(format!("{back}{}  |  {HELP}", self.status))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(Paragraph::new(footer_line), footer);
    }

    /// Save the stack and tear the host down.
    pub fn shutdown(&mut self) -> Result<()> {
        let saved = self.engine.save_state()?;
        self.store.save(&saved)?;

        self.engine.on_pause();
        self.engine.on_stop();
        self.engine.on_destroy();
        Ok(())
    }
}

/// Drive the app until it asks to quit.
pub async fn run(session: &mut TerminalSession, app: &mut DemoApp) -> Result<()> {
    let mut events = EventStream::new();
    let frame = app.engine().config().frame_interval();

    while !app.should_quit() {
        if app.needs_redraw {
            session.terminal().draw(|f| app.render(f))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            _ = tokio::time::sleep(frame) => app.tick(),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
        }
    }
    Ok(())
}
