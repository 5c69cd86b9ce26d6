//! Input handling for the Lico TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use lico_engine::{App, InputMode, Modal, Screen};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a blocked send in the input thread returns.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Bounded queue: apply backpressure instead of dropping events.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal events into `app`. Returns `true` once the app wants to quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        apply_event(app, ev);
        deliver_share(app);
        if app.should_quit() {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

/// Route one terminal event to the app.
pub fn apply_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Paste(text) => {
            if let Some(token) = app.edit_token() {
                app.text_edit(token).enter_text(&text);
            }
        }
        _ => {}
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if matches!(key.kind, KeyEventKind::Release) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return;
    }

    match app.input_mode() {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Modal => handle_modal_mode(app, key),
    }
}

/// Hand pending share text to the system clipboard.
fn deliver_share(app: &mut App) {
    let Some(text) = app.take_share_text() else {
        return;
    };
    let result = arboard::Clipboard::new()
        .and_then(|mut cb| cb.set_text(text))
        .map_err(|e| e.to_string());
    if result.is_ok() {
        debug!("Copied share text to clipboard");
    }
    app.report_share(result);
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.request_quit();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            return;
        }
        KeyCode::Esc => {
            app.cancel();
            return;
        }
        _ => {}
    }

    match app.screen() {
        Screen::Lists(_) => match key.code {
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_list(),
            KeyCode::Char('n' | 'a') => app.open_new_list(),
            KeyCode::Char('m' | ' ') => app.open_list_actions(),
            KeyCode::Char('r') => app.begin_rename_list(),
            KeyCode::Char('c') => app.begin_copy_list(),
            KeyCode::Char('s') => app.share_selected_list(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete_list(),
            _ => {}
        },
        Screen::NewList(_) => {}
        Screen::Detail(_) => match key.code {
            KeyCode::Char(' ' | 'x') => app.toggle_selected_item(),
            KeyCode::Enter | KeyCode::Char('m') => app.open_item_actions(),
            KeyCode::Char('e') => app.begin_edit_item(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete_item(),
            KeyCode::Char('a') => app.open_add_product(),
            KeyCode::Char('n') => app.begin_add_item(),
            KeyCode::Char('o') => app.open_sort_menu(),
            KeyCode::Char('/') => app.start_search(),
            KeyCode::Char('p') => app.toggle_show_purchased(),
            KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => app.go_back(),
            _ => {}
        },
        Screen::AddProduct(_) => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => app.toggle_option(),
            KeyCode::Char('i' | '/') | KeyCode::Tab => app.focus_query(),
            KeyCode::Char('s') => app.confirm_selection(),
            KeyCode::Backspace | KeyCode::Left => app.go_back(),
            _ => {}
        },
    }
}

fn handle_insert_mode(app: &mut App, key: KeyEvent) {
    let on_add_product = matches!(app.screen(), Screen::AddProduct(_));
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => return app.cancel(),
        KeyCode::Enter => return app.confirm(),
        KeyCode::Char('s') if ctrl && on_add_product => return app.confirm_selection(),
        KeyCode::Tab if on_add_product => return app.focus_options(),
        KeyCode::Down if on_add_product => return app.select_next(),
        KeyCode::Up if on_add_product => return app.select_prev(),
        _ => {}
    }

    edit_text(app, key);
}

fn handle_modal_mode(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.modal() else {
        return;
    };
    let has_text = modal.has_text_field();
    let is_confirmation = matches!(
        modal,
        Modal::ConfirmDeleteList { .. } | Modal::ConfirmDeleteItem { .. }
    );

    match key.code {
        KeyCode::Esc => return app.cancel(),
        KeyCode::Enter => return app.confirm(),
        KeyCode::Down => return app.select_next(),
        KeyCode::Up => return app.select_prev(),
        KeyCode::Tab => return app.focus_next_field(),
        KeyCode::BackTab => return app.focus_prev_field(),
        _ => {}
    }

    if has_text {
        edit_text(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('y' | 's') if is_confirmation => app.confirm(),
        KeyCode::Char('n' | 'q') => app.cancel(),
        _ => {}
    }
}

/// Line-editing keys shared by every text field.
fn edit_text(app: &mut App, key: KeyEvent) {
    let Some(token) = app.edit_token() else {
        return;
    };
    let mut edit = app.text_edit(token);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('w') if ctrl => edit.delete_word_backwards(),
        KeyCode::Char('u') if ctrl => edit.clear_line(),
        KeyCode::Char('a') if ctrl => edit.move_cursor_home(),
        KeyCode::Char('e') if ctrl => edit.move_cursor_end(),
        KeyCode::Char(c) if !ctrl => edit.enter_char(c),
        KeyCode::Backspace => edit.delete_char(),
        KeyCode::Delete => edit.delete_char_forward(),
        KeyCode::Left => edit.move_cursor_left(),
        KeyCode::Right => edit.move_cursor_right(),
        KeyCode::Home => edit.move_cursor_home(),
        KeyCode::End => edit.move_cursor_end(),
        _ => {}
    }
}
