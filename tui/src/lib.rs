//! TUI rendering for Lico using ratatui.

mod dialogs;
mod format;
mod input;
mod screens;
mod theme;

pub use input::{InputPump, apply_event, handle_events, handle_key};
pub use theme::{Glyphs, Palette, glyphs, palette, progress_bar, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lico_engine::{App, DraftInput, InputMode, Modal, Screen, StatusKind};

use self::format::{field_window, truncate_with_ellipsis};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Screen body
            Constraint::Length(1), // Key hints
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], &palette);
    match app.screen() {
        Screen::Lists(state) => screens::draw_lists(frame, app, state, chunks[1], &palette, &glyphs),
        Screen::NewList(state) => screens::draw_new_list(frame, app, state, chunks[1], &palette),
        Screen::Detail(state) => {
            screens::draw_detail(frame, app, state, chunks[1], &palette, &glyphs);
        }
        Screen::AddProduct(state) => {
            screens::draw_add_product(frame, app, state, chunks[1], &palette, &glyphs);
        }
    }
    draw_hints(frame, app, chunks[2], &palette);
    draw_status_bar(frame, app, chunks[3], &palette);

    if let Some(modal) = app.modal() {
        dialogs::draw_modal(frame, app, modal, &palette, &glyphs);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = match app.screen() {
        Screen::Detail(state) => app
            .list(state.list_id)
            .map_or_else(|| "Lista".to_string(), |list| list.name.to_uppercase()),
        Screen::AddProduct(state) => match app.list(state.list_id) {
            Some(list) => format!("Añadir producto · {}", list.name),
            None => "Añadir producto".to_string(),
        },
        screen => screen.title().to_string(),
    };
    let title = truncate_with_ellipsis(&title, area.width.saturating_sub(12) as usize);

    let (mode_text, mode_style) = match app.input_mode() {
        InputMode::Normal => (" NORMAL ", styles::mode_normal(palette)),
        InputMode::Insert => (" INSERTAR ", styles::mode_insert(palette)),
        InputMode::Modal => (" DIÁLOGO ", styles::mode_modal(palette)),
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(10)])
        .split(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(title, styles::title(palette)))),
        halves[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(mode_text, mode_style))).alignment(Alignment::Right),
        halves[1],
    );
}

fn key_hints(app: &App) -> &'static [(&'static str, &'static str)] {
    if let Some(modal) = app.modal() {
        return match modal {
            Modal::ListName(_) => &[("Enter", "guardar"), ("Esc", "cancelar")],
            Modal::ItemForm(_) => &[("Tab", "campo"), ("Enter", "guardar"), ("Esc", "cancelar")],
            Modal::ConfirmDeleteList { .. } | Modal::ConfirmDeleteItem { .. } => {
                &[("Enter", "eliminar"), ("Esc", "cancelar")]
            }
            _ => &[("↑↓", "elegir"), ("Enter", "aceptar"), ("Esc", "cancelar")],
        };
    }
    match (app.screen(), app.input_mode()) {
        (Screen::Lists(_), _) => &[
            ("Enter", "abrir"),
            ("n", "nueva"),
            ("m", "acciones"),
            ("s", "compartir"),
            ("q", "salir"),
        ],
        (Screen::NewList(_), _) => &[("Enter", "crear"), ("Esc", "volver")],
        (Screen::Detail(_), InputMode::Insert) => &[("Enter", "listo"), ("Esc", "salir")],
        (Screen::Detail(_), _) => &[
            ("Espacio", "marcar"),
            ("a", "añadir"),
            ("n", "manual"),
            ("/", "buscar"),
            ("o", "ordenar"),
            ("p", "comprados"),
            ("Esc", "volver"),
        ],
        (Screen::AddProduct(_), InputMode::Insert) => &[
            ("↑↓", "mover"),
            ("Enter", "seleccionar"),
            ("Ctrl+S", "añadir"),
            ("Esc", "volver"),
        ],
        (Screen::AddProduct(_), _) => &[
            ("Espacio", "seleccionar"),
            ("/", "buscar"),
            ("s", "añadir"),
            ("Esc", "volver"),
        ],
    }
}

fn draw_hints(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut spans = Vec::new();
    for (key, label) in key_hints(app) {
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {label}  "), styles::key_hint(palette)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let Some(status) = app.status() else {
        return;
    };
    let color = match status.kind {
        StatusKind::Error => palette.error,
        StatusKind::Warning => palette.warning,
        StatusKind::Info => palette.text_secondary,
    };
    let text = truncate_with_ellipsis(&status.text, area.width.saturating_sub(1) as usize);
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(text, Style::default().fg(color)),
    ]));
    frame.render_widget(status, area);
}

/// Bordered single-line text field. Places the terminal cursor when `focused`.
fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    draft: &DraftInput,
    focused: bool,
    palette: &Palette,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_col) = field_window(draft, inner_width);
    let border = if focused {
        Style::default().fg(palette.primary)
    } else {
        Style::default().fg(palette.bg_border)
    };
    let label_style = if focused {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let field = Paragraph::new(Line::from(Span::styled(
        visible,
        Style::default().fg(palette.text_primary),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Span::styled(format!(" {label} "), label_style)),
    );
    frame.render_widget(field, area);

    if focused {
        let x = area.x.saturating_add(1).saturating_add(cursor_col);
        let y = area.y.saturating_add(1);
        frame.set_cursor_position((x, y));
    }
}

/// Rect of at most `width` x `height`, centered in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// First row of a `rows`-tall window over `total` rows that keeps `selected` visible.
fn scroll_offset(selected: usize, rows: usize, total: usize) -> usize {
    if rows == 0 || total <= rows {
        return 0;
    }
    selected
        .saturating_sub(rows.saturating_sub(1))
        .min(total - rows)
}
