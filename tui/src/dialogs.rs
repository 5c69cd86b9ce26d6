//! Menus, forms and confirmations drawn over the active screen.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};

use lico_engine::{App, ItemAction, ItemField, ItemForm, ListAction, ListNameForm, Modal};
use lico_types::SortOption;

use crate::format::truncate_with_ellipsis;
use crate::theme::{Glyphs, Palette};
use crate::{centered_rect, draw_field};

const DIALOG_WIDTH: u16 = 50;

pub(crate) fn draw_modal(
    frame: &mut Frame,
    app: &App,
    modal: &Modal,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    match modal {
        Modal::ListActions {
            title, selected, ..
        } => {
            let labels = ListAction::ALL.map(ListAction::label);
            draw_menu(frame, title, &labels, *selected, None, palette, glyphs);
        }
        Modal::ItemActions {
            title, selected, ..
        } => {
            let labels = ItemAction::ALL.map(ItemAction::label);
            draw_menu(frame, title, &labels, *selected, None, palette, glyphs);
        }
        Modal::SortMenu { list_id, selected } => {
            let labels = SortOption::ALL.map(SortOption::label);
            let current = app
                .list(*list_id)
                .and_then(|list| SortOption::ALL.iter().position(|o| *o == list.sort_option));
            draw_menu(frame, "Ordenar", &labels, *selected, current, palette, glyphs);
        }
        Modal::ListName(form) => draw_list_name(frame, form, palette),
        Modal::ItemForm(form) => draw_item_form(frame, form, palette),
        Modal::ConfirmDeleteList { name, .. } => draw_confirm(
            frame,
            "Eliminar lista",
            name,
            "¿Seguro que quieres eliminar esta lista? Esta acción no se puede deshacer.",
            palette,
        ),
        Modal::ConfirmDeleteItem { name, .. } => draw_confirm(
            frame,
            "Eliminar producto",
            name,
            "¿Seguro que quieres eliminar este producto?",
            palette,
        ),
    }
}

fn dialog_block<'a>(title: &str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            format!(" {} ", truncate_with_ellipsis(title, DIALOG_WIDTH as usize - 6)),
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )]))
}

/// Open a dialog frame of `inner_height` rows and return its content area.
fn open_dialog(frame: &mut Frame, title: &str, inner_height: u16, palette: &Palette) -> Rect {
    let area = centered_rect(DIALOG_WIDTH, inner_height.saturating_add(2), frame.area());
    frame.render_widget(Clear, area);
    let block = dialog_block(title, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn draw_menu(
    frame: &mut Frame,
    title: &str,
    labels: &[&str],
    selected: usize,
    current: Option<usize>,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let inner = open_dialog(frame, title, labels.len() as u16, palette);
    let lines: Vec<Line> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let marker = if index == selected { glyphs.selected } else { " " };
            let bullet = if current == Some(index) { glyphs.bullet } else { " " };
            let style = if index == selected {
                Style::default()
                    .fg(palette.text_primary)
                    .bg(palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            Line::from(Span::styled(format!("{marker} {bullet} {label}"), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_list_name(frame: &mut Frame, form: &ListNameForm, palette: &Palette) {
    let inner = open_dialog(frame, form.title(), 3, palette);
    draw_field(frame, inner, "Nombre", &form.name, true, palette);
}

fn draw_item_form(frame: &mut Frame, form: &ItemForm, palette: &Palette) {
    let inner = open_dialog(frame, form.title(), 9, palette);
    let rows = Layout::vertical([Constraint::Length(3); 3]).split(inner);
    for (field, area) in ItemField::ALL.into_iter().zip(rows.iter()) {
        draw_field(
            frame,
            *area,
            field.label(),
            form.field(field),
            form.focus == field,
            palette,
        );
    }
}

fn draw_confirm(frame: &mut Frame, title: &str, name: &str, question: &str, palette: &Palette) {
    let inner = open_dialog(frame, title, 4, palette);
    let lines = vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(name, inner.width as usize),
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            question.to_string(),
            Style::default().fg(palette.warning),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
