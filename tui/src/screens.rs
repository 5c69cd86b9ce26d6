//! One renderer per screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use lico_engine::{AddOption, AddProductState, App, DetailState, InputMode, ListsState, NewListState};
use lico_types::ShoppingItem;

use crate::format::truncate_with_ellipsis;
use crate::theme::{Glyphs, Palette, progress_bar, styles};
use crate::{draw_field, scroll_offset};

const CARD_ROWS: usize = 3;
const PROGRESS_WIDTH: usize = 20;

fn draw_empty(frame: &mut Frame, area: Rect, palette: &Palette, headline: &str, detail: &str) {
    let top = area.height.saturating_sub(2) / 3;
    let mut lines = vec![Line::from(""); top as usize];
    lines.push(Line::from(Span::styled(
        headline.to_string(),
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        detail.to_string(),
        Style::default().fg(palette.text_muted),
    )));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

pub(crate) fn draw_lists(
    frame: &mut Frame,
    app: &App,
    state: &ListsState,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let lists = app.lists();
    if lists.is_empty() {
        draw_empty(
            frame,
            area,
            palette,
            "No tienes listas todavía",
            "Pulsa el botón para crear tu primera lista",
        );
        return;
    }

    let visible_cards = (area.height as usize / CARD_ROWS).max(1);
    let offset = scroll_offset(state.selected, visible_cards, lists.len());
    let name_width = (area.width as usize).saturating_sub(4);

    let mut lines = Vec::with_capacity(visible_cards * CARD_ROWS);
    for (index, list) in lists.iter().enumerate().skip(offset).take(visible_cards) {
        let selected = index == state.selected;
        let progress = list.progress();
        let marker = if selected { glyphs.selected } else { " " };
        let name_style = if selected {
            styles::selected_row(palette)
        } else {
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD)
        };
        let bar_color = if progress.total > 0 && progress.purchased == progress.total {
            palette.success
        } else {
            palette.accent
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker} "), Style::default().fg(palette.accent)),
            Span::styled(
                truncate_with_ellipsis(&list.name.to_uppercase(), name_width),
                name_style,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                progress_bar(progress.ratio(), PROGRESS_WIDTH, glyphs),
                Style::default().fg(bar_color),
            ),
            Span::styled(
                format!(" {} / {}", progress.purchased, progress.total),
                Style::default().fg(palette.text_secondary),
            ),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

pub(crate) fn draw_new_list(
    frame: &mut Frame,
    app: &App,
    state: &NewListState,
    area: Rect,
    palette: &Palette,
) {
    let [field, _] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    let focused = app.input_mode() == InputMode::Insert;
    draw_field(frame, field, "Nombre", &state.name, focused, palette);
}

/// `left` followed by `right` flush against the right edge of `width` columns.
fn spread(left: String, right: String, width: usize, style: Style, right_style: Style) -> Line<'static> {
    let gap = width.saturating_sub(left.width() + right.width()).max(1);
    Line::from(vec![
        Span::styled(left, style),
        Span::styled(" ".repeat(gap), style),
        Span::styled(right, right_style),
    ])
}

fn item_line(
    item: &ShoppingItem,
    selected: bool,
    width: usize,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    let marker = if selected { glyphs.selected } else { " " };
    let check = if item.is_purchased {
        glyphs.checked
    } else {
        glyphs.unchecked
    };
    let amount = item.amount_label();
    let name_width = width.saturating_sub(amount.width() + check.width() + 5);
    let left = format!(
        "{marker} {check} {}",
        truncate_with_ellipsis(&item.name, name_width)
    );

    let mut style = if item.is_purchased {
        styles::purchased(palette)
    } else {
        Style::default().fg(palette.text_primary)
    };
    let mut amount_style = Style::default().fg(palette.text_secondary);
    if selected {
        style = style.bg(palette.bg_highlight).add_modifier(Modifier::BOLD);
        amount_style = amount_style.bg(palette.bg_highlight);
    }
    spread(left, amount, width, style, amount_style)
}

pub(crate) fn draw_detail(
    frame: &mut Frame,
    app: &App,
    state: &DetailState,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut body = area;
    if let Some(search) = &state.search {
        let [field, rest] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
        let focused = app.input_mode() == InputMode::Insert;
        let label = format!("{} Buscar", glyphs.search);
        draw_field(frame, field, &label, search, focused, palette);
        body = rest;
    }

    let (Some(list), Some(view)) = (app.list(state.list_id), app.detail_view()) else {
        return;
    };
    if list.items.is_empty() {
        draw_empty(
            frame,
            body,
            palette,
            "La lista está vacía",
            "Pulsa a para añadir productos",
        );
        return;
    }

    let width = body.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    let mut row = 0;

    for item in &view.pending {
        let selected = row == state.selected;
        if selected {
            selected_line = lines.len();
        }
        lines.push(item_line(item, selected, width, palette, glyphs));
        row += 1;
    }

    if view.has_no_results && !state.search_text().trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                "No se encontraron productos",
                Style::default().fg(palette.text_muted),
            ))
            .alignment(Alignment::Center),
        );
    }

    if !view.purchased.is_empty() {
        let fold = if state.show_purchased {
            glyphs.expanded
        } else {
            glyphs.collapsed
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{fold} ({}) Mostrar productos comprados",
                view.purchased.len()
            ),
            Style::default().fg(palette.accent),
        )));
        if state.show_purchased {
            for item in &view.purchased {
                let selected = row == state.selected;
                if selected {
                    selected_line = lines.len();
                }
                lines.push(item_line(item, selected, width, palette, glyphs));
                row += 1;
            }
        }
    }

    let offset = scroll_offset(selected_line, body.height as usize, lines.len());
    frame.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), body);
}

fn option_line(
    option: &AddOption,
    state: &AddProductState,
    cursor: bool,
    width: usize,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    let marker = if cursor { glyphs.selected } else { " " };
    let check = if state.is_selected(option) {
        glyphs.checked
    } else {
        glyphs.unchecked
    };
    let (label, detail) = match option {
        AddOption::Quick(_) => (option.label(), String::new()),
        AddOption::Literal(_) => (format!("{} {}", glyphs.add, option.label()), String::new()),
        AddOption::Product(product) => (
            option.label(),
            product.category.clone().unwrap_or_default(),
        ),
    };
    let detail_width = detail.width();
    let left = format!(
        "{marker} {check} {}",
        truncate_with_ellipsis(&label, width.saturating_sub(detail_width + 6))
    );

    let mut style = match option {
        AddOption::Product(_) => Style::default().fg(palette.text_primary),
        AddOption::Quick(_) | AddOption::Literal(_) => Style::default().fg(palette.accent),
    };
    let mut detail_style = Style::default().fg(palette.text_muted);
    if cursor {
        style = style.bg(palette.bg_highlight).add_modifier(Modifier::BOLD);
        detail_style = detail_style.bg(palette.bg_highlight);
    }
    spread(left, detail, width, style, detail_style)
}

pub(crate) fn draw_add_product(
    frame: &mut Frame,
    app: &App,
    state: &AddProductState,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let [field, heading, options_area, summary] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let focused = app.input_mode() == InputMode::Insert && app.modal().is_none();
    let label = format!("{} Producto", glyphs.search);
    draw_field(frame, field, &label, &state.query, focused, palette);

    let blank_query = state.query.text().trim().is_empty();
    let heading_text = if blank_query {
        "Sugerencias rápidas"
    } else if app.is_looking_up() {
        "Buscando..."
    } else {
        "Resultados"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(heading_text, styles::title(palette)))),
        heading,
    );

    let options = app.add_options();
    let width = options_area.width as usize;
    let mut lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            option_line(option, state, index == state.cursor, width, palette, glyphs)
        })
        .collect();
    if !blank_query && app.suggestions().is_empty() && !app.is_looking_up() {
        lines.push(Line::from(Span::styled(
            "  No se encontraron productos",
            Style::default().fg(palette.text_muted),
        )));
    }
    let offset = scroll_offset(state.cursor, options_area.height as usize, lines.len());
    frame.render_widget(
        Paragraph::new(lines).scroll((offset as u16, 0)),
        options_area,
    );

    let names = state.selected_item_names();
    let summary_text = if names.is_empty() {
        "Selección: ninguna".to_string()
    } else {
        format!("Selección ({}): {}", names.len(), names.join(", "))
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            truncate_with_ellipsis(&summary_text, summary.width as usize),
            Style::default().fg(palette.text_secondary),
        ))),
        summary,
    );
}
