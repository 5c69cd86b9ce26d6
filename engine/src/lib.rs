//! Application state for Lico.
//!
//! [`App`] owns the coordinators ([`ShoppingService`] for lists and items,
//! [`SuggestionCoordinator`] for catalog lookups) and the navigation state:
//! a back stack of [`Screen`]s rooted at the list overview, an optional
//! [`Modal`], the current [`InputMode`] and a one-line status message.
//!
//! The TUI translates key presses into the semantic operations below and
//! renders from the read accessors; nothing here knows about terminals.

mod edit;
mod input;
mod modal;
mod screens;
mod service;
mod suggest;

#[cfg(test)]
mod tests;

pub use edit::{EditToken, TextEdit};
pub use input::{DraftInput, InputMode};
pub use modal::{
    ItemAction, ItemField, ItemForm, ItemFormTarget, ListAction, ListNameForm, Modal, NamePurpose,
};
pub use screens::{AddOption, AddProductState, DetailState, ListsState, NewListState, Screen};
pub use service::{ServiceError, ServiceResult, ShoppingService};
pub use suggest::SuggestionCoordinator;

use std::mem;
use std::time::Instant;

use tokio::sync::watch;

use lico_config::ResolvedConfig;
use lico_store::Catalog;
use lico_types::{
    ItemDraft, ItemId, ListId, ListName, ListView, Product, ShoppingItem, ShoppingList, SortOption,
    UiOptions, capitalize_first,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    service: ShoppingService,
    lists_rx: watch::Receiver<Vec<ShoppingList>>,
    /// Last snapshot received from the service.
    lists: Vec<ShoppingList>,
    suggestions: SuggestionCoordinator,
    quick: Vec<String>,
    default_unit: String,
    ui: UiOptions,
    current: Screen,
    back_stack: Vec<Screen>,
    modal: Option<Modal>,
    mode: InputMode,
    status: Option<StatusMessage>,
    /// Share text waiting for the front end to hand to the clipboard.
    share_outbox: Option<String>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(service: ShoppingService, catalog: Catalog, config: &ResolvedConfig) -> Self {
        let mut lists_rx = service.subscribe();
        let lists = lists_rx.borrow_and_update().clone();
        Self {
            service,
            lists_rx,
            lists,
            suggestions: SuggestionCoordinator::new(catalog, &config.suggestions),
            quick: config.suggestions.quick.clone(),
            default_unit: config.default_unit.clone(),
            ui: config.ui,
            current: Screen::Lists(ListsState::default()),
            back_stack: Vec::new(),
            modal: None,
            mode: InputMode::Normal,
            status: None,
            share_outbox: None,
            should_quit: false,
        }
    }

    // ── Read accessors ──────────────────────────────────────────────────

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.current
    }

    #[must_use]
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    #[must_use]
    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    #[must_use]
    pub fn list(&self, id: ListId) -> Option<&ShoppingList> {
        self.lists.iter().find(|list| list.id == id)
    }

    #[must_use]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui
    }

    #[must_use]
    pub fn default_unit(&self) -> &str {
        &self.default_unit
    }

    #[must_use]
    pub fn quick_suggestions(&self) -> &[String] {
        &self.quick
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Product] {
        self.suggestions.suggestions()
    }

    /// A catalog lookup is waiting for the debounce interval.
    #[must_use]
    pub fn is_looking_up(&self) -> bool {
        self.suggestions.is_pending()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    /// Derived item view for the detail screen.
    #[must_use]
    pub fn detail_view(&self) -> Option<ListView> {
        let state = self.detail_state()?;
        let list = self.list(state.list_id)?;
        Some(ListView::build(list, state.search_text(), state.show_purchased))
    }

    /// Options on the add-product screen, in display order.
    #[must_use]
    pub fn add_options(&self) -> Vec<AddOption> {
        match &self.current {
            Screen::AddProduct(state) => state.options(&self.quick, self.suggestions.suggestions()),
            _ => Vec::new(),
        }
    }

    // ── Status line ─────────────────────────────────────────────────────

    pub fn set_status_info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text.into());
    }

    pub fn set_status_warning(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Warning, text.into());
    }

    pub fn set_status_error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(StatusMessage { kind, text });
    }

    fn report_error(&mut self, context: &str, err: &ServiceError) {
        tracing::warn!("{context}: {err:#}");
        self.set_status_error(format!("{context}: {err}"));
    }

    // ── Frame tick ──────────────────────────────────────────────────────

    /// Pull the latest list snapshot and run any due catalog lookup.
    pub fn tick(&mut self, now: Instant) {
        self.refresh_lists();
        if self.suggestions.poll(now) {
            self.clamp_selection();
        }
    }

    fn refresh_lists(&mut self) {
        if self.lists_rx.has_changed().unwrap_or(false) {
            self.lists = self.lists_rx.borrow_and_update().clone();
            self.clamp_selection();
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────

    fn push_screen(&mut self, screen: Screen, mode: InputMode) {
        let previous = mem::replace(&mut self.current, screen);
        self.back_stack.push(previous);
        self.modal = None;
        self.mode = mode;
    }

    /// Return to the previous screen. The list overview has nowhere to go back to.
    pub fn go_back(&mut self) {
        if let Some(previous) = self.back_stack.pop() {
            self.current = previous;
            self.modal = None;
            self.mode = InputMode::Normal;
            self.clamp_selection();
        }
    }

    fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
        self.mode = InputMode::Modal;
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.mode = InputMode::Normal;
    }

    pub fn select_next(&mut self) {
        self.move_selection(true);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(false);
    }

    fn move_selection(&mut self, forward: bool) {
        if let Some(modal) = self.modal.as_mut() {
            if let Modal::ItemForm(form) = &mut *modal {
                form.focus = if forward {
                    form.focus.next()
                } else {
                    form.focus.prev()
                };
                return;
            }
            let len = modal.menu_len().unwrap_or(0);
            if let Some(selected) = modal.menu_selected_mut() {
                *selected = step(*selected, len, forward);
            }
            return;
        }

        let len = self.selection_len();
        match &mut self.current {
            Screen::Lists(state) => state.selected = step(state.selected, len, forward),
            Screen::Detail(state) => state.selected = step(state.selected, len, forward),
            Screen::AddProduct(state) => state.cursor = step(state.cursor, len, forward),
            Screen::NewList(_) => {}
        }
    }

    /// Move focus between the fields of an item form.
    pub fn focus_next_field(&mut self) {
        if let Some(Modal::ItemForm(form)) = self.modal.as_mut() {
            form.focus = form.focus.next();
        }
    }

    pub fn focus_prev_field(&mut self) {
        if let Some(Modal::ItemForm(form)) = self.modal.as_mut() {
            form.focus = form.focus.prev();
        }
    }

    /// Enter: the primary action of whatever has focus.
    pub fn confirm(&mut self) {
        if self.modal.is_some() {
            self.confirm_modal();
            return;
        }
        match self.current {
            Screen::Lists(_) => self.open_selected_list(),
            Screen::NewList(_) => self.submit_new_list(),
            Screen::Detail(_) if self.mode == InputMode::Insert => self.mode = InputMode::Normal,
            Screen::Detail(_) => self.open_item_actions(),
            Screen::AddProduct(_) => self.toggle_option(),
        }
    }

    /// Escape: close the dialog, leave the text field, clear the search, or go back.
    pub fn cancel(&mut self) {
        if self.modal.is_some() {
            self.close_modal();
            return;
        }
        if self.mode == InputMode::Insert {
            match self.current {
                Screen::NewList(_) => self.go_back(),
                _ => self.mode = InputMode::Normal,
            }
            return;
        }
        if let Screen::Detail(state) = &mut self.current
            && state.search.is_some()
        {
            state.search = None;
            state.selected = 0;
            return;
        }
        self.go_back();
    }

    fn selection_len(&self) -> usize {
        match &self.current {
            Screen::Lists(_) => self.lists.len(),
            Screen::NewList(_) => 0,
            Screen::Detail(state) => self.list(state.list_id).map_or(0, |list| {
                ListView::build(list, state.search_text(), state.show_purchased)
                    .visible(state.show_purchased)
                    .count()
            }),
            Screen::AddProduct(state) => state
                .options(&self.quick, self.suggestions.suggestions())
                .len(),
        }
    }

    fn clamp_selection(&mut self) {
        let max = self.selection_len().saturating_sub(1);
        match &mut self.current {
            Screen::Lists(state) => state.selected = state.selected.min(max),
            Screen::Detail(state) => state.selected = state.selected.min(max),
            Screen::AddProduct(state) => state.cursor = state.cursor.min(max),
            Screen::NewList(_) => {}
        }
    }

    // ── Text fields ─────────────────────────────────────────────────────

    fn has_active_draft(&self) -> bool {
        match self.mode {
            InputMode::Modal => self.modal.as_ref().is_some_and(Modal::has_text_field),
            InputMode::Insert => match &self.current {
                Screen::NewList(_) | Screen::AddProduct(_) => true,
                Screen::Detail(state) => state.search.is_some(),
                Screen::Lists(_) => false,
            },
            InputMode::Normal => false,
        }
    }

    pub(crate) fn active_draft_mut(&mut self) -> Option<&mut DraftInput> {
        match self.mode {
            InputMode::Modal => self.modal.as_mut().and_then(Modal::draft_mut),
            InputMode::Insert => match &mut self.current {
                Screen::NewList(state) => Some(&mut state.name),
                Screen::Detail(state) => state.search.as_mut(),
                Screen::AddProduct(state) => Some(&mut state.query),
                Screen::Lists(_) => None,
            },
            InputMode::Normal => None,
        }
    }

    /// React to a change of the focused text.
    pub(crate) fn after_text_edit(&mut self) {
        if self.mode != InputMode::Insert {
            return;
        }
        match &mut self.current {
            Screen::NewList(state) => state.name.map_text(capitalize_first),
            Screen::Detail(state) => state.selected = 0,
            Screen::AddProduct(state) => {
                state.cursor = 0;
                self.suggestions.set_query(state.query.text(), Instant::now());
            }
            Screen::Lists(_) => {}
        }
    }

    // ── List overview ───────────────────────────────────────────────────

    fn selected_list(&self) -> Option<&ShoppingList> {
        match &self.current {
            Screen::Lists(state) => self.lists.get(state.selected),
            _ => None,
        }
    }

    pub fn open_selected_list(&mut self) {
        if let Some(id) = self.selected_list().map(|list| list.id) {
            self.push_screen(Screen::Detail(DetailState::new(id)), InputMode::Normal);
        }
    }

    pub fn open_new_list(&mut self) {
        self.push_screen(Screen::NewList(NewListState::default()), InputMode::Insert);
    }

    /// Menu with rename / share / copy / delete for the selected list.
    pub fn open_list_actions(&mut self) {
        if let Some(list) = self.selected_list() {
            let modal = Modal::ListActions {
                list_id: list.id,
                title: list.name.clone(),
                selected: 0,
            };
            self.open_modal(modal);
        }
    }

    pub fn begin_rename_list(&mut self) {
        if let Some(id) = self.selected_list().map(|list| list.id) {
            self.open_list_name_form(id, NamePurpose::Rename);
        }
    }

    pub fn begin_copy_list(&mut self) {
        if let Some(id) = self.selected_list().map(|list| list.id) {
            self.open_list_name_form(id, NamePurpose::Copy);
        }
    }

    pub fn share_selected_list(&mut self) {
        if let Some(id) = self.selected_list().map(|list| list.id) {
            self.share_list(id);
        }
    }

    pub fn request_delete_list(&mut self) {
        if let Some(id) = self.selected_list().map(|list| list.id) {
            self.open_confirm_delete_list(id);
        }
    }

    fn open_list_name_form(&mut self, list_id: ListId, purpose: NamePurpose) {
        let Some(list) = self.list(list_id) else {
            return;
        };
        let form = ListNameForm {
            list_id,
            purpose,
            name: DraftInput::with_text(list.name.clone()),
        };
        self.open_modal(Modal::ListName(form));
    }

    fn open_confirm_delete_list(&mut self, list_id: ListId) {
        if let Some(list) = self.list(list_id) {
            let modal = Modal::ConfirmDeleteList {
                list_id,
                name: list.name.clone(),
            };
            self.open_modal(modal);
        }
    }

    fn share_list(&mut self, list_id: ListId) {
        if let Some(list) = self.list(list_id) {
            self.share_outbox = Some(list.share_text());
        }
    }

    /// Share text produced by the last share action, if not yet delivered.
    pub fn take_share_text(&mut self) -> Option<String> {
        self.share_outbox.take()
    }

    /// Outcome of handing share text to the clipboard.
    pub fn report_share(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => self.set_status_info("Lista copiada al portapapeles"),
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err}");
                self.set_status_warning(format!("No se pudo acceder al portapapeles: {err}"));
            }
        }
    }

    // ── New list ────────────────────────────────────────────────────────

    pub fn submit_new_list(&mut self) {
        let Screen::NewList(state) = &self.current else {
            return;
        };
        let Ok(name) = ListName::new(state.name.text()) else {
            self.set_status_warning("El nombre de la lista no puede estar vacío");
            return;
        };
        match self.service.add_list(&name) {
            Ok(id) => {
                self.refresh_lists();
                self.go_back();
                if let Screen::Lists(state) = &mut self.current
                    && let Some(index) = self.lists.iter().position(|list| list.id == id)
                {
                    state.selected = index;
                }
                self.set_status_info(format!("Lista «{name}» creada"));
            }
            Err(err) => self.report_error("No se pudo crear la lista", &err),
        }
    }

    // ── List detail ─────────────────────────────────────────────────────

    fn detail_state(&self) -> Option<&DetailState> {
        match &self.current {
            Screen::Detail(state) => Some(state),
            _ => None,
        }
    }

    fn selected_item(&self) -> Option<(ListId, ShoppingItem)> {
        let state = self.detail_state()?;
        let view = self.detail_view()?;
        let item = view.visible(state.show_purchased).nth(state.selected)?;
        Some((state.list_id, item.clone()))
    }

    pub fn toggle_selected_item(&mut self) {
        let Some((list_id, item)) = self.selected_item() else {
            return;
        };
        match self.service.toggle_purchased(list_id, item.id) {
            Ok(_) => self.refresh_lists(),
            Err(err) => self.report_error("No se pudo actualizar el producto", &err),
        }
    }

    /// Menu with edit / delete for the selected item.
    pub fn open_item_actions(&mut self) {
        if let Some((list_id, item)) = self.selected_item() {
            self.open_modal(Modal::ItemActions {
                list_id,
                item_id: item.id,
                title: item.name,
                selected: 0,
            });
        }
    }

    pub fn begin_edit_item(&mut self) {
        if let Some((list_id, item)) = self.selected_item() {
            self.open_modal(Modal::ItemForm(ItemForm::edit(list_id, &item)));
        }
    }

    pub fn request_delete_item(&mut self) {
        if let Some((list_id, item)) = self.selected_item() {
            self.open_confirm_delete_item(list_id, item.id);
        }
    }

    fn open_edit_item(&mut self, list_id: ListId, item_id: ItemId) {
        if let Some(item) = self.list(list_id).and_then(|list| list.item(item_id)) {
            let form = ItemForm::edit(list_id, item);
            self.open_modal(Modal::ItemForm(form));
        }
    }

    fn open_confirm_delete_item(&mut self, list_id: ListId, item_id: ItemId) {
        if let Some(item) = self.list(list_id).and_then(|list| list.item(item_id)) {
            let modal = Modal::ConfirmDeleteItem {
                list_id,
                item_id,
                name: item.name.clone(),
            };
            self.open_modal(modal);
        }
    }

    /// Manual add dialog with name, quantity `1` and the default unit.
    pub fn begin_add_item(&mut self) {
        if let Some(list_id) = self.detail_state().map(|state| state.list_id) {
            let form = ItemForm::new_item(list_id, &self.default_unit);
            self.open_modal(Modal::ItemForm(form));
        }
    }

    pub fn open_sort_menu(&mut self) {
        let Some(list) = self
            .detail_state()
            .and_then(|state| self.list(state.list_id))
        else {
            return;
        };
        let list_id = list.id;
        let selected = SortOption::ALL
            .iter()
            .position(|option| *option == list.sort_option)
            .unwrap_or(0);
        self.open_modal(Modal::SortMenu { list_id, selected });
    }

    /// Open (or refocus) the search field.
    pub fn start_search(&mut self) {
        if let Screen::Detail(state) = &mut self.current {
            state.search.get_or_insert_with(DraftInput::default);
            self.mode = InputMode::Insert;
        }
    }

    pub fn toggle_show_purchased(&mut self) {
        if let Screen::Detail(state) = &mut self.current {
            state.show_purchased = !state.show_purchased;
        }
        self.clamp_selection();
    }

    pub fn open_add_product(&mut self) {
        if let Some(list_id) = self.detail_state().map(|state| state.list_id) {
            self.suggestions.reset();
            self.push_screen(
                Screen::AddProduct(AddProductState::new(list_id)),
                InputMode::Insert,
            );
        }
    }

    // ── Add product ─────────────────────────────────────────────────────

    /// Select or deselect the option under the cursor.
    pub fn toggle_option(&mut self) {
        let options = self.add_options();
        if let Screen::AddProduct(state) = &mut self.current
            && let Some(option) = options.get(state.cursor)
        {
            state.toggle(option);
        }
    }

    /// Move focus back to the search field.
    pub fn focus_query(&mut self) {
        if matches!(self.current, Screen::AddProduct(_)) && self.modal.is_none() {
            self.mode = InputMode::Insert;
        }
    }

    /// Leave the search field so the options can be browsed with single keys.
    pub fn focus_options(&mut self) {
        if matches!(self.current, Screen::AddProduct(_)) && self.mode == InputMode::Insert {
            self.mode = InputMode::Normal;
        }
    }

    /// Add every selected product with quantity 1 and the default unit, then go back.
    pub fn confirm_selection(&mut self) {
        let Screen::AddProduct(state) = &self.current else {
            return;
        };
        let list_id = state.list_id;
        let names = state.selected_item_names();
        if names.is_empty() {
            self.set_status_warning("Selecciona al menos un producto");
            return;
        }

        let mut added = 0usize;
        let mut failed = false;
        for name in names {
            let Ok(draft) = ItemDraft::single(name, &self.default_unit) else {
                continue;
            };
            match self.service.add_item(list_id, &draft) {
                Ok(_) => added += 1,
                Err(err) => {
                    self.report_error("No se pudo añadir el producto", &err);
                    failed = true;
                    break;
                }
            }
        }

        self.suggestions.reset();
        self.refresh_lists();
        self.go_back();
        if !failed {
            let text = if added == 1 {
                "1 producto añadido".to_string()
            } else {
                format!("{added} productos añadidos")
            };
            self.set_status_info(text);
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────────

    fn confirm_modal(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        self.mode = InputMode::Normal;
        match modal {
            Modal::ListActions {
                list_id, selected, ..
            } => match ListAction::ALL.get(selected) {
                Some(ListAction::Rename) => self.open_list_name_form(list_id, NamePurpose::Rename),
                Some(ListAction::Share) => self.share_list(list_id),
                Some(ListAction::Copy) => self.open_list_name_form(list_id, NamePurpose::Copy),
                Some(ListAction::Delete) => self.open_confirm_delete_list(list_id),
                None => {}
            },
            Modal::ListName(form) => self.submit_list_name(form),
            Modal::ConfirmDeleteList { list_id, name } => {
                match self.service.delete_list(list_id) {
                    Ok(()) => {
                        self.refresh_lists();
                        self.set_status_info(format!("Lista «{name}» eliminada"));
                    }
                    Err(err) => self.report_error("No se pudo eliminar la lista", &err),
                }
            }
            Modal::ItemActions {
                list_id,
                item_id,
                selected,
                ..
            } => match ItemAction::ALL.get(selected) {
                Some(ItemAction::Edit) => self.open_edit_item(list_id, item_id),
                Some(ItemAction::Delete) => self.open_confirm_delete_item(list_id, item_id),
                None => {}
            },
            Modal::ItemForm(form) => self.submit_item_form(form),
            Modal::ConfirmDeleteItem {
                list_id,
                item_id,
                name,
            } => match self.service.delete_item(list_id, item_id) {
                Ok(()) => {
                    self.refresh_lists();
                    self.set_status_info(format!("«{name}» eliminado"));
                }
                Err(err) => self.report_error("No se pudo eliminar el producto", &err),
            },
            Modal::SortMenu { list_id, selected } => {
                let Some(option) = SortOption::ALL.get(selected).copied() else {
                    return;
                };
                match self.service.update_sort_option(list_id, option) {
                    Ok(()) => self.refresh_lists(),
                    Err(err) => self.report_error("No se pudo cambiar el orden", &err),
                }
            }
        }
    }

    fn submit_list_name(&mut self, form: ListNameForm) {
        let Ok(name) = ListName::new(form.name.text()) else {
            self.set_status_warning("El nombre de la lista no puede estar vacío");
            self.open_modal(Modal::ListName(form));
            return;
        };
        let result = match form.purpose {
            NamePurpose::Rename => self
                .service
                .rename_list(form.list_id, &name)
                .map(|()| format!("Lista renombrada a «{name}»")),
            NamePurpose::Copy => self
                .service
                .copy_list(form.list_id, &name)
                .map(|_| format!("Lista copiada como «{name}»")),
        };
        match result {
            Ok(message) => {
                self.refresh_lists();
                self.set_status_info(message);
            }
            Err(err) => self.report_error("No se pudo guardar la lista", &err),
        }
    }

    fn submit_item_form(&mut self, form: ItemForm) {
        let Ok(draft) = ItemDraft::parse(
            form.name.text(),
            form.quantity.text(),
            form.unit.text(),
            &self.default_unit,
        ) else {
            self.set_status_warning("El nombre del producto no puede estar vacío");
            self.open_modal(Modal::ItemForm(form));
            return;
        };
        let result = match form.target {
            ItemFormTarget::New(list_id) => self.service.add_item(list_id, &draft).map(|_| ()),
            ItemFormTarget::Edit { list_id, item_id } => {
                self.service.update_item(list_id, item_id, &draft)
            }
        };
        match result {
            Ok(()) => self.refresh_lists(),
            Err(err) => self.report_error("No se pudo guardar el producto", &err),
        }
    }
}

/// Move a cursor one step within `0..len` without wrapping.
fn step(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1).min(len - 1)
    }
}
