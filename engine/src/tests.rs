//! Flow tests for the app state machine.

use std::path::Path;
use std::time::{Duration, Instant};

use lico_config::ResolvedConfig;
use lico_store::{Catalog, ShoppingStore};
use lico_types::{ShoppingList, SortOption};

use super::*;

const SEED: &str = "\
id,name,category,supermarket
1,Leche entera,Lácteos,Mercadona
2,Leche desnatada,Lácteos,Mercadona
3,Pan de molde,Panadería,Mercadona
4,Queso curado,Lácteos,Mercadona
";

fn test_app() -> App {
    let store = ShoppingStore::open_in_memory().expect("in-memory store");
    let service = ShoppingService::new(store).expect("service");
    let catalog = Catalog::from_seed(SEED).expect("catalog");
    let mut config = ResolvedConfig::defaults(Path::new("/tmp/lico-test"));
    config.suggestions.debounce = Duration::ZERO;
    App::new(service, catalog, &config)
}

fn type_text(app: &mut App, text: &str) {
    let token = app.edit_token().expect("a text field has focus");
    app.text_edit(token).enter_text(text);
}

fn clear_field(app: &mut App) {
    let token = app.edit_token().expect("a text field has focus");
    app.text_edit(token).clear_line();
}

fn create_list(app: &mut App, name: &str) {
    app.open_new_list();
    type_text(app, name);
    app.confirm();
}

fn add_item(app: &mut App, name: &str, quantity: &str) {
    app.begin_add_item();
    type_text(app, name);
    app.focus_next_field();
    clear_field(app);
    type_text(app, quantity);
    app.confirm();
}

fn only_list(app: &App) -> &ShoppingList {
    assert_eq!(app.lists().len(), 1);
    &app.lists()[0]
}

fn item_names(list: &ShoppingList) -> Vec<&str> {
    list.items.iter().map(|item| item.name.as_str()).collect()
}

fn pending_names(app: &App) -> Vec<String> {
    app.detail_view()
        .expect("detail screen")
        .pending
        .iter()
        .map(|item| item.name.clone())
        .collect()
}

/// One list named "Casa" with the detail screen open.
fn app_with_open_list() -> App {
    let mut app = test_app();
    create_list(&mut app, "casa");
    app.open_selected_list();
    app
}

#[test]
fn starts_on_empty_overview() {
    let app = test_app();
    assert!(matches!(app.screen(), Screen::Lists(_)));
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert!(app.lists().is_empty());
    assert!(app.edit_token().is_none());
}

#[test]
fn new_list_name_is_capitalised_while_typing() {
    let mut app = test_app();
    app.open_new_list();
    assert_eq!(app.input_mode(), InputMode::Insert);
    type_text(&mut app, "compra semanal");
    let Screen::NewList(state) = app.screen() else {
        panic!("expected new-list screen");
    };
    assert_eq!(state.name.text(), "Compra semanal");

    app.confirm();
    assert!(matches!(app.screen(), Screen::Lists(_)));
    assert_eq!(only_list(&app).name, "Compra semanal");
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Info));
}

#[test]
fn new_list_selects_created_list() {
    let mut app = test_app();
    create_list(&mut app, "casa");
    create_list(&mut app, "trabajo");
    let Screen::Lists(state) = app.screen() else {
        panic!("expected overview");
    };
    assert_eq!(app.lists()[state.selected].name, "Trabajo");
}

#[test]
fn blank_list_name_is_rejected() {
    let mut app = test_app();
    app.open_new_list();
    type_text(&mut app, "   ");
    app.confirm();
    assert!(matches!(app.screen(), Screen::NewList(_)));
    assert!(app.lists().is_empty());
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Warning));
}

#[test]
fn escape_abandons_new_list() {
    let mut app = test_app();
    app.open_new_list();
    type_text(&mut app, "casa");
    app.cancel();
    assert!(matches!(app.screen(), Screen::Lists(_)));
    assert!(app.lists().is_empty());
}

#[test]
fn item_form_accepts_decimal_comma() {
    let mut app = app_with_open_list();
    app.begin_add_item();
    assert!(matches!(app.modal(), Some(Modal::ItemForm(_))));
    assert_eq!(app.input_mode(), InputMode::Modal);
    type_text(&mut app, "Harina");
    app.focus_next_field();
    clear_field(&mut app);
    type_text(&mut app, "2,5");
    app.confirm();

    assert!(app.modal().is_none());
    let item = &only_list(&app).items[0];
    assert_eq!(item.name, "Harina");
    assert!((item.quantity - 2.5).abs() < f64::EPSILON);
    assert_eq!(item.unit, "uds");
    assert_eq!(item.position, 0);
}

#[test]
fn item_form_rejects_blank_name_and_stays_open() {
    let mut app = app_with_open_list();
    app.begin_add_item();
    app.confirm();
    assert!(matches!(app.modal(), Some(Modal::ItemForm(_))));
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Warning));
    assert!(only_list(&app).items.is_empty());
}

#[test]
fn toggling_moves_item_between_sections() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    add_item(&mut app, "Leche", "2");
    assert_eq!(pending_names(&app), ["Pan", "Leche"]);

    app.toggle_selected_item();
    let view = app.detail_view().unwrap();
    assert_eq!(pending_names(&app), ["Leche"]);
    assert_eq!(view.purchased.len(), 1);
    assert!(!view.has_no_results);

    // Purchased rows are only selectable once the section is expanded.
    app.select_next();
    app.toggle_show_purchased();
    app.select_next();
    app.toggle_selected_item();
    assert_eq!(pending_names(&app), ["Pan", "Leche"]);
}

#[test]
fn edit_keeps_position_and_purchased_flag() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    add_item(&mut app, "Leche", "1");
    app.toggle_show_purchased();
    app.toggle_selected_item();

    // Pan is now the only purchased row, listed after Leche.
    app.select_next();
    app.begin_edit_item();
    let Some(Modal::ItemForm(form)) = app.modal() else {
        panic!("expected item form");
    };
    assert_eq!(form.name.text(), "Pan");
    clear_field(&mut app);
    type_text(&mut app, "Pan integral");
    app.confirm();

    let list = only_list(&app);
    let edited = list.items.iter().find(|i| i.name == "Pan integral").unwrap();
    assert!(edited.is_purchased);
    assert_eq!(edited.position, 0);
}

#[test]
fn deleting_item_closes_gap_in_positions() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    add_item(&mut app, "Leche", "1");
    add_item(&mut app, "Agua", "6");

    app.select_next();
    app.request_delete_item();
    assert!(matches!(app.modal(), Some(Modal::ConfirmDeleteItem { .. })));
    app.confirm();

    let list = only_list(&app);
    assert_eq!(item_names(list), ["Pan", "Agua"]);
    let positions: Vec<u32> = list.items.iter().map(|i| i.position).collect();
    assert_eq!(positions, [0, 1]);
}

#[test]
fn item_actions_menu_routes_to_delete() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    app.confirm();
    assert!(matches!(app.modal(), Some(Modal::ItemActions { .. })));
    app.select_next();
    app.confirm();
    assert!(matches!(app.modal(), Some(Modal::ConfirmDeleteItem { .. })));
    app.cancel();
    assert!(app.modal().is_none());
    assert_eq!(only_list(&app).items.len(), 1);
}

#[test]
fn sort_menu_changes_order() {
    let mut app = app_with_open_list();
    add_item(&mut app, "pan", "1");
    add_item(&mut app, "Arroz", "3");
    add_item(&mut app, "Leche", "6");

    app.open_sort_menu();
    assert_eq!(
        app.modal(),
        Some(&Modal::SortMenu {
            list_id: only_list(&app).id,
            selected: 0
        })
    );
    app.select_next();
    app.confirm();
    assert_eq!(only_list(&app).sort_option, SortOption::Name);
    assert_eq!(pending_names(&app), ["Arroz", "Leche", "pan"]);

    app.open_sort_menu();
    app.select_next();
    app.confirm();
    assert_eq!(only_list(&app).sort_option, SortOption::Quantity);
    assert_eq!(pending_names(&app), ["Leche", "Arroz", "pan"]);
}

#[test]
fn sort_menu_does_not_wrap() {
    let mut app = app_with_open_list();
    app.open_sort_menu();
    for _ in 0..5 {
        app.select_next();
    }
    let Some(Modal::SortMenu { selected, .. }) = app.modal() else {
        panic!("expected sort menu");
    };
    assert_eq!(*selected, SortOption::ALL.len() - 1);
}

#[test]
fn search_filters_and_escape_clears() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    add_item(&mut app, "Leche", "1");

    app.start_search();
    type_text(&mut app, "LEC");
    assert_eq!(pending_names(&app), ["Leche"]);

    clear_field(&mut app);
    type_text(&mut app, "zz");
    assert!(app.detail_view().unwrap().has_no_results);

    app.cancel();
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert!(app.detail_view().unwrap().has_no_results);

    app.cancel();
    assert!(matches!(app.screen(), Screen::Detail(_)));
    assert_eq!(pending_names(&app), ["Pan", "Leche"]);

    app.cancel();
    assert!(matches!(app.screen(), Screen::Lists(_)));
}

#[test]
fn add_product_from_catalog_query() {
    let mut app = app_with_open_list();
    app.open_add_product();
    assert!(matches!(app.screen(), Screen::AddProduct(_)));
    assert_eq!(app.input_mode(), InputMode::Insert);

    type_text(&mut app, "lech");
    app.tick(Instant::now());
    let labels: Vec<String> = app.add_options().iter().map(AddOption::label).collect();
    assert_eq!(
        labels,
        ["Añadir \"lech\"", "Leche entera", "Leche desnatada"]
    );

    app.focus_options();
    app.select_next();
    app.confirm();
    app.confirm_selection();

    assert!(matches!(app.screen(), Screen::Detail(_)));
    let item = &only_list(&app).items[0];
    assert_eq!(item.name, "Leche entera");
    assert!((item.quantity - 1.0).abs() < f64::EPSILON);
    assert_eq!(item.unit, "uds");
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("1 producto añadido")
    );
}

#[test]
fn quick_chips_add_in_one_go() {
    let mut app = app_with_open_list();
    app.open_add_product();
    let labels: Vec<String> = app.add_options().iter().map(AddOption::label).collect();
    assert_eq!(labels, ["Leche", "Pan", "Huevos", "Arroz", "Agua"]);

    app.focus_options();
    app.confirm();
    app.select_next();
    app.confirm();
    app.confirm_selection();

    let list = only_list(&app);
    assert_eq!(item_names(list), ["Leche", "Pan"]);
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("2 productos añadidos")
    );
}

#[test]
fn empty_selection_is_rejected() {
    let mut app = app_with_open_list();
    app.open_add_product();
    app.confirm_selection();
    assert!(matches!(app.screen(), Screen::AddProduct(_)));
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Warning));
}

#[test]
fn rename_through_list_actions() {
    let mut app = test_app();
    create_list(&mut app, "casa");
    app.open_list_actions();
    assert!(matches!(app.modal(), Some(Modal::ListActions { .. })));
    app.confirm();

    let Some(Modal::ListName(form)) = app.modal() else {
        panic!("expected name form");
    };
    assert_eq!(form.name.text(), "Casa");
    assert_eq!(form.title(), "Renombrar lista");
    clear_field(&mut app);
    type_text(&mut app, "super");
    app.confirm();

    assert!(app.modal().is_none());
    assert_eq!(only_list(&app).name, "Super");
}

#[test]
fn blank_rename_keeps_form_open() {
    let mut app = test_app();
    create_list(&mut app, "casa");
    app.begin_rename_list();
    clear_field(&mut app);
    app.confirm();
    assert!(matches!(app.modal(), Some(Modal::ListName(_))));
    assert_eq!(only_list(&app).name, "Casa");
}

#[test]
fn copy_resets_purchased_items() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "1");
    add_item(&mut app, "Leche", "1");
    app.toggle_selected_item();
    app.go_back();

    app.begin_copy_list();
    clear_field(&mut app);
    type_text(&mut app, "copia");
    app.confirm();

    assert_eq!(app.lists().len(), 2);
    let copy = app.lists().iter().find(|l| l.name == "Copia").unwrap();
    assert_eq!(item_names(copy), ["Pan", "Leche"]);
    assert!(copy.items.iter().all(|item| !item.is_purchased));
    let original = app.lists().iter().find(|l| l.name == "Casa").unwrap();
    assert!(original.items.iter().any(|item| item.is_purchased));
}

#[test]
fn delete_list_after_confirmation() {
    let mut app = test_app();
    create_list(&mut app, "casa");
    create_list(&mut app, "trabajo");
    app.request_delete_list();
    let Some(Modal::ConfirmDeleteList { name, .. }) = app.modal() else {
        panic!("expected confirmation");
    };
    assert_eq!(name, "Trabajo");
    app.confirm();

    assert_eq!(only_list(&app).name, "Casa");
    let Screen::Lists(state) = app.screen() else {
        panic!("expected overview");
    };
    assert_eq!(state.selected, 0);
}

#[test]
fn share_hands_text_to_front_end_once() {
    let mut app = app_with_open_list();
    add_item(&mut app, "Pan", "2");
    app.go_back();

    app.share_selected_list();
    assert_eq!(
        app.take_share_text().as_deref(),
        Some("Lista: Casa\n- Pan (2 uds)\n")
    );
    assert!(app.take_share_text().is_none());

    app.report_share(Ok(()));
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Info));
    app.report_share(Err("no display".to_string()));
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Warning));
}

#[test]
fn go_back_at_root_stays_put() {
    let mut app = test_app();
    app.go_back();
    app.cancel();
    assert!(matches!(app.screen(), Screen::Lists(_)));
    assert!(!app.should_quit());
    app.request_quit();
    assert!(app.should_quit());
}

#[test]
fn tick_picks_up_external_changes() {
    let mut app = test_app();
    app.service
        .add_list(&lico_types::ListName::new("Fuera").unwrap())
        .unwrap();
    assert!(app.lists().is_empty());
    app.tick(Instant::now());
    assert_eq!(only_list(&app).name, "Fuera");
}
