// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use griddle_app::{
    AppCommand, AppEvent, AppMode, AppState, ColumnSpec, FuzzyEngine, Grid, PageView, RecordId,
    Theme, Value, numeric_warning, view,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table,
};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const PLACEHOLDER_ROWS: usize = 6;

/// Host-side services the grid UI needs: persisted layout and theme, the
/// seed rows, and file-backed CSV import/export.
pub trait AppRuntime {
    fn load_columns(&mut self) -> Vec<ColumnSpec>;
    fn save_columns(&mut self, specs: &[ColumnSpec]);
    fn load_theme(&mut self) -> Theme;
    fn save_theme(&mut self, theme: Theme);
    fn sample_records(&mut self) -> Vec<BTreeMap<String, Value>>;
    fn import_records(&mut self, path: &str) -> Result<Vec<BTreeMap<String, String>>>;
    fn export_table(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub page_size: usize,
    pub reduced_motion: bool,
    pub search_debounce: Duration,
    pub loading_delay: Duration,
    pub loading_threshold: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            page_size: griddle_app::DEFAULT_PAGE_SIZE,
            reduced_motion: false,
            search_debounce: Duration::from_millis(160),
            loading_delay: Duration::from_millis(380),
            loading_threshold: 400,
        }
    }
}

/// Timer-driven events posted from helper threads. Every variant carries the
/// token current when it was armed; a mismatch means a newer action
/// superseded it and the event is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    ApplySearch { token: u64 },
    FinishLoading { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ManagerField {
    #[default]
    List,
    KeyInput,
    LabelInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ManagerUiState {
    cursor: usize,
    field: ManagerField,
    new_key: String,
    new_label: String,
    grabbed: Option<usize>,
    order_preview: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ImportPromptUiState {
    visible: bool,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    search_input: String,
    search_focused: bool,
    search_token: u64,
    pending_search: Option<String>,
    status_token: u64,
    loading: bool,
    loading_token: u64,
    selected_row: usize,
    selected_col: usize,
    manager: ManagerUiState,
    import_prompt: ImportPromptUiState,
    confirm_delete: Option<RecordId>,
    charts_visible: bool,
    help_visible: bool,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: &UiOptions,
) -> Result<()> {
    let mut grid = Grid::new(runtime.load_columns());
    grid.seed(runtime.sample_records());
    grid.view.page_size = options.page_size.max(1);
    state.theme = runtime.load_theme();
    let engine = FuzzyEngine::default();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(
            state,
            &mut grid,
            &mut view_data,
            &internal_tx,
            &internal_rx,
            options,
        );

        if let Err(error) =
            terminal.draw(|frame| render(frame, state, &grid, &engine, &view_data))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(
                        state,
                        &mut grid,
                        runtime,
                        &engine,
                        &mut view_data,
                        &internal_tx,
                        options,
                        key,
                    ) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    grid: &mut Grid,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
    options: &UiOptions,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ApplySearch { token } if token == view_data.search_token => {
                if let Some(query) = view_data.pending_search.take() {
                    grid.set_search(query);
                    view_data.selected_row = 0;
                    maybe_begin_loading(grid.rows.len(), view_data, tx, options);
                }
            }
            InternalEvent::FinishLoading { token } if token == view_data.loading_token => {
                view_data.loading = false;
            }
            InternalEvent::ClearStatus { .. }
            | InternalEvent::ApplySearch { .. }
            | InternalEvent::FinishLoading { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_token += 1;
    state.dispatch(AppCommand::SetStatus(message.into()));
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Arms the trailing-edge search debounce. A superseding keystroke bumps the
/// token, so a stale timer can never overwrite a newer query.
fn arm_search(
    grid: &mut Grid,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    view_data.search_token += 1;

    if options.reduced_motion || options.search_debounce.is_zero() {
        view_data.pending_search = None;
        grid.set_search(view_data.search_input.clone());
        view_data.selected_row = 0;
        maybe_begin_loading(grid.rows.len(), view_data, internal_tx, options);
        return;
    }

    view_data.pending_search = Some(view_data.search_input.clone());
    let sender = internal_tx.clone();
    let token = view_data.search_token;
    let delay = options.search_debounce;
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::ApplySearch { token });
    });
}

/// Briefly swaps the table body for placeholder rows when the store is
/// large. Cancellable: newer input bumps the token.
fn maybe_begin_loading(
    row_count: usize,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
) {
    if options.reduced_motion || row_count <= options.loading_threshold {
        return;
    }
    view_data.loading = true;
    view_data.loading_token += 1;

    let sender = internal_tx.clone();
    let token = view_data.loading_token;
    let delay = options.loading_delay;
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::FinishLoading { token });
    });
}

fn persist_columns<R: AppRuntime>(runtime: &mut R, grid: &Grid) {
    runtime.save_columns(grid.columns.specs());
}

fn visible_key_at(grid: &Grid, index: usize) -> Option<String> {
    grid.columns
        .visible()
        .get(index)
        .map(|spec| spec.key.clone())
}

fn selected_record_id(grid: &Grid, engine: &FuzzyEngine, view_data: &ViewData) -> Option<RecordId> {
    let page = grid.page_view(Some(engine));
    page.rows.get(view_data.selected_row).map(|record| record.id)
}

fn clamp_cursor(grid: &Grid, engine: &FuzzyEngine, view_data: &mut ViewData) {
    let page = grid.page_view(Some(engine));
    if view_data.selected_row >= page.rows.len() {
        view_data.selected_row = page.rows.len().saturating_sub(1);
    }
    let visible = grid.columns.visible().len();
    if view_data.selected_col >= visible {
        view_data.selected_col = visible.saturating_sub(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    grid: &mut Grid,
    runtime: &mut R,
    engine: &FuzzyEngine,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.confirm_delete.is_some() {
        handle_confirm_key(state, grid, engine, view_data, internal_tx, key);
        return false;
    }

    if view_data.import_prompt.visible {
        handle_import_prompt_key(state, grid, runtime, view_data, internal_tx, options, key);
        return false;
    }

    if state.mode == AppMode::Manage {
        handle_manager_key(state, grid, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.search_focused {
        handle_search_key(state, grid, view_data, internal_tx, options, key);
        return false;
    }

    if state.mode == AppMode::Edit {
        handle_edit_key(state, grid, engine, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('j') | KeyCode::Down, _) => {
            let page = grid.page_view(Some(engine));
            if view_data.selected_row + 1 < page.rows.len() {
                view_data.selected_row += 1;
            }
        }
        (KeyCode::Char('k') | KeyCode::Up, _) => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        (KeyCode::Char('h') | KeyCode::Left, _) => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        (KeyCode::Char('l') | KeyCode::Right, _) => {
            if view_data.selected_col + 1 < grid.columns.visible().len() {
                view_data.selected_col += 1;
            }
        }
        (KeyCode::Char('/'), _) => {
            view_data.search_focused = true;
            emit_status(state, view_data, internal_tx, "search");
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            if let Some(key_name) = visible_key_at(grid, view_data.selected_col) {
                grid.toggle_sort(&key_name);
                let direction = grid.view.sort.direction.marker();
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("sort {key_name} {direction}"),
                );
            }
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => {
            if grid.next_page(Some(engine)) {
                view_data.selected_row = 0;
            }
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            if grid.prev_page() {
                view_data.selected_row = 0;
            }
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            if let Some(id) = selected_record_id(grid, engine, view_data) {
                grid.begin_edit(id);
                state.dispatch(AppCommand::EnterEditMode);
                emit_status(state, view_data, internal_tx, "editing row");
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            if let Some(id) = selected_record_id(grid, engine, view_data) {
                view_data.confirm_delete = Some(id);
            }
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            view_data.manager = ManagerUiState::default();
            state.dispatch(AppCommand::OpenManager);
            emit_status(state, view_data, internal_tx, "columns open");
        }
        (KeyCode::Char('i'), KeyModifiers::NONE) => {
            view_data.import_prompt = ImportPromptUiState {
                visible: true,
                path: String::new(),
            };
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            do_export(state, grid, runtime, engine, view_data, internal_tx);
        }
        (KeyCode::Char('t'), KeyModifiers::NONE) => {
            for event in state.dispatch(AppCommand::ToggleTheme) {
                if let AppEvent::ThemeChanged(theme) = event {
                    runtime.save_theme(theme);
                }
            }
            view_data.status_token += 1;
            schedule_status_clear(internal_tx, view_data.status_token);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            view_data.charts_visible = !view_data.charts_visible;
        }
        (KeyCode::Char('?'), KeyModifiers::NONE) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn handle_confirm_key(
    state: &mut AppState,
    grid: &mut Grid,
    engine: &FuzzyEngine,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(id) = view_data.confirm_delete.take() else {
        return;
    };
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            if grid.delete_row(id) {
                clamp_cursor(grid, engine, view_data);
                emit_status(state, view_data, internal_tx, "row deleted");
            } else {
                emit_status(state, view_data, internal_tx, "row no longer exists");
            }
        }
        _ => {
            emit_status(state, view_data, internal_tx, "delete canceled");
        }
    }
}

fn handle_import_prompt_key<R: AppRuntime>(
    state: &mut AppState,
    grid: &mut Grid,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.import_prompt = ImportPromptUiState::default();
        }
        KeyCode::Backspace => {
            view_data.import_prompt.path.pop();
        }
        KeyCode::Enter => {
            let path = view_data.import_prompt.path.trim().to_owned();
            view_data.import_prompt = ImportPromptUiState::default();
            if path.is_empty() {
                emit_status(state, view_data, internal_tx, "import needs a file path");
                return;
            }
            match runtime.import_records(&path) {
                Ok(rows) => {
                    let imported = grid.import_rows(rows);
                    view_data.selected_row = 0;
                    maybe_begin_loading(grid.rows.len(), view_data, internal_tx, options);
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("imported {imported} row(s)"),
                    );
                }
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("import failed: {error:#}"),
                    );
                }
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.import_prompt.path.push(c);
        }
        _ => {}
    }
}

fn handle_search_key(
    state: &mut AppState,
    grid: &mut Grid,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &UiOptions,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_focused = false;
            emit_status(state, view_data, internal_tx, "nav");
        }
        KeyCode::Enter => {
            view_data.search_focused = false;
            view_data.search_token += 1;
            view_data.pending_search = None;
            grid.set_search(view_data.search_input.clone());
            view_data.selected_row = 0;
            maybe_begin_loading(grid.rows.len(), view_data, internal_tx, options);
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            arm_search(grid, view_data, internal_tx, options);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(c);
            arm_search(grid, view_data, internal_tx, options);
        }
        _ => {}
    }
}

fn handle_edit_key(
    state: &mut AppState,
    grid: &mut Grid,
    engine: &FuzzyEngine,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        let count = grid.overlay.len();
        grid.commit_all();
        state.dispatch(AppCommand::ExitToNav);
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("saved {count} row(s)"),
        );
        return;
    }

    match key.code {
        KeyCode::Esc => {
            grid.cancel_all();
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "edits discarded");
        }
        KeyCode::Tab => {
            if view_data.selected_col + 1 < grid.columns.visible().len() {
                view_data.selected_col += 1;
            } else {
                view_data.selected_col = 0;
            }
        }
        KeyCode::Left => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        KeyCode::Right => {
            if view_data.selected_col + 1 < grid.columns.visible().len() {
                view_data.selected_col += 1;
            }
        }
        KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Down => {
            let page = grid.page_view(Some(engine));
            if view_data.selected_row + 1 < page.rows.len() {
                view_data.selected_row += 1;
            }
        }
        KeyCode::Backspace => {
            edit_selected_cell(grid, engine, view_data, |text| {
                text.pop();
            });
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit_selected_cell(grid, engine, view_data, |text| {
                text.push(c);
            });
        }
        _ => {}
    }
}

/// Applies one keystroke's worth of change to the selected cell's pending
/// text, seeding the overlay from the record if this row was not yet edited.
fn edit_selected_cell(
    grid: &mut Grid,
    engine: &FuzzyEngine,
    view_data: &ViewData,
    change: impl FnOnce(&mut String),
) {
    let Some(id) = selected_record_id(grid, engine, view_data) else {
        return;
    };
    let Some(key) = visible_key_at(grid, view_data.selected_col) else {
        return;
    };
    let mut text = match grid.rows.get(id) {
        Some(record) => grid.cell_text(record, &key),
        None => return,
    };
    change(&mut text);
    grid.set_field(id, &key, text);
}

fn handle_manager_key<R: AppRuntime>(
    state: &mut AppState,
    grid: &mut Grid,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match view_data.manager.field {
        ManagerField::List => {
            handle_manager_list_key(state, grid, runtime, view_data, internal_tx, key)
        }
        ManagerField::KeyInput | ManagerField::LabelInput => {
            handle_manager_input_key(state, grid, runtime, view_data, internal_tx, key)
        }
    }
}

fn handle_manager_list_key<R: AppRuntime>(
    state: &mut AppState,
    grid: &mut Grid,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let manager = &mut view_data.manager;
    match key.code {
        KeyCode::Esc | KeyCode::Char('c') => {
            if manager.grabbed.take().is_some() {
                manager.order_preview = None;
                emit_status(state, view_data, internal_tx, "reorder canceled");
                return;
            }
            view_data.manager = ManagerUiState::default();
            let visible = grid.columns.visible().len();
            if view_data.selected_col >= visible {
                view_data.selected_col = visible.saturating_sub(1);
            }
            state.dispatch(AppCommand::CloseManager);
            view_data.status_token += 1;
            schedule_status_clear(internal_tx, view_data.status_token);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if let (Some(grabbed), Some(preview)) =
                (manager.grabbed, manager.order_preview.as_mut())
            {
                if grabbed + 1 < preview.len() {
                    preview.swap(grabbed, grabbed + 1);
                    manager.grabbed = Some(grabbed + 1);
                    manager.cursor = grabbed + 1;
                }
            } else if manager.cursor + 1 < grid.columns.len() {
                manager.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let (Some(grabbed), Some(preview)) =
                (manager.grabbed, manager.order_preview.as_mut())
            {
                if grabbed > 0 {
                    preview.swap(grabbed - 1, grabbed);
                    manager.grabbed = Some(grabbed - 1);
                    manager.cursor = grabbed - 1;
                }
            } else {
                manager.cursor = manager.cursor.saturating_sub(1);
            }
        }
        KeyCode::Char('g') | KeyCode::Enter => {
            // Grab-and-move: the drop hands the final order to the registry.
            if manager.grabbed.take().is_some() {
                if let Some(order) = manager.order_preview.take() {
                    grid.reorder_columns(&order);
                    persist_columns(runtime, grid);
                    emit_status(state, view_data, internal_tx, "columns reordered");
                }
            } else if manager.cursor < grid.columns.len() {
                manager.grabbed = Some(manager.cursor);
                manager.order_preview = Some(
                    grid.columns
                        .specs()
                        .iter()
                        .map(|spec| spec.key.clone())
                        .collect(),
                );
            }
        }
        KeyCode::Char(' ') => {
            let cursor = manager.cursor;
            let visible = grid
                .columns
                .get(cursor)
                .map(|spec| spec.visible)
                .unwrap_or(false);
            if grid.set_column_visible(cursor, !visible) {
                persist_columns(runtime, grid);
            }
        }
        KeyCode::Char('K') => {
            let cursor = manager.cursor;
            if grid.move_column_up(cursor) {
                manager.cursor = cursor - 1;
                persist_columns(runtime, grid);
            }
        }
        KeyCode::Char('J') => {
            let cursor = manager.cursor;
            if grid.move_column_down(cursor) {
                manager.cursor = cursor + 1;
                persist_columns(runtime, grid);
            }
        }
        KeyCode::Char('d') => {
            let cursor = manager.cursor;
            if grid.remove_column(cursor) {
                if manager.cursor >= grid.columns.len() {
                    manager.cursor = grid.columns.len().saturating_sub(1);
                }
                persist_columns(runtime, grid);
                emit_status(state, view_data, internal_tx, "column removed");
            }
        }
        KeyCode::Char('a') => {
            manager.field = ManagerField::KeyInput;
        }
        _ => {}
    }
}

fn handle_manager_input_key<R: AppRuntime>(
    state: &mut AppState,
    grid: &mut Grid,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let manager = &mut view_data.manager;
    match key.code {
        KeyCode::Esc => {
            manager.field = ManagerField::List;
        }
        KeyCode::Tab => {
            manager.field = match manager.field {
                ManagerField::KeyInput => ManagerField::LabelInput,
                _ => ManagerField::KeyInput,
            };
        }
        KeyCode::Backspace => {
            match manager.field {
                ManagerField::KeyInput => manager.new_key.pop(),
                _ => manager.new_label.pop(),
            };
        }
        KeyCode::Enter => {
            let key_text = manager.new_key.clone();
            let label_text = manager.new_label.clone();
            match grid.add_column(&key_text, &label_text) {
                Ok(()) => {
                    manager.new_key.clear();
                    manager.new_label.clear();
                    manager.field = ManagerField::List;
                    persist_columns(runtime, grid);
                    emit_status(state, view_data, internal_tx, "column added");
                }
                Err(error) => {
                    emit_status(state, view_data, internal_tx, error.to_string());
                }
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            match manager.field {
                ManagerField::KeyInput => manager.new_key.push(c),
                _ => manager.new_label.push(c),
            };
        }
        _ => {}
    }
}

fn do_export<R: AppRuntime>(
    state: &mut AppState,
    grid: &Grid,
    runtime: &mut R,
    engine: &FuzzyEngine,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let (header, rows) = grid.export_table(Some(engine));
    match runtime.export_table(&header, &rows) {
        Ok(path) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("exported {}", path.display()),
            );
        }
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("export failed: {error:#}"),
            );
        }
    }
}

struct Palette {
    text: Color,
    heading: Color,
    accent: Color,
    dim: Color,
    selection_fg: Color,
    selection_bg: Color,
    warn: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            text: Color::Black,
            heading: Color::Blue,
            accent: Color::Blue,
            dim: Color::DarkGray,
            selection_fg: Color::Black,
            selection_bg: Color::Cyan,
            warn: Color::Red,
        },
        Theme::Dark => Palette {
            text: Color::Gray,
            heading: Color::Cyan,
            accent: Color::Cyan,
            dim: Color::DarkGray,
            selection_fg: Color::Black,
            selection_bg: Color::Cyan,
            warn: Color::LightRed,
        },
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    grid: &Grid,
    engine: &FuzzyEngine,
    view_data: &ViewData,
) {
    let colors = palette(state.theme);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let search_line = search_bar_text(view_data);
    let search_bar = Paragraph::new(search_line)
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .title("griddle")
                .borders(Borders::ALL)
                .style(Style::default().fg(colors.heading)),
        );
    frame.render_widget(search_bar, layout[0]);

    if view_data.charts_visible {
        render_charts(frame, layout[1], grid, engine, &colors);
    } else {
        render_table(frame, layout[1], state, grid, engine, view_data, &colors);
    }

    let page = grid.page_view(Some(engine));
    let footer = Paragraph::new(vec![
        Line::from(footer_text(grid, &page, state.mode)),
        Line::from(state.status_line.clone().unwrap_or_default()),
    ])
    .style(Style::default().fg(colors.dim));
    frame.render_widget(footer, layout[2]);

    if state.mode == AppMode::Manage {
        let area = centered_rect(64, 70, frame.area());
        frame.render_widget(Clear, area);
        let manager = Paragraph::new(manager_overlay_text(grid, &view_data.manager)).block(
            Block::default()
                .title("columns")
                .borders(Borders::ALL)
                .style(Style::default().fg(colors.accent)),
        );
        frame.render_widget(manager, area);
    }

    if view_data.import_prompt.visible {
        let area = centered_rect(60, 24, frame.area());
        frame.render_widget(Clear, area);
        let prompt = Paragraph::new(import_prompt_text(&view_data.import_prompt))
            .block(Block::default().title("import CSV").borders(Borders::ALL));
        frame.render_widget(prompt, area);
    }

    if let Some(id) = view_data.confirm_delete {
        let area = centered_rect(48, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(confirm_overlay_text(grid, id))
            .block(Block::default().title("delete").borders(Borders::ALL));
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

#[allow(clippy::too_many_arguments)]
fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    grid: &Grid,
    engine: &FuzzyEngine,
    view_data: &ViewData,
    colors: &Palette,
) {
    if view_data.loading {
        let mut lines = vec![Line::from("loading…")];
        for _ in 0..PLACEHOLDER_ROWS {
            lines.push(Line::from("░░░░░░░░░░░░░░░░░░░░░░░░"));
        }
        let placeholder = Paragraph::new(lines)
            .style(Style::default().fg(colors.dim))
            .block(Block::default().borders(Borders::ALL).title("records"));
        frame.render_widget(placeholder, area);
        return;
    }

    let visible = grid.columns.visible();
    let page = grid.page_view(Some(engine));
    let widths = vec![Constraint::Min(8); visible.len().max(1)];

    let header_cells = visible.iter().map(|spec| {
        let mut label = spec.label.clone();
        if grid.view.sort.key.as_deref() == Some(spec.key.as_str()) {
            label.push(' ');
            label.push_str(grid.view.sort.direction.marker());
        }
        Cell::from(label).style(
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = page.rows.iter().enumerate().map(|(row_index, record)| {
        let selected_row = row_index == view_data.selected_row;
        let editing = grid.overlay.is_editing(record.id);
        let cells = visible
            .iter()
            .enumerate()
            .map(|(col_index, spec)| {
                let text = grid.cell_text(record, &spec.key);
                let mut style = Style::default().fg(colors.text);
                if editing {
                    style = style.fg(colors.accent).add_modifier(Modifier::UNDERLINED);
                    if matches!(record.field(&spec.key), Some(Value::Number(_)))
                        && numeric_warning(&text)
                    {
                        style = style.fg(colors.warn);
                    }
                }
                if selected_row {
                    style = style.bg(colors.selection_bg).fg(colors.selection_fg);
                }
                if selected_row && col_index == view_data.selected_col {
                    style = style.add_modifier(Modifier::BOLD);
                }
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let mode_hint = match state.mode {
        AppMode::Edit => "records (editing)",
        _ => "records",
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(mode_hint).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_charts(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    grid: &Grid,
    engine: &FuzzyEngine,
    colors: &Palette,
) {
    let keys = grid.searchable_keys();
    let filtered = view::filter_rows(grid.rows.records(), &keys, &grid.view.search, Some(engine));
    let roles = griddle_app::summary::role_counts(&filtered);
    let ages = griddle_app::summary::age_buckets(&filtered);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_bar_chart(frame, halves[0], "roles", &roles, colors);
    render_bar_chart(frame, halves[1], "ages", &ages, colors);
}

fn render_bar_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    data: &[(String, u64)],
    colors: &Palette,
) {
    if data.is_empty() {
        let empty = Paragraph::new("no data")
            .style(Style::default().fg(colors.dim))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar<'_>> = data
        .iter()
        .map(|(label, count)| {
            Bar::default()
                .value(*count)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(colors.accent))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .bar_width(9)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn search_bar_text(view_data: &ViewData) -> String {
    if view_data.search_focused {
        format!("search: {}▌", view_data.search_input)
    } else if view_data.search_input.is_empty() {
        "search: (press / to search)".to_owned()
    } else {
        format!("search: {}", view_data.search_input)
    }
}

fn footer_text(grid: &Grid, page: &PageView<'_>, mode: AppMode) -> String {
    let mut text = format!("{} · {}", page.page_label(), page.total_label());
    if grid.overlay.has_edits() {
        text.push_str(&format!(
            " · {} pending edit(s): ^S save · Esc discard",
            grid.overlay.len()
        ));
    }
    if mode == AppMode::Nav {
        text.push_str(" · ? help");
    }
    text
}

fn manager_overlay_text(grid: &Grid, manager: &ManagerUiState) -> String {
    let mut lines = Vec::new();

    let preview_specs: Vec<ColumnSpec>;
    let specs: &[ColumnSpec] = match &manager.order_preview {
        Some(order) => {
            preview_specs = order
                .iter()
                .filter_map(|key| {
                    grid.columns
                        .specs()
                        .iter()
                        .find(|spec| &spec.key == key)
                        .cloned()
                })
                .collect();
            &preview_specs
        }
        None => grid.columns.specs(),
    };

    for (index, spec) in specs.iter().enumerate() {
        let cursor = if index == manager.cursor { '>' } else { ' ' };
        let grabbed = if manager.grabbed == Some(index) {
            '*'
        } else {
            ' '
        };
        let visible = if spec.visible { 'x' } else { ' ' };
        lines.push(format!(
            "{cursor}{grabbed}[{visible}] {} ({})",
            spec.label, spec.key
        ));
    }
    if specs.is_empty() {
        lines.push("(no columns)".to_owned());
    }

    lines.push(String::new());
    let key_marker = if manager.field == ManagerField::KeyInput {
        '>'
    } else {
        ' '
    };
    let label_marker = if manager.field == ManagerField::LabelInput {
        '>'
    } else {
        ' '
    };
    lines.push(format!("{key_marker}new key:   {}", manager.new_key));
    lines.push(format!("{label_marker}new label: {}", manager.new_label));
    lines.push(String::new());
    lines.push(
        "space visibility · K/J move · g grab/drop · d remove · a add · esc close".to_owned(),
    );

    lines.join("\n")
}

fn import_prompt_text(prompt: &ImportPromptUiState) -> String {
    format!(
        "file path: {}▌\n\nenter to import · esc to cancel",
        prompt.path
    )
}

fn confirm_overlay_text(grid: &Grid, id: RecordId) -> String {
    let name = grid
        .rows
        .get(id)
        .map(|record| record.text("name"))
        .unwrap_or_default();
    format!("Delete this row? {name}\n\ny delete · n keep")
}

fn help_overlay_text() -> String {
    [
        "j/k move row · h/l move column",
        "/ search · s sort column · n/p page",
        "e edit row · ^S save edits · esc discard edits",
        "d delete row · c columns · i import CSV · x export CSV",
        "t theme · g charts · q quit",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
