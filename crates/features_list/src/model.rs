use std::collections::BTreeMap;

use foundation::handles::Generation;
use runtime::event_bus::{Event, EventBus, EventKind};
use tracing::trace;

use crate::projector::DisplayItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// The listing failed; the widget keeps showing its loading indicator.
    Failed(String),
}

/// Programmatic changes a widget layer mirrors.
///
/// None of these is a user selection event; widgets apply them without
/// reporting back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    ItemsReplaced { generation: Generation, count: usize },
    LoadState(LoadState),
    Selected { value: String },
    Deselected { value: String },
    ScrolledIntoView { value: String },
    Busy { value: String, busy: bool },
}

impl EventKind for ListChange {
    fn kind(&self) -> &'static str {
        match self {
            ListChange::ItemsReplaced { .. } => "items-replaced",
            ListChange::LoadState(_) => "load-state",
            ListChange::Selected { .. } => "selected",
            ListChange::Deselected { .. } => "deselected",
            ListChange::ScrolledIntoView { .. } => "scrolled-into-view",
            ListChange::Busy { .. } => "busy",
        }
    }
}

/// State of the displayed list: rows, the single selected row, busy action
/// controls, load state and the client-side text filter.
#[derive(Debug)]
pub struct ListModel {
    generation: Generation,
    items: Vec<DisplayItem>,
    positions: BTreeMap<String, usize>,
    selected: Option<usize>,
    busy: BTreeMap<String, u32>,
    load_state: LoadState,
    filter_placeholder: String,
    filter_text: String,
    changes: EventBus<ListChange>,
}

impl Default for ListModel {
    fn default() -> Self {
        Self {
            generation: Generation::initial(),
            items: Vec::new(),
            positions: BTreeMap::new(),
            selected: None,
            busy: BTreeMap::new(),
            load_state: LoadState::Loading,
            filter_placeholder: String::new(),
            filter_text: String::new(),
            changes: EventBus::new(),
        }
    }
}

impl ListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Empties the list for a rebuild in `generation` and shows it as loading.
    pub fn reset(&mut self, generation: Generation) {
        self.deselect_all();
        self.items.clear();
        self.positions.clear();
        self.busy.clear();
        self.generation = generation;
        self.set_load_state(LoadState::Loading);
    }

    pub fn replace_items(&mut self, generation: Generation, items: Vec<DisplayItem>) {
        self.deselect_all();
        self.busy.clear();
        self.positions = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.value.clone(), idx))
            .collect();
        self.items = items;
        self.generation = generation;
        self.changes.emit(ListChange::ItemsReplaced {
            generation,
            count: self.items.len(),
        });
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn set_load_state(&mut self, state: LoadState) {
        if self.load_state == state {
            return;
        }
        self.load_state = state.clone();
        self.changes.emit(ListChange::LoadState(state));
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.positions.get(value).copied()
    }

    pub fn selected_item(&self) -> Option<&DisplayItem> {
        self.selected.and_then(|idx| self.items.get(idx))
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.selected_item().map(|item| item.value.as_str())
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected_value() == Some(value)
    }

    /// Selects the row with `value`, deselecting any other row.
    ///
    /// Returns `false` (and changes nothing) if no row has that value.
    pub fn select_value(&mut self, value: &str) -> bool {
        let Some(idx) = self.position(value) else {
            return false;
        };
        if self.selected == Some(idx) {
            return true;
        }
        self.deselect_all();
        self.selected = Some(idx);
        self.changes.emit(ListChange::Selected {
            value: value.to_string(),
        });
        true
    }

    /// Returns the value that was selected, if any.
    pub fn deselect_all(&mut self) -> Option<String> {
        let idx = self.selected.take()?;
        let value = self.items.get(idx)?.value.clone();
        self.changes.emit(ListChange::Deselected {
            value: value.clone(),
        });
        Some(value)
    }

    pub fn scroll_into_view(&mut self, value: &str) -> bool {
        if self.position(value).is_none() {
            return false;
        }
        self.changes.emit(ListChange::ScrolledIntoView {
            value: value.to_string(),
        });
        true
    }

    /// Marks a row's action control busy. Nested calls are counted.
    pub fn acquire_busy(&mut self, value: &str) {
        let count = self.busy.entry(value.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.changes.emit(ListChange::Busy {
                value: value.to_string(),
                busy: true,
            });
        }
    }

    pub fn release_busy(&mut self, value: &str) {
        let Some(count) = self.busy.get_mut(value) else {
            trace!(value, "release of a row that is not busy");
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.busy.remove(value);
            self.changes.emit(ListChange::Busy {
                value: value.to_string(),
                busy: false,
            });
        }
    }

    pub fn is_busy(&self, value: &str) -> bool {
        self.busy.contains_key(value)
    }

    pub fn busy_count(&self) -> usize {
        self.busy.len()
    }

    pub fn filter_placeholder(&self) -> &str {
        &self.filter_placeholder
    }

    pub fn set_filter_placeholder(&mut self, placeholder: impl Into<String>) {
        self.filter_placeholder = placeholder.into();
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }

    /// Rows whose label or description contains the filter text, ignoring case.
    pub fn visible_items(&self) -> Vec<&DisplayItem> {
        let needle = self.filter_text.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| {
                item.label.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn drain_changes(&mut self) -> Vec<Event<ListChange>> {
        self.changes.drain()
    }

    pub fn subscribe_changes(&mut self) -> tokio::sync::broadcast::Receiver<Event<ListChange>> {
        self.changes.subscribe()
    }
}
