//! In-memory host: a stand-in for `localStorage`, `matchMedia` and the
//! document root. Used off the browser and throughout the test suite.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::error::ThemeError;

use super::host::{
    ColorSchemePreference, Host, StorageChange, Subscription, SystemTheme, ThemeDocument,
    ThemeStorage, TransitionGuard,
};

type Listener<T> = Rc<dyn Fn(T)>;

/// Registered callbacks keyed by id so a `Subscription` can remove its own.
struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T: Clone + 'static> Listeners<T> {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        })
    }

    fn subscribe(self: &Rc<Self>, listener: Listener<T>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));

        let registry = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.entries.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    fn emit(&self, value: T) {
        // Clone out first so a listener may subscribe or unsubscribe.
        let listeners: Vec<Listener<T>> =
            self.entries.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(value.clone());
        }
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    reads: RefCell<Vec<String>>,
    writes: RefCell<Vec<(String, String)>>,
    failure: RefCell<Option<String>>,
    listeners: Rc<Listeners<StorageChange>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(HashMap::new()),
            reads: RefCell::new(Vec::new()),
            writes: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            listeners: Listeners::new(),
        }
    }

    /// Seed a value without recording a write.
    pub fn insert(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Keys passed to `get_item`, in call order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.borrow().clone()
    }

    /// Successful `set_item` calls, in call order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    /// Make every subsequent access fail, e.g. storage disabled or quota hit.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.borrow_mut() = message.map(str::to_string);
    }

    /// Simulate a write from another tab: update the shared store, then
    /// notify this context's listeners.
    pub fn external_change(&self, change: StorageChange) {
        match (&change.key, &change.new_value) {
            (Some(key), Some(value)) => {
                self.items.borrow_mut().insert(key.clone(), value.clone());
            }
            (Some(key), None) => {
                self.items.borrow_mut().remove(key);
            }
            (None, _) => self.items.borrow_mut().clear(),
        }
        self.listeners.emit(change);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn check(&self) -> Result<(), ThemeError> {
        match self.failure.borrow().as_ref() {
            Some(message) => Err(ThemeError::Storage(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ThemeError> {
        self.reads.borrow_mut().push(key.to_string());
        self.check()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        self.check()?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(StorageChange)>) -> Subscription {
        self.listeners.subscribe(on_change)
    }
}

pub struct MemoryPreference {
    current: Cell<Option<SystemTheme>>,
    listeners: Rc<Listeners<SystemTheme>>,
}

impl MemoryPreference {
    pub fn new(initial: Option<SystemTheme>) -> Self {
        Self {
            current: Cell::new(initial),
            listeners: Listeners::new(),
        }
    }

    /// Change the OS preference; listeners hear about concrete values only.
    pub fn set(&self, theme: Option<SystemTheme>) {
        let previous = self.current.replace(theme);
        if let Some(theme) = theme {
            if previous != Some(theme) {
                self.listeners.emit(theme);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ColorSchemePreference for MemoryPreference {
    fn current(&self) -> Option<SystemTheme> {
        self.current.get()
    }

    fn subscribe(&self, on_change: Rc<dyn Fn(SystemTheme)>) -> Subscription {
        self.listeners.subscribe(on_change)
    }
}

#[derive(Default)]
pub struct MemoryDocument {
    classes: RefCell<Vec<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    color_scheme: RefCell<Option<String>>,
    suppressed: Rc<Cell<bool>>,
    suppressions: Cell<usize>,
    mutations: Cell<usize>,
    no_head: Cell<bool>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn color_scheme(&self) -> Option<String> {
        self.color_scheme.borrow().clone()
    }

    pub fn transitions_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    pub fn suppression_count(&self) -> usize {
        self.suppressions.get()
    }

    /// Number of mutating calls received, including no-op ones.
    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    /// Simulate a document without `<head>`, where transitions cannot be
    /// suppressed.
    pub fn set_head_missing(&self, missing: bool) {
        self.no_head.set(missing);
    }

    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl ThemeDocument for MemoryDocument {
    fn remove_classes(&self, classes: &[String]) -> Result<(), ThemeError> {
        self.touch();
        self.classes.borrow_mut().retain(|c| !classes.contains(c));
        Ok(())
    }

    fn add_class(&self, class: &str) -> Result<(), ThemeError> {
        self.touch();
        let mut list = self.classes.borrow_mut();
        if !list.iter().any(|c| c == class) {
            list.push(class.to_string());
        }
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), ThemeError> {
        self.touch();
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, name: &str) -> Result<(), ThemeError> {
        self.touch();
        self.attributes.borrow_mut().remove(name);
        Ok(())
    }

    fn set_color_scheme(&self, scheme: Option<&str>) -> Result<(), ThemeError> {
        self.touch();
        *self.color_scheme.borrow_mut() = scheme.map(str::to_string);
        Ok(())
    }

    fn suppress_transitions(&self) -> Result<TransitionGuard, ThemeError> {
        if self.no_head.get() {
            return Err(ThemeError::Dom("document has no <head>".to_string()));
        }
        self.suppressions.set(self.suppressions.get() + 1);
        self.suppressed.set(true);
        let suppressed = self.suppressed.clone();
        Ok(TransitionGuard::new(move || suppressed.set(false)))
    }
}

/// The three in-memory primitives together, with typed access for assertions.
#[derive(Clone)]
pub struct MemoryHost {
    pub storage: Rc<MemoryStorage>,
    pub preference: Rc<MemoryPreference>,
    pub document: Rc<MemoryDocument>,
}

impl MemoryHost {
    /// Empty storage, a light OS preference, a bare root element.
    pub fn new() -> Self {
        Self::with_system(Some(SystemTheme::Light))
    }

    pub fn with_system(system: Option<SystemTheme>) -> Self {
        Self {
            storage: Rc::new(MemoryStorage::new()),
            preference: Rc::new(MemoryPreference::new(system)),
            document: Rc::new(MemoryDocument::new()),
        }
    }

    pub fn host(&self) -> Host {
        Host::new(
            self.storage.clone(),
            self.preference.clone(),
            self.document.clone(),
        )
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}
