mod contact;
mod todos;

pub use contact::ContactScreen;
pub use todos::TodosScreen;

/// Action dispatched against the entity id bound to the selected list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Toggle,
    Delete,
}
