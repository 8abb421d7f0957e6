use crate::entities::Todo;

/// Status filter for the todo list; one of the three filter buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] =
        [StatusFilter::All, StatusFilter::Active, StatusFilter::Completed];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

/// Derives the visible list: search narrows first, then the status filter.
/// The projection keeps the stored newest-first order and is never
/// persisted. An empty or whitespace-only search term matches everything.
pub fn project<'a>(todos: &'a [Todo], search_term: &str, filter: StatusFilter) -> Vec<&'a Todo> {
    let term = search_term.trim().to_lowercase();
    todos
        .iter()
        .filter(|todo| term.is_empty() || todo.text.to_lowercase().contains(&term))
        .filter(|todo| filter.matches(todo))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Todo> {
        let mut buy_milk = Todo::new("Buy milk");
        buy_milk.id = 3;
        let mut call_mum = Todo::new("call mum");
        call_mum.id = 2;
        call_mum.completed = true;
        let mut milk_plants = Todo::new("water the Milkweed");
        milk_plants.id = 1;
        vec![buy_milk, call_mum, milk_plants]
    }

    #[test]
    fn empty_search_and_all_returns_everything_in_stored_order() {
        let todos = fixture();
        let visible = project(&todos, "", StatusFilter::All);
        let ids: Vec<i64> = visible.iter().map(|t| t.id).collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn whitespace_only_term_matches_everything() {
        let todos = fixture();
        assert_eq!(project(&todos, "   ", StatusFilter::All).len(), 3);
    }

    #[test]
    fn search_is_a_case_insensitive_substring_match() {
        let todos = fixture();
        let ids: Vec<i64> = project(&todos, "MILK", StatusFilter::All)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, [3, 1]);
    }

    #[test]
    fn status_filter_splits_on_completed() {
        let todos = fixture();
        let active: Vec<i64> = project(&todos, "", StatusFilter::Active)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(active, [3, 1]);
        let done: Vec<i64> = project(&todos, "", StatusFilter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(done, [2]);
    }

    #[test]
    fn search_and_filter_compose() {
        let todos = fixture();
        assert!(project(&todos, "milk", StatusFilter::Completed).is_empty());
        let ids: Vec<i64> = project(&todos, "mum", StatusFilter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, [2]);
    }
}
