use std::fmt::Write;

use crate::core::task::Category;
use crate::core::task_list::TaskList;

/// Plain-text projection of the list, one task per line, in list order.
pub fn render(list: &TaskList, filter: Option<Category>) -> String {
    let mut out = String::new();
    let tasks: Vec<_> = list
        .tasks()
        .iter()
        .filter(|t| filter.is_none_or(|c| t.category == c))
        .collect();

    if tasks.is_empty() {
        out.push_str("No tasks.\n");
        return out;
    }

    let id_width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(1);

    for task in tasks {
        let mark = if task.completed { 'x' } else { ' ' };
        let _ = writeln!(
            out,
            "[{}] {:>width$}  {}  ({})",
            mark,
            task.id.to_string(),
            task.text,
            task.category,
            width = id_width,
        );
        if list.is_menu_open(&task.id) {
            for category in Category::ALL {
                let current = if category == task.category { '*' } else { ' ' };
                let _ = writeln!(out, "      {} {}", current, category);
            }
        }
    }
    out
}
