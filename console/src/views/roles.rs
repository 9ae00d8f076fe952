use admin_client::query::QueryState;
use admin_client::Role;

use super::{pagination_row, skeleton, table};

pub const COLUMNS: [&str; 4] = ["Name", "Description", "Status", "ID"];
const SKELETON_ROWS: usize = 4;

pub fn render_roles(state: &QueryState<Role>) -> String {
    let Some(page) = state.data.as_ref() else {
        return if state.is_loading || state.is_fetching {
            skeleton(&COLUMNS, SKELETON_ROWS)
        } else {
            "No roles found.\n".to_string()
        };
    };

    if page.data.is_empty() {
        return "No roles found.\n".to_string();
    }

    let rows: Vec<Vec<String>> = page.data.iter().map(role_row).collect();
    let current = state.params.as_ref().map(|params| params.page).unwrap_or(1);
    table(&COLUMNS, &rows, pagination_row(page, current, state.is_fetching))
}

fn role_row(role: &Role) -> Vec<String> {
    vec![
        role.name.clone(),
        role.description
            .clone()
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| "-".into()),
        if role.is_default { "Default".into() } else { String::new() },
        role.id.clone(),
    ]
}

pub fn render_role(role: &Role) -> String {
    let mut out = format!("{} ({})\n", role.name, role.id);
    if let Some(description) = &role.description {
        out.push_str(&format!("  {description}\n"));
    }
    if role.is_default {
        out.push_str("  Default role\n");
    }
    out
}
