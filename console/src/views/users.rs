use admin_client::query::QueryState;
use admin_client::utils::format_short_us;
use admin_client::{Role, User};

use super::{pagination_row, skeleton, table};

pub const COLUMNS: [&str; 4] = ["User", "Role", "Joined", "ID"];
const SKELETON_ROWS: usize = 5;
pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// `roles` is whatever role page is cached; unmatched ids show as unknown.
pub fn render_users(state: &QueryState<User>, roles: &[Role]) -> String {
    let Some(page) = state.data.as_ref() else {
        return if state.is_loading || state.is_fetching {
            skeleton(&COLUMNS, SKELETON_ROWS)
        } else {
            "No users found.\n".to_string()
        };
    };

    if page.data.is_empty() {
        return "No users found.\n".to_string();
    }

    let rows: Vec<Vec<String>> = page.data.iter().map(|user| user_row(user, roles)).collect();
    let current = state.params.as_ref().map(|params| params.page).unwrap_or(1);
    table(&COLUMNS, &rows, pagination_row(page, current, state.is_fetching))
}

pub fn role_name<'a>(roles: &'a [Role], role_id: &str) -> &'a str {
    roles
        .iter()
        .find(|role| role.id == role_id)
        .map(|role| role.name.as_str())
        .unwrap_or(UNKNOWN_ROLE)
}

fn user_row(user: &User, roles: &[Role]) -> Vec<String> {
    vec![
        format!("[{}] {}", user.initials(), user.full_name()),
        role_name(roles, &user.role_id).to_string(),
        format_short_us(&user.updated_at),
        user.id.clone(),
    ]
}

pub fn render_user(user: &User, roles: &[Role]) -> String {
    let mut out = format!("{} ({})\n", user.full_name(), user.id);
    out.push_str(&format!("  Role:   {}\n", role_name(roles, &user.role_id)));
    out.push_str(&format!("  Joined: {}\n", format_short_us(&user.updated_at)));
    if let Some(photo) = &user.photo {
        out.push_str(&format!("  Photo:  {photo}\n"));
    }
    out
}
