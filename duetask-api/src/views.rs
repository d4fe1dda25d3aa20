/// HTML pages
///
/// Plain string-built markup. Every user-supplied value goes through
/// [`escape`]. Client behavior (service worker registration, push
/// subscription, completion toggles) lives in `/static/app.js`; pages carry
/// no inline script so the CSP can stay `script-src 'self'`.

use duetask_shared::models::todo::Todo;

use crate::{flash::Flash, middleware::session::SessionUser};

/// Per-request values every page needs
#[derive(Debug, Default)]
pub struct PageContext<'a> {
    pub user: Option<&'a SessionUser>,
    pub flash: Option<Flash>,
    pub vapid_public_key: Option<&'a str>,
}

/// Escapes text for HTML element and attribute content
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(ctx: &PageContext<'_>, title: &str, body: &str) -> String {
    let nav = match ctx.user {
        Some(user) => format!(
            r#"<span class="greeting">Hi {}!</span> <a href="/">My to-dos</a> <a href="/add">Add</a> <a href="/logout">Log out</a>"#,
            escape(&user.name)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a>"#.to_string(),
    };

    let flash = ctx
        .flash
        .as_ref()
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}" role="status">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    let vapid = ctx
        .vapid_public_key
        .map(|key| format!(r#"<meta name="vapid-public-key" content="{}">"#, escape(key)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{vapid}
<title>{title} · DueTask</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav><a class="brand" href="/">DueTask</a> {nav}</nav>
{flash}
<main>
{body}
</main>
<script src="/static/app.js" defer></script>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn landing(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Welcome",
        r#"<h1>Never miss a due date</h1>
<p>Keep a simple to-do list and get a browser notification the evening before something is due.</p>
<p><a class="button" href="/signup">Get started</a> or <a href="/login">log in</a>.</p>"#,
    )
}

pub fn signup_form(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Sign up",
        r#"<h1>Sign up</h1>
<form method="post" action="/signup">
<label>Name <input type="text" name="name" required maxlength="100"></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" id="password" required></label>
<label class="inline"><input type="checkbox" id="show_password"> Show password</label>
<button type="submit">Sign up</button>
</form>
<p>Already have an account? <a href="/login">Log in</a>.</p>"#,
    )
}

pub fn login_form(ctx: &PageContext<'_>) -> String {
    layout(
        ctx,
        "Log in",
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" id="password" required></label>
<label class="inline"><input type="checkbox" id="show_password"> Show password</label>
<button type="submit">Log in</button>
</form>
<p>New here? <a href="/signup">Sign up</a>.</p>"#,
    )
}

fn todo_row(todo: &Todo) -> String {
    let due = todo
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    format!(
        r#"<tr class="{class}">
<td><input type="checkbox" class="todo-status" value="{id}"{checked} aria-label="Completed"></td>
<td class="title">{title}</td>
<td>{due}</td>
<td>{alert}</td>
<td><a href="/edit_todo/{id}">Edit</a> <a href="/delete/{id}" class="delete">Delete</a></td>
</tr>"#,
        class = if todo.completed { "completed" } else { "open" },
        id = todo.id,
        checked = if todo.completed { " checked" } else { "" },
        title = escape(&todo.title),
        due = due,
        alert = if todo.alert { "🔔" } else { "" },
    )
}

pub fn todo_list(ctx: &PageContext<'_>, todos: &[Todo]) -> String {
    let body = if todos.is_empty() {
        r#"<h1>My to-dos</h1>
<p>Nothing here yet. <a href="/add">Add your first to-do</a>.</p>"#
            .to_string()
    } else {
        let rows: String = todos.iter().map(todo_row).collect();
        format!(
            r#"<h1>My to-dos</h1>
<table class="todos">
<thead><tr><th>Done</th><th>Title</th><th>Due</th><th>Alert</th><th></th></tr></thead>
<tbody>
{}
</tbody>
</table>
<p><a class="button" href="/add">Add a to-do</a></p>"#,
            rows
        )
    };

    layout(ctx, "My to-dos", &body)
}

fn todo_form(action: &str, button: &str, todo: Option<&Todo>) -> String {
    let title = todo.map(|t| escape(&t.title)).unwrap_or_default();
    let due = todo
        .and_then(|t| t.due_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let alert = if todo.map(|t| t.alert).unwrap_or(false) {
        " checked"
    } else {
        ""
    };

    format!(
        r#"<form method="post" action="{action}">
<label>Title <input type="text" name="title" value="{title}" required></label>
<label>Due date <input type="date" name="due_date" value="{due}"></label>
<label class="inline"><input type="checkbox" name="alert"{alert}> Remind me the day before</label>
<button type="submit">{button}</button>
</form>"#
    )
}

pub fn add_form(ctx: &PageContext<'_>) -> String {
    let body = format!("<h1>Add a to-do</h1>\n{}", todo_form("/add", "Add", None));
    layout(ctx, "Add a to-do", &body)
}

pub fn edit_form(ctx: &PageContext<'_>, todo: &Todo) -> String {
    let action = format!("/edit_todo/{}", todo.id);
    let body = format!("<h1>Edit to-do</h1>\n{}", todo_form(&action, "Save", Some(todo)));
    layout(ctx, "Edit to-do", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn todo(title: &str, completed: bool) -> Todo {
        Todo {
            id: 4,
            user_id: 1,
            title: title.to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            created_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            alert: true,
            completed,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("Pay bills"), "Pay bills");
    }

    #[test]
    fn test_todo_list_escapes_titles() {
        let user = SessionUser {
            id: 1,
            name: "<Ada>".to_string(),
        };
        let ctx = PageContext {
            user: Some(&user),
            ..Default::default()
        };
        let html = todo_list(&ctx, &[todo("<b>bold</b>", true)]);

        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("Hi &lt;Ada&gt;!"));
        assert!(html.contains(r#"value="4" checked"#));
        assert!(html.contains("2024-05-02"));
    }

    #[test]
    fn test_flash_and_vapid_key_rendered() {
        let ctx = PageContext {
            user: None,
            flash: Some(Flash::danger("Invalid Password!")),
            vapid_public_key: Some("BPublicKey"),
        };
        let html = login_form(&ctx);

        assert!(html.contains(r#"class="flash flash-danger""#));
        assert!(html.contains("Invalid Password!"));
        assert!(html.contains(r#"content="BPublicKey""#));
        assert!(html.contains(r#"href="/signup""#));
    }

    #[test]
    fn test_edit_form_prefills() {
        let html = edit_form(&PageContext::default(), &todo("Pay bills", false));
        assert!(html.contains(r#"action="/edit_todo/4""#));
        assert!(html.contains(r#"value="Pay bills""#));
        assert!(html.contains(r#"value="2024-05-02""#));
        assert!(html.contains(r#"name="alert" checked"#));
    }

    #[test]
    fn test_empty_list() {
        let html = todo_list(&PageContext::default(), &[]);
        assert!(html.contains("Add your first to-do"));
    }
}
