//! HTML page generation for gate outcomes
//!
//! Server-rendered pages for the loading placeholder, the denial screen,
//! the login destination and the placeholder content behind protected routes.

use crate::gate::Denial;
use crate::identity::Identity;

/// Loading placeholder shown while authentication is resolving
pub fn loading_page() -> String {
    layout(
        "Loading",
        r#"<div class="center">
        <div class="spinner"></div>
        <p class="muted">Checking authentication...</p>
    </div>"#,
    )
}

/// Denial screen for an authenticated identity whose role is not allowed
pub fn denial_page(denial: &Denial) -> String {
    let body = format!(
        r#"<div class="center card">
        <h1>Access denied</h1>
        <p>You do not have permission to view this page.</p>
        <p class="required">Required role: {required}</p>
        <p class="actual">Your role: {actual}</p>
        <button type="button" onclick="window.history.back()">Go back</button>
    </div>"#,
        required = escape(&denial.required_text()),
        actual = escape(denial.actual_text()),
    );
    layout("Access denied", &body)
}

/// Login destination
pub fn login_page() -> String {
    layout(
        "Sign in",
        r#"<div class="center card">
        <h1>Sign in</h1>
        <p class="muted">Sign in as a buyer, farmer or admin to continue.</p>
    </div>"#,
    )
}

/// Placeholder content for a protected destination
pub fn content_page(title: &str, identity: &Identity) -> String {
    let body = format!(
        r#"<header>
        <h1>{title}</h1>
        <span class="badge">{role}</span>
    </header>
    <main>
        <p>Signed in as {who}.</p>
    </main>"#,
        title = escape(title),
        role = identity.role,
        who = escape(identity.label()),
    );
    layout(title, &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    {body}
</body>
</html>"#,
        title = escape(title),
        css = CSS,
        body = body,
    )
}

/// Escape text for HTML element and attribute content.
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

const CSS: &str = r#"
        body { font-family: system-ui, sans-serif; max-width: 480px; margin: 0 auto; padding: 16px; background: #f7f7f2; }
        header { display: flex; align-items: center; justify-content: space-between; }
        .center { display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 60vh; text-align: center; }
        .card { background: #fff; border-radius: 12px; padding: 24px; box-shadow: 0 1px 4px rgba(0,0,0,0.1); }
        .muted { color: #666; }
        .badge { background: #2e7d32; color: #fff; border-radius: 8px; padding: 2px 8px; font-size: 12px; }
        .spinner { width: 40px; height: 40px; border: 4px solid #ddd; border-top-color: #2e7d32; border-radius: 50%; animation: spin 1s linear infinite; margin-bottom: 16px; }
        @keyframes spin { to { transform: rotate(360deg); } }
        button { background: #2e7d32; color: #fff; border: none; border-radius: 8px; padding: 8px 16px; cursor: pointer; }
"#;
