//! Server-rendered HTML pages
//!
//! Every page goes through `layout`, which draws the shared header: the
//! logged-in user's email and a logout button, or login/register links.
//! All user-supplied text is escaped before it reaches the markup.

use axum::http::StatusCode;
use std::collections::BTreeMap;

use crate::model::LinkRecord;

/// Escapes the five characters that are significant in HTML text and attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn header(email: Option<&str>) -> String {
    let session = match email {
        Some(email) => format!(
            r#"<span>Logged in as: {}</span>
      <form method="POST" action="/logout" class="inline"><button type="submit">Logout</button></form>"#,
            escape(email)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };

    format!(
        r#"<nav>
      <a href="/urls">TinyApp</a>
      <a href="/urls">My URLs</a>
      <a href="/urls/new">Create New URL</a>
      <div class="session">{session}</div>
    </nav>"#
    )
}

fn layout(title: &str, email: Option<&str>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title} - TinyApp</title>
  </head>
  <body>
    {header}
    <main>
      {body}
    </main>
  </body>
</html>
"#,
        title = escape(title),
        header = header(email),
    )
}

/// The caller's own links with edit and delete actions
pub fn urls_index(email: Option<&str>, links: &BTreeMap<String, LinkRecord>) -> String {
    let body = if links.is_empty() {
        r#"<h3>My URLs</h3>
      <p>You have not shortened any URLs yet. <a href="/urls/new">Create one</a>.</p>"#
            .to_string()
    } else {
        let rows: String = links
            .iter()
            .map(|(code, record)| {
                let code = escape(code);
                format!(
                    r#"
          <tr>
            <td><a href="/u/{code}">{code}</a></td>
            <td>{long_url}</td>
            <td>{created}</td>
            <td><a href="/urls/{code}">Edit</a></td>
            <td><form method="POST" action="/urls/{code}/delete"><button type="submit">Delete</button></form></td>
          </tr>"#,
                    long_url = escape(&record.long_url),
                    created = record.created_at.format("%Y-%m-%d %H:%M UTC"),
                )
            })
            .collect();

        format!(
            r#"<h3>My URLs</h3>
      <table>
        <thead>
          <tr><th>Short URL ID</th><th>Long URL</th><th>Created</th><th>Edit</th><th>Delete</th></tr>
        </thead>
        <tbody>{rows}
        </tbody>
      </table>"#
        )
    };

    layout("My URLs", email, &body)
}

pub fn urls_new(email: Option<&str>) -> String {
    let body = r#"<h3>Create TinyURL</h3>
      <form method="POST" action="/urls">
        <label for="longURL">Enter a URL:</label>
        <input id="longURL" type="text" name="longURL" placeholder="http://">
        <button type="submit">Submit</button>
      </form>"#;

    layout("Create TinyURL", email, body)
}

/// One link's details plus the form that edits its destination
pub fn urls_show(email: Option<&str>, code: &str, record: &LinkRecord) -> String {
    let code = escape(code);
    let body = format!(
        r#"<h3>TinyURL for: {long_url}</h3>
      <p>Short URL ID: <a href="/u/{code}">{code}</a></p>
      <p>Created: {created}</p>
      <h4>Edit</h4>
      <form method="POST" action="/urls/{code}">
        <label for="longURL">New URL:</label>
        <input id="longURL" type="text" name="longURL" value="{long_url}">
        <button type="submit">Update</button>
      </form>"#,
        long_url = escape(&record.long_url),
        created = record.created_at.format("%Y-%m-%d %H:%M UTC"),
    );

    layout("Edit TinyURL", email, &body)
}

fn credentials_form(heading: &str, action: &str, button: &str) -> String {
    format!(
        r#"<h3>{heading}</h3>
      <form method="POST" action="{action}">
        <label for="email">Email:</label>
        <input id="email" type="email" name="email">
        <label for="password">Password:</label>
        <input id="password" type="password" name="password">
        <button type="submit">{button}</button>
      </form>"#
    )
}

pub fn register() -> String {
    layout("Register", None, &credentials_form("Register", "/register", "Register"))
}

pub fn login() -> String {
    layout("Login", None, &credentials_form("Login", "/login", "Login"))
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<h3>{code} {reason}</h3>
      <p>{message}</p>
      <p><a href="/urls">Back to my URLs</a> | <a href="/login">Login</a></p>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = escape(message),
    );

    layout("Error", None, &body)
}
