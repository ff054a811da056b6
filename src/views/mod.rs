//! Server-rendered HTML pages.

mod pages;

pub use pages::{dashboard_page, login_page, not_found_page, profile_page, signup_page};

use crate::accounts::Identity;
use crate::locale::Translator;
use crate::session::{FlashKind, FlashView};

/// Everything a page needs besides its own data.
pub struct PageContext<'a> {
    translator: &'a dyn Translator,
    locale: &'a str,
    viewer: Option<&'a Identity>,
    flashes: FlashView,
}

impl<'a> PageContext<'a> {
    #[must_use]
    pub fn new(
        translator: &'a dyn Translator,
        locale: &'a str,
        viewer: Option<&'a Identity>,
        flashes: FlashView,
    ) -> Self {
        Self {
            translator,
            locale,
            viewer,
            flashes,
        }
    }

    fn t(&self, key: &str) -> String {
        escape(&self.translator.translate(self.locale, key))
    }

    fn remembered_email(&self) -> String {
        self.flashes.email.as_deref().map(escape).unwrap_or_default()
    }

    fn remembered_username(&self) -> String {
        self.flashes
            .username
            .as_deref()
            .map(escape)
            .unwrap_or_default()
    }
}

/// Minimal HTML escaping for text and attribute values.
#[must_use]
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

fn banners(ctx: &PageContext<'_>) -> String {
    ctx.flashes
        .banners
        .iter()
        .map(|message| {
            let class = match message.kind {
                FlashKind::Error => "flash flash-error",
                _ => "flash flash-info",
            };
            format!(r#"<div class="{class}">{}</div>"#, escape(&message.text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn navigation(ctx: &PageContext<'_>) -> String {
    match ctx.viewer {
        Some(viewer) => format!(
            r#"<a href="/dashboard">{dashboard}</a> <a href="/profile/{name}">{name}</a> <a href="/logout">{logout}</a>"#,
            dashboard = ctx.t("page.dashboard"),
            name = escape(&viewer.username),
            logout = ctx.t("page.logout"),
        ),
        None => format!(
            r#"<a href="/login">{login}</a> <a href="/signup">{signup}</a>"#,
            login = ctx.t("page.login"),
            signup = ctx.t("page.signup"),
        ),
    }
}

fn layout(ctx: &PageContext<'_>, title_key: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/res/style.css">
</head><body>
<nav>{nav}</nav>
<main>
<h1>{title}</h1>
{banners}
{body}
</main>
</body></html>"#,
        lang = escape(&ctx.locale.to_lowercase()),
        title = ctx.t(title_key),
        nav = navigation(ctx),
        banners = banners(ctx),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }
}
