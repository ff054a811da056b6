use super::{escape, layout, PageContext};
use crate::accounts::Identity;

#[must_use]
pub fn login_page(ctx: &PageContext<'_>) -> String {
    let body = format!(
        r#"<form method="POST" action="/login">
  <label for="username">{login_label}</label>
  <input type="text" id="username" name="username" value="{username}" required autocomplete="username">
  <label for="password">{password_label}</label>
  <input type="password" id="password" name="password" required autocomplete="current-password">
  <button type="submit">{submit}</button>
</form>
<p><a href="/signup">{signup}</a></p>"#,
        login_label = ctx.t("form.username-or-email"),
        username = ctx.remembered_username(),
        password_label = ctx.t("form.password"),
        submit = ctx.t("page.login"),
        signup = ctx.t("page.signup"),
    );
    layout(ctx, "page.login", &body)
}

#[must_use]
pub fn signup_page(ctx: &PageContext<'_>) -> String {
    let body = format!(
        r#"<form method="POST" action="/signup">
  <label for="email">{email_label}</label>
  <input type="email" id="email" name="email" value="{email}" required autocomplete="email">
  <label for="username">{username_label}</label>
  <input type="text" id="username" name="username" value="{username}" required autocomplete="username">
  <label for="password">{password_label}</label>
  <input type="password" id="password" name="password" required autocomplete="new-password">
  <button type="submit">{submit}</button>
</form>
<p><a href="/login">{login}</a></p>"#,
        email_label = ctx.t("form.email"),
        email = ctx.remembered_email(),
        username_label = ctx.t("form.username"),
        username = ctx.remembered_username(),
        password_label = ctx.t("form.password"),
        submit = ctx.t("page.signup"),
        login = ctx.t("page.login"),
    );
    layout(ctx, "page.signup", &body)
}

#[must_use]
pub fn dashboard_page(ctx: &PageContext<'_>) -> String {
    let name = ctx
        .viewer
        .map(|viewer| escape(&viewer.username))
        .unwrap_or_default();
    let body = format!(
        r#"<p class="welcome">{welcome}, <a href="/profile/{name}">{name}</a></p>"#,
        welcome = ctx.t("dashboard.welcome"),
    );
    layout(ctx, "page.dashboard", &body)
}

#[must_use]
pub fn profile_page(ctx: &PageContext<'_>, owner: &Identity) -> String {
    let status = if owner.online {
        ctx.t("profile.online")
    } else {
        ctx.t("profile.offline")
    };
    let last_seen = owner
        .last_seen
        .filter(|_| !owner.online)
        .map(|at| {
            format!(
                r#"<p class="last-seen">{label}: <time datetime="{iso}">{shown}</time></p>"#,
                label = ctx.t("profile.last-seen"),
                iso = at.to_rfc3339(),
                shown = at.format("%Y-%m-%d %H:%M UTC"),
            )
        })
        .unwrap_or_default();
    let admin = if owner.is_admin {
        format!(r#"<span class="badge">{}</span>"#, ctx.t("profile.admin"))
    } else {
        String::new()
    };

    let body = format!(
        r#"<section class="profile">
  <h2>{name} {admin}</h2>
  <p class="status">{status}</p>
  {last_seen}
</section>"#,
        name = escape(&owner.username),
    );
    layout(ctx, "page.profile", &body)
}

#[must_use]
pub fn not_found_page(ctx: &PageContext<'_>) -> String {
    let home = if ctx.viewer.is_some() {
        ("/dashboard", ctx.t("page.dashboard"))
    } else {
        ("/login", ctx.t("page.login"))
    };
    let body = format!(r#"<p><a href="{}">{}</a></p>"#, home.0, home.1);
    layout(ctx, "page.not-found", &body)
}
